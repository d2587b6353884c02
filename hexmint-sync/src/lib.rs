//! # hexmint-sync
//!
//! Client-side mirror of a color registry and the submission protocol.
//!
//! Call [`SyncClient::load_state`] to materialize the gallery, then
//! [`SyncClient::submit_raw`] to validate and send a new color. Drive the
//! returned [`SubmissionHandle`] with [`SyncClient::next_event`] or
//! [`SyncClient::settle`] so the mirror is reconciled on the client's own
//! control flow.

pub mod client;
pub mod error;
pub mod submission;
pub mod transport;
pub mod validate;

pub use client::{ClientViewState, ReconcilePolicy, SyncClient};
pub use error::SyncError;
pub use submission::{SubmissionEvent, SubmissionHandle, SubmissionOutcome};
pub use transport::{
    LedgerTransport, Receipt, RejectCause, TransportError, TxEvent, TxHash, TxSender, TxStream,
};
pub use validate::{validate_submission, ValidationError};
