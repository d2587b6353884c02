//! Submission lifecycle signals.
//!
//! A handle turns the raw transaction stream into an ordered sequence of
//! [`SubmissionEvent`]s with these guarantees:
//! - `Accepted` is emitted at most once and always before `Confirmed`.
//! - `Rejected` follows `Accepted`, except when the request was declined
//!   before the ledger ever accepted it.
//! - Exactly one terminal event (`Confirmed` or `Rejected`) is emitted; a
//!   stream that closes early ends in `Rejected { NodeStopped }`.

use hexmint_core::ColorValue;

use crate::error::GENERIC_FAILURE_NOTICE;
use crate::transport::{Receipt, RejectCause, TxEvent, TxHash, TxStream};

/// Tagged lifecycle signal for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionEvent {
    Accepted { tx: TxHash },
    Rejected { cause: RejectCause },
    Confirmed { receipt: Receipt },
}

impl SubmissionEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmissionEvent::Accepted { .. })
    }
}

/// How a submission ended, as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Confirmed(Receipt),
    /// Declined by the account holder; not an error.
    Cancelled,
    Failed(RejectCause),
}

impl SubmissionOutcome {
    /// Notice for the user, if this outcome warrants one.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            SubmissionOutcome::Failed(_) => Some(GENERIC_FAILURE_NOTICE),
            SubmissionOutcome::Confirmed(_) | SubmissionOutcome::Cancelled => None,
        }
    }
}

/// In-flight submission of one color.
#[derive(Debug)]
pub struct SubmissionHandle {
    value: ColorValue,
    stream: TxStream,
    tx: Option<TxHash>,
    held: Option<SubmissionEvent>,
    optimistic: bool,
    finished: bool,
}

impl SubmissionHandle {
    pub(crate) fn new(value: ColorValue, stream: TxStream) -> Self {
        Self {
            value,
            stream,
            tx: None,
            held: None,
            optimistic: false,
            finished: false,
        }
    }

    pub fn value(&self) -> &ColorValue {
        &self.value
    }

    /// Transaction hash, once accepted.
    pub fn tx(&self) -> Option<&TxHash> {
        self.tx.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the client appended this value to its mirror on acceptance.
    pub(crate) fn optimistic(&self) -> bool {
        self.optimistic
    }

    pub(crate) fn mark_optimistic(&mut self, optimistic: bool) {
        self.optimistic = optimistic;
    }

    /// Next lifecycle signal, without touching any client mirror.
    ///
    /// Returns `None` after the terminal event has been delivered.
    pub async fn next_event(&mut self) -> Option<SubmissionEvent> {
        if let Some(held) = self.held.take() {
            self.finished = true;
            return Some(held);
        }
        if self.finished {
            return None;
        }
        loop {
            let Some(raw) = self.stream.next().await else {
                self.finished = true;
                return Some(SubmissionEvent::Rejected {
                    cause: RejectCause::NodeStopped,
                });
            };
            match raw {
                TxEvent::Hash(tx) => {
                    if self.tx.is_some() {
                        continue;
                    }
                    self.tx = Some(tx.clone());
                    return Some(SubmissionEvent::Accepted { tx });
                }
                TxEvent::Receipt(receipt) => {
                    if self.tx.is_none() {
                        // Receipt without a prior hash: surface acceptance first.
                        let tx = receipt.tx.clone();
                        self.tx = Some(tx.clone());
                        self.held = Some(SubmissionEvent::Confirmed { receipt });
                        return Some(SubmissionEvent::Accepted { tx });
                    }
                    self.finished = true;
                    return Some(SubmissionEvent::Confirmed { receipt });
                }
                TxEvent::Error(cause) => {
                    self.finished = true;
                    return Some(SubmissionEvent::Rejected { cause });
                }
            }
        }
    }
}
