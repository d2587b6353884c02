//! The port between the client and a ledger.
//!
//! A ledger implementation provides [`LedgerTransport`]. Reads are plain
//! request/response calls; a mint is fire-and-forget and reports its progress
//! as a stream of [`TxEvent`]s.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use hexmint_core::{AccountId, ColorValue, ContractAddress, MintEvent, NetworkId};

/// Hash identifying a transaction once the ledger has accepted it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Durable proof that a mint was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx: TxHash,
    pub block_number: u64,
    pub event: MintEvent,
}

/// Terminal reason a transaction did not confirm.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectCause {
    /// The account holder declined to approve the transaction.
    #[error("user rejected the request")]
    UserRejected,
    /// The registry refused the value because another mint got there first.
    #[error("color {value} is already registered")]
    DuplicateValue { value: ColorValue },
    /// The ledger does not manage the sending account.
    #[error("account {account} is not available on this ledger")]
    UnknownAccount { account: AccountId },
    /// Any other execution failure.
    #[error("transaction reverted: {reason}")]
    Reverted { reason: String },
    /// The ledger went away before the transaction settled.
    #[error("ledger stopped before the transaction settled")]
    NodeStopped,
}

impl RejectCause {
    /// Wallet error code for a declined approval.
    pub const USER_REJECTED_CODE: i64 = 4001;

    /// Numeric error code in the wallet/JSON-RPC convention.
    pub fn code(&self) -> i64 {
        match self {
            RejectCause::UserRejected => Self::USER_REJECTED_CODE,
            RejectCause::UnknownAccount { .. } => 4100,
            RejectCause::DuplicateValue { .. } | RejectCause::Reverted { .. } => -32000,
            RejectCause::NodeStopped => -32603,
        }
    }

    pub fn is_user_cancellation(&self) -> bool {
        self.code() == Self::USER_REJECTED_CODE
    }
}

/// One progress notification for a sent transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxEvent {
    /// Accepted for processing, not yet applied.
    Hash(TxHash),
    /// Applied; terminal.
    Receipt(Receipt),
    /// Refused; terminal.
    Error(RejectCause),
}

pub type TxSender = mpsc::UnboundedSender<TxEvent>;

/// Receiving end of a transaction's progress notifications.
#[derive(Debug)]
pub struct TxStream {
    rx: mpsc::UnboundedReceiver<TxEvent>,
}

impl TxStream {
    /// A connected sender/stream pair.
    pub fn channel() -> (TxSender, TxStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, TxStream { rx })
    }

    /// Next notification, or `None` once the sender side is gone.
    pub async fn next(&mut self) -> Option<TxEvent> {
        self.rx.recv().await
    }
}

/// Failure of a read or of handing a transaction to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("no registry contract at {address}")]
    UnknownContract { address: ContractAddress },
    #[error("no color at position {position}")]
    NotFound { position: u64 },
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Everything the client needs from a ledger.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Identifier of the network the ledger runs.
    async fn network_id(&self) -> Result<NetworkId, TransportError>;

    /// Accounts the ledger can sign for; the first is the default identity.
    async fn accounts(&self) -> Result<Vec<AccountId>, TransportError>;

    async fn total_supply(&self, contract: &ContractAddress) -> Result<u64, TransportError>;

    /// 0-based lookup of the color minted at `position`.
    async fn color_at(
        &self,
        contract: &ContractAddress,
        position: u64,
    ) -> Result<ColorValue, TransportError>;

    /// Bulk read of `[start, start + count)`.
    ///
    /// `Ok(None)` means the ledger has no bulk primitive and the caller should
    /// fall back to [`LedgerTransport::color_at`].
    async fn colors_range(
        &self,
        _contract: &ContractAddress,
        _start: u64,
        _count: u64,
    ) -> Result<Option<Vec<ColorValue>>, TransportError> {
        Ok(None)
    }

    /// Send `mint(value)` from `from`. Returns as soon as the request is
    /// handed over; progress arrives on the returned stream.
    async fn send_mint(
        &self,
        contract: &ContractAddress,
        from: &AccountId,
        value: ColorValue,
    ) -> Result<TxStream, TransportError>;
}

#[async_trait]
impl<T: LedgerTransport + ?Sized> LedgerTransport for Arc<T> {
    async fn network_id(&self) -> Result<NetworkId, TransportError> {
        (**self).network_id().await
    }

    async fn accounts(&self) -> Result<Vec<AccountId>, TransportError> {
        (**self).accounts().await
    }

    async fn total_supply(&self, contract: &ContractAddress) -> Result<u64, TransportError> {
        (**self).total_supply(contract).await
    }

    async fn color_at(
        &self,
        contract: &ContractAddress,
        position: u64,
    ) -> Result<ColorValue, TransportError> {
        (**self).color_at(contract, position).await
    }

    async fn colors_range(
        &self,
        contract: &ContractAddress,
        start: u64,
        count: u64,
    ) -> Result<Option<Vec<ColorValue>>, TransportError> {
        (**self).colors_range(contract, start, count).await
    }

    async fn send_mint(
        &self,
        contract: &ContractAddress,
        from: &AccountId,
        value: ColorValue,
    ) -> Result<TxStream, TransportError> {
        (**self).send_mint(contract, from, value).await
    }
}
