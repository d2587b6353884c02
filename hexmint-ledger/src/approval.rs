//! Account-holder approval of outgoing mints.

use hexmint_core::{AccountId, ColorValue};

/// A mint awaiting the account holder's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintRequest {
    pub from: AccountId,
    pub value: ColorValue,
}

/// Decides whether a mint may be broadcast. Declining rejects it with
/// wallet code 4001 before it reaches the queue.
pub trait Approver: Send + Sync {
    fn approve(&self, request: &MintRequest) -> bool;
}

/// Approves everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl Approver for AutoApprove {
    fn approve(&self, _request: &MintRequest) -> bool {
        true
    }
}

impl<F> Approver for F
where
    F: Fn(&MintRequest) -> bool + Send + Sync,
{
    fn approve(&self, request: &MintRequest) -> bool {
        self(request)
    }
}
