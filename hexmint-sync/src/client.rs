//! Stateful client mirroring one registry deployment.
//!
//! The mirror is replaced wholesale by [`SyncClient::load_state`] and after
//! that only grows by appends on acceptance. It is never diffed against the
//! ledger: a mint from another client, or a confirmation this client never
//! observed, stays invisible until the next full load.

use hexmint_core::{AccountId, ColorValue, ContractAddress, DeploymentBook, NetworkId};

use crate::error::SyncError;
use crate::submission::{SubmissionEvent, SubmissionHandle, SubmissionOutcome};
use crate::transport::{LedgerTransport, TransportError};
use crate::validate::validate_submission;

/// What the client does to its mirror when an accepted mint is later refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilePolicy {
    /// Leave the optimistic entry in place. The mirror then disagrees with the
    /// registry until the next full load.
    #[default]
    KeepOptimistic,
    /// Remove the optimistic entry again.
    RevertOnReject,
}

/// Local mirror of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientViewState {
    pub account: AccountId,
    /// Supply reported by the last full load.
    pub total_supply: u64,
    pub colors: Vec<ColorValue>,
}

#[derive(Debug)]
struct Session {
    network: NetworkId,
    contract: ContractAddress,
    state: ClientViewState,
}

/// Client for one ledger and one contract artifact.
pub struct SyncClient<T> {
    transport: T,
    book: DeploymentBook,
    policy: ReconcilePolicy,
    preferred_account: Option<AccountId>,
    session: Option<Session>,
}

impl<T: LedgerTransport> SyncClient<T> {
    pub fn new(transport: T, book: DeploymentBook) -> Self {
        Self {
            transport,
            book,
            policy: ReconcilePolicy::default(),
            preferred_account: None,
            session: None,
        }
    }

    pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Submit as `account` instead of the ledger's first account.
    pub fn with_account(mut self, account: AccountId) -> Self {
        self.preferred_account = Some(account);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> Option<&ClientViewState> {
        self.session.as_ref().map(|s| &s.state)
    }

    pub fn colors(&self) -> &[ColorValue] {
        self.state().map(|s| s.colors.as_slice()).unwrap_or_default()
    }

    pub fn network(&self) -> Option<NetworkId> {
        self.session.as_ref().map(|s| s.network)
    }

    pub fn contract(&self) -> Option<&ContractAddress> {
        self.session.as_ref().map(|s| &s.contract)
    }

    /// Fetch identity, deployment, supply and every color, replacing the mirror.
    ///
    /// Colors come from one bulk read when the transport offers it, otherwise
    /// from sequential `color_at` calls that stop at the first failure. On any
    /// error the previous mirror is kept untouched.
    pub async fn load_state(&mut self) -> Result<&ClientViewState, SyncError> {
        let accounts = self.transport.accounts().await.map_err(fetch_err)?;
        let account = match &self.preferred_account {
            Some(preferred) => preferred.clone(),
            None => accounts.into_iter().next().ok_or(SyncError::NoAccount)?,
        };

        let network = self.transport.network_id().await.map_err(fetch_err)?;
        let Some(deployment) = self.book.get(network) else {
            tracing::warn!("no deployment for network {network}");
            return Err(SyncError::NoDeployment { network });
        };
        let contract = deployment.address.clone();

        let total_supply = self
            .transport
            .total_supply(&contract)
            .await
            .map_err(|e| read_err(network, e))?;
        let colors = self
            .fetch_colors(&contract, total_supply)
            .await
            .map_err(|e| read_err(network, e))?;

        tracing::info!(
            "loaded {} color(s) from {contract} on network {network} as {account}",
            colors.len()
        );
        let session = self.session.insert(Session {
            network,
            contract,
            state: ClientViewState {
                account,
                total_supply,
                colors,
            },
        });
        Ok(&session.state)
    }

    async fn fetch_colors(
        &self,
        contract: &ContractAddress,
        total_supply: u64,
    ) -> Result<Vec<ColorValue>, TransportError> {
        if let Some(colors) = self
            .transport
            .colors_range(contract, 0, total_supply)
            .await?
        {
            if colors.len() as u64 != total_supply {
                return Err(TransportError::Unavailable(format!(
                    "bulk read returned {} of {total_supply} colors",
                    colors.len()
                )));
            }
            return Ok(colors);
        }

        let mut colors = Vec::new();
        for position in 0..total_supply {
            colors.push(self.transport.color_at(contract, position).await?);
        }
        Ok(colors)
    }

    /// Validate `raw` against the mirror, then submit it.
    pub async fn submit_raw(&mut self, raw: &str) -> Result<SubmissionHandle, SyncError> {
        let value = validate_submission(raw, self.colors())?;
        self.submit(value).await
    }

    /// Send `mint(value)` under the active account without waiting for it to
    /// settle. Drive the handle with [`SyncClient::next_event`] or
    /// [`SyncClient::settle`].
    pub async fn submit(&mut self, value: ColorValue) -> Result<SubmissionHandle, SyncError> {
        let session = self.session.as_ref().ok_or(SyncError::NotLoaded)?;
        tracing::debug!("submitting {value} as {}", session.state.account);
        let stream = self
            .transport
            .send_mint(&session.contract, &session.state.account, value.clone())
            .await
            .map_err(SyncError::Transport)?;
        Ok(SubmissionHandle::new(value, stream))
    }

    /// Pull the next lifecycle signal from `handle` and reconcile the mirror.
    pub async fn next_event(&mut self, handle: &mut SubmissionHandle) -> Option<SubmissionEvent> {
        let event = handle.next_event().await?;
        self.reconcile(handle, &event);
        Some(event)
    }

    /// Drive `handle` to its terminal signal.
    ///
    /// Returns `None` when `handle` already delivered its terminal signal
    /// through [`SyncClient::next_event`].
    pub async fn settle(&mut self, mut handle: SubmissionHandle) -> Option<SubmissionOutcome> {
        while let Some(event) = self.next_event(&mut handle).await {
            let outcome = match event {
                SubmissionEvent::Accepted { .. } => continue,
                SubmissionEvent::Confirmed { receipt } => SubmissionOutcome::Confirmed(receipt),
                SubmissionEvent::Rejected { cause } if cause.is_user_cancellation() => {
                    SubmissionOutcome::Cancelled
                }
                SubmissionEvent::Rejected { cause } => SubmissionOutcome::Failed(cause),
            };
            return Some(outcome);
        }
        None
    }

    fn reconcile(&mut self, handle: &mut SubmissionHandle, event: &SubmissionEvent) {
        let policy = self.policy;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let colors = &mut session.state.colors;
        match event {
            SubmissionEvent::Accepted { tx } => {
                tracing::info!("mint of {} accepted as {tx}", handle.value());
                colors.push(handle.value().clone());
                handle.mark_optimistic(true);
            }
            SubmissionEvent::Confirmed { receipt } => {
                tracing::info!(
                    "mint of {} confirmed as token {} in block {}",
                    handle.value(),
                    receipt.event.index,
                    receipt.block_number
                );
            }
            SubmissionEvent::Rejected { cause } if cause.is_user_cancellation() => {
                tracing::debug!("mint of {} cancelled by user", handle.value());
            }
            SubmissionEvent::Rejected { cause } => {
                tracing::warn!("mint of {} failed: {cause}", handle.value());
                if policy == ReconcilePolicy::RevertOnReject && handle.optimistic() {
                    if let Some(pos) = colors.iter().rposition(|c| c == handle.value()) {
                        colors.remove(pos);
                    }
                    handle.mark_optimistic(false);
                }
            }
        }
    }
}

fn fetch_err(source: TransportError) -> SyncError {
    SyncError::TransientFetch { source }
}

/// A contract missing at its recorded address is reported like a missing
/// deployment: the feature is unavailable on this network.
fn read_err(network: NetworkId, source: TransportError) -> SyncError {
    match source {
        TransportError::UnknownContract { .. } => SyncError::NoDeployment { network },
        other => fetch_err(other),
    }
}
