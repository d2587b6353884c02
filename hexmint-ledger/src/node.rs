//! In-process ledger node hosting one registry deployment.
//!
//! Reads go straight to the shared registry. Mints are approved, hashed and
//! queued by the caller's task; a single processor task applies queued mints
//! in order, so the uniqueness check and the append are one atomic step and
//! concurrent submissions of the same value resolve to one winner. A
//! persisting node extends that step across processes: reload, mint and save
//! happen under a file lock, and nothing is confirmed until it is on disk.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;

use hexmint_core::{
    store, AccountId, ColorValue, ContractAddress, MintEvent, NetworkId, Registry, RegistryError,
};
use hexmint_sync::{Receipt, RejectCause, TransportError, TxEvent, TxHash, TxSender, TxStream};

use crate::approval::{Approver, AutoApprove, MintRequest};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::ids::tx_hash;
use crate::lock::SnapshotLock;

const JOB_QUEUE_DEPTH: usize = 64;
const EVENT_BUFFER: usize = 256;

struct MintJob {
    tx: TxHash,
    from: AccountId,
    value: ColorValue,
    respond_to: TxSender,
}

/// Builder for a ledger node. Nothing runs until [`LedgerNode::spawn`].
pub struct LedgerNode {
    config: LedgerConfig,
    registry: Registry,
    contract: Option<ContractAddress>,
    approver: Arc<dyn Approver>,
    home: Option<PathBuf>,
}

impl LedgerNode {
    pub fn new(config: LedgerConfig, registry: Registry) -> Self {
        Self {
            config,
            registry,
            contract: None,
            approver: Arc::new(AutoApprove),
            home: None,
        }
    }

    /// Serve the registry at `contract`. Without one, every read and mint
    /// fails with `UnknownContract`.
    pub fn deployed_at(mut self, contract: ContractAddress) -> Self {
        self.contract = Some(contract);
        self
    }

    pub fn with_approver(mut self, approver: impl Approver + 'static) -> Self {
        self.approver = Arc::new(approver);
        self
    }

    /// Persist every mint under `home` before confirming it. Mints reload the
    /// snapshot under an exclusive per-network lock, so several nodes may
    /// share one home.
    pub fn persist_to(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Start the processor task on the current tokio runtime.
    pub fn spawn(self) -> LedgerHandle {
        let registry = Arc::new(RwLock::new(self.registry));
        let (jobs_tx, jobs_rx) = mpsc::channel::<MintJob>(JOB_QUEUE_DEPTH);
        let (events_tx, _) = broadcast::channel::<MintEvent>(EVENT_BUFFER);
        let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);

        let processor = Processor {
            network: self.config.network_id,
            registry: registry.clone(),
            events: events_tx.clone(),
            delay: self.config.confirmation_delay(),
            home: self.home,
            block_number: 0,
        };
        let task = tokio::spawn(processor_task(processor, jobs_rx, shutdown_rx));

        tracing::info!(
            network = %self.config.network_id,
            contract = ?self.contract.as_ref().map(|c| c.0.as_str()),
            accounts = self.config.accounts.len(),
            "ledger node started",
        );

        LedgerHandle {
            shared: Arc::new(Shared {
                network: self.config.network_id,
                accounts: self.config.accounts,
                contract: self.contract,
                registry,
                approver: self.approver,
                jobs: jobs_tx,
                events: events_tx,
                shutdown: shutdown_tx,
                nonce: AtomicU64::new(0),
                processor: Mutex::new(Some(task)),
            }),
        }
    }
}

struct Shared {
    network: NetworkId,
    accounts: Vec<AccountId>,
    contract: Option<ContractAddress>,
    registry: Arc<RwLock<Registry>>,
    approver: Arc<dyn Approver>,
    jobs: mpsc::Sender<MintJob>,
    events: broadcast::Sender<MintEvent>,
    shutdown: broadcast::Sender<()>,
    nonce: AtomicU64,
    processor: Mutex<Option<JoinHandle<()>>>,
}

/// Cheap, cloneable connection to a running node.
#[derive(Clone)]
pub struct LedgerHandle {
    shared: Arc<Shared>,
}

impl LedgerHandle {
    pub fn network(&self) -> NetworkId {
        self.shared.network
    }

    pub fn managed_accounts(&self) -> &[AccountId] {
        &self.shared.accounts
    }

    pub fn contract(&self) -> Option<&ContractAddress> {
        self.shared.contract.as_ref()
    }

    /// Every `MintEvent` applied from now on, across all senders.
    pub fn subscribe_events(&self) -> broadcast::Receiver<MintEvent> {
        self.shared.events.subscribe()
    }

    /// Copy of the registry as currently applied.
    pub async fn snapshot(&self) -> Registry {
        self.shared.registry.read().await.clone()
    }

    /// Run `read` against the registry behind `contract`.
    pub(crate) async fn read<R>(
        &self,
        contract: &ContractAddress,
        read: impl FnOnce(&Registry) -> R,
    ) -> Result<R, TransportError> {
        self.check_contract(contract)?;
        let registry = self.shared.registry.read().await;
        Ok(read(&registry))
    }

    fn check_contract(&self, contract: &ContractAddress) -> Result<(), TransportError> {
        match &self.shared.contract {
            Some(deployed) if deployed == contract => Ok(()),
            _ => Err(TransportError::UnknownContract {
                address: contract.clone(),
            }),
        }
    }

    /// Approve, hash and queue a mint. Terminal results arrive on the stream.
    pub(crate) async fn enqueue_mint(
        &self,
        contract: &ContractAddress,
        from: &AccountId,
        value: ColorValue,
    ) -> Result<TxStream, TransportError> {
        self.check_contract(contract)?;
        let (events, stream) = TxStream::channel();

        if !self.shared.accounts.contains(from) {
            tracing::warn!(account = %from, "mint from unmanaged account");
            let _ = events.send(TxEvent::Error(RejectCause::UnknownAccount {
                account: from.clone(),
            }));
            return Ok(stream);
        }

        let request = MintRequest {
            from: from.clone(),
            value,
        };
        // Approvers may block on a human, so keep them off the runtime workers.
        let approver = self.shared.approver.clone();
        let pending = request.clone();
        match tokio::task::spawn_blocking(move || approver.approve(&pending)).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(account = %from, color = %request.value, "mint declined by account holder");
                let _ = events.send(TxEvent::Error(RejectCause::UserRejected));
                return Ok(stream);
            }
            Err(err) => {
                tracing::error!(account = %from, error = %err, "approval task join failure");
                let _ = events.send(TxEvent::Error(RejectCause::Reverted {
                    reason: format!("approval task join failure: {err}"),
                }));
                return Ok(stream);
            }
        }

        let nonce = self.shared.nonce.fetch_add(1, Ordering::SeqCst);
        let tx = tx_hash(&request.from, &request.value, nonce);
        let _ = events.send(TxEvent::Hash(tx.clone()));
        tracing::debug!(tx = %tx, account = %from, color = %request.value, "mint queued");

        let job = MintJob {
            tx,
            from: request.from,
            value: request.value,
            respond_to: events,
        };
        if let Err(mpsc::error::SendError(job)) = self.shared.jobs.send(job).await {
            let _ = job.respond_to.send(TxEvent::Error(RejectCause::NodeStopped));
        }
        Ok(stream)
    }

    /// Stop accepting mints, apply everything already queued, then stop the
    /// processor. Idempotent.
    pub async fn shutdown(&self) {
        let _ = self.shared.shutdown.send(());
        let task = self.shared.processor.lock().await.take();
        if let Some(task) = task {
            if let Err(err) = task.await {
                tracing::error!(error = %err, "ledger processor task join failure");
            }
            tracing::info!(network = %self.shared.network, "ledger node stopped");
        }
    }
}

struct Processor {
    network: NetworkId,
    registry: Arc<RwLock<Registry>>,
    events: broadcast::Sender<MintEvent>,
    delay: Duration,
    home: Option<PathBuf>,
    block_number: u64,
}

async fn processor_task(
    mut processor: Processor,
    mut jobs_rx: mpsc::Receiver<MintJob>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                jobs_rx.close();
                while let Some(job) = jobs_rx.recv().await {
                    processor.apply(job).await;
                }
                break;
            }
            maybe_job = jobs_rx.recv() => {
                let Some(job) = maybe_job else { break };
                processor.apply(job).await;
            }
        }
    }
}

impl Processor {
    async fn apply(&mut self, job: MintJob) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.block_number += 1;

        let minted = match self.home.clone() {
            Some(home) => {
                self.commit_durable(home, job.from.clone(), job.value.clone())
                    .await
            }
            None => self
                .registry
                .write()
                .await
                .mint(&job.from, job.value.clone())
                .map_err(LedgerError::from),
        };

        let outcome = match minted {
            Ok(event) => {
                tracing::info!(
                    tx = %job.tx,
                    index = %event.index,
                    color = %job.value,
                    block = self.block_number,
                    "mint confirmed",
                );
                let _ = self.events.send(event.clone());
                TxEvent::Receipt(Receipt {
                    tx: job.tx,
                    block_number: self.block_number,
                    event,
                })
            }
            Err(LedgerError::Registry(RegistryError::DuplicateValue { value })) => {
                tracing::info!(tx = %job.tx, color = %value, "mint reverted: duplicate color");
                TxEvent::Error(RejectCause::DuplicateValue { value })
            }
            Err(err) => {
                tracing::error!(tx = %job.tx, error = %err, "mint reverted");
                TxEvent::Error(RejectCause::Reverted {
                    reason: err.to_string(),
                })
            }
        };
        let _ = job.respond_to.send(outcome);
    }

    /// Reload the snapshot under the network lock, mint into it and write it
    /// back before anything is reported. The live registry adopts whatever
    /// was loaded unless the write fails, in which case it is left untouched.
    async fn commit_durable(
        &self,
        home: PathBuf,
        from: AccountId,
        value: ColorValue,
    ) -> Result<MintEvent, LedgerError> {
        let network = self.network;

        let (minted, current) = tokio::task::spawn_blocking(move || {
            let _lock = SnapshotLock::acquire(&home, network)?;
            let mut registry = store::load_snapshot_or_new_at(&home, network)?;
            let minted = registry.mint(&from, value);
            if minted.is_ok() {
                store::save_snapshot_at(&home, network, &registry)?;
            }
            Ok::<_, LedgerError>((minted, registry))
        })
        .await
        .map_err(|err| LedgerError::Join {
            task: "snapshot",
            message: err.to_string(),
        })??;

        *self.registry.write().await = current;
        Ok(minted?)
    }
}
