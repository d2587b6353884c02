//! Sync client tests against an in-memory scripted ledger.
//!
//! Each test builds its own `FakeLedger`; nothing is shared between tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hexmint_core::{
    AccountId, ColorValue, ContractAddress, Deployment, DeploymentBook, NetworkId, Registry,
    RegistryError,
};
use hexmint_sync::{
    LedgerTransport, ReconcilePolicy, Receipt, RejectCause, SubmissionEvent, SubmissionOutcome,
    SyncClient, SyncError, TransportError, TxEvent, TxHash, TxSender, TxStream, ValidationError,
};

const DEV: NetworkId = NetworkId(5777);

fn contract() -> ContractAddress {
    ContractAddress::from("0x00000000000000000000000000000000000c0102")
}

fn alice() -> AccountId {
    AccountId::from("0x00000000000000000000000000000000000a11ce")
}

fn book() -> DeploymentBook {
    let mut book = DeploymentBook::default();
    book.insert(DEV, Deployment::new(contract()));
    book
}

/// How the fake answers `send_mint`.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Script {
    /// Apply to the registry immediately: hash, then receipt or duplicate error.
    Apply,
    /// Decline before acceptance (user cancellation).
    Decline,
    /// Emit the hash only; the test finishes the transaction by hand.
    Hold,
}

struct FakeLedger {
    registry: Mutex<Registry>,
    accounts: Vec<AccountId>,
    bulk: bool,
    fail_at: Option<u64>,
    script: Mutex<Script>,
    held: Mutex<Vec<TxSender>>,
    color_at_calls: AtomicUsize,
    range_calls: AtomicUsize,
    sends: AtomicUsize,
}

impl FakeLedger {
    fn new(registry: Registry) -> Self {
        Self {
            registry: Mutex::new(registry),
            accounts: vec![alice()],
            bulk: false,
            fail_at: None,
            script: Mutex::new(Script::Apply),
            held: Mutex::new(Vec::new()),
            color_at_calls: AtomicUsize::new(0),
            range_calls: AtomicUsize::new(0),
            sends: AtomicUsize::new(0),
        }
    }

    fn seeded(values: &[&str]) -> Self {
        Self::new(Registry::seeded(&alice(), values.iter().copied()).expect("seed"))
    }

    fn set_script(&self, script: Script) {
        *self.script.lock().unwrap() = script;
    }

    fn take_held(&self) -> TxSender {
        self.held.lock().unwrap().pop().expect("held transaction")
    }
}

#[async_trait]
impl LedgerTransport for FakeLedger {
    async fn network_id(&self) -> Result<NetworkId, TransportError> {
        Ok(DEV)
    }

    async fn accounts(&self) -> Result<Vec<AccountId>, TransportError> {
        Ok(self.accounts.clone())
    }

    async fn total_supply(&self, address: &ContractAddress) -> Result<u64, TransportError> {
        check_contract(address)?;
        Ok(self.registry.lock().unwrap().total_supply())
    }

    async fn color_at(
        &self,
        address: &ContractAddress,
        position: u64,
    ) -> Result<ColorValue, TransportError> {
        check_contract(address)?;
        self.color_at_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == Some(position) {
            return Err(TransportError::Unavailable("connection reset".into()));
        }
        self.registry
            .lock()
            .unwrap()
            .color_at(position)
            .cloned()
            .map_err(|_| TransportError::NotFound { position })
    }

    async fn colors_range(
        &self,
        address: &ContractAddress,
        start: u64,
        count: u64,
    ) -> Result<Option<Vec<ColorValue>>, TransportError> {
        check_contract(address)?;
        if !self.bulk {
            return Ok(None);
        }
        self.range_calls.fetch_add(1, Ordering::SeqCst);
        self.registry
            .lock()
            .unwrap()
            .colors_range(start, count)
            .map(Some)
            .map_err(|_| TransportError::NotFound { position: start })
    }

    async fn send_mint(
        &self,
        address: &ContractAddress,
        from: &AccountId,
        value: ColorValue,
    ) -> Result<TxStream, TransportError> {
        check_contract(address)?;
        let n = self.sends.fetch_add(1, Ordering::SeqCst);
        let (tx, stream) = TxStream::channel();
        let hash = TxHash(format!("0x{n:064x}"));
        match *self.script.lock().unwrap() {
            Script::Decline => {
                tx.send(TxEvent::Error(RejectCause::UserRejected)).unwrap();
            }
            Script::Hold => {
                tx.send(TxEvent::Hash(hash)).unwrap();
                self.held.lock().unwrap().push(tx);
            }
            Script::Apply => {
                tx.send(TxEvent::Hash(hash.clone())).unwrap();
                let result = self.registry.lock().unwrap().mint(from, value);
                let event = match result {
                    Ok(event) => TxEvent::Receipt(Receipt {
                        tx: hash,
                        block_number: n as u64 + 1,
                        event,
                    }),
                    Err(RegistryError::DuplicateValue { value }) => {
                        TxEvent::Error(RejectCause::DuplicateValue { value })
                    }
                    Err(other) => TxEvent::Error(RejectCause::Reverted {
                        reason: other.to_string(),
                    }),
                };
                tx.send(event).unwrap();
            }
        }
        Ok(stream)
    }
}

fn check_contract(address: &ContractAddress) -> Result<(), TransportError> {
    if *address == contract() {
        Ok(())
    } else {
        Err(TransportError::UnknownContract {
            address: address.clone(),
        })
    }
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn strs(colors: &[ColorValue]) -> Vec<&str> {
    colors.iter().map(ColorValue::as_str).collect()
}

// ---------------------------------------------------------------------------
// 1. Loading
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_state_falls_back_to_sequential_reads() {
    init_logs();
    let ledger = Arc::new(FakeLedger::seeded(&["#EC5856", "#5386E4", "#ffffff"]));
    let mut client = SyncClient::new(ledger.clone(), book());

    let state = client.load_state().await.expect("load");
    assert_eq!(state.account, alice());
    assert_eq!(state.total_supply, 3);
    assert_eq!(strs(&state.colors), ["#EC5856", "#5386E4", "#ffffff"]);
    assert_eq!(ledger.color_at_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn load_state_prefers_bulk_range() {
    let mut ledger = FakeLedger::seeded(&["#000001", "#000002"]);
    ledger.bulk = true;
    let ledger = Arc::new(ledger);
    let mut client = SyncClient::new(ledger.clone(), book());

    let state = client.load_state().await.expect("load");
    assert_eq!(strs(&state.colors), ["#000001", "#000002"]);
    assert_eq!(ledger.range_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ledger.color_at_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn load_state_without_deployment_is_no_deployment() {
    let ledger = Arc::new(FakeLedger::seeded(&[]));
    let mut client = SyncClient::new(ledger, DeploymentBook::default());

    let err = client.load_state().await.unwrap_err();
    assert!(matches!(err, SyncError::NoDeployment { network: DEV }), "got: {err}");
    assert!(err.notice().contains("not deployed"));
}

#[tokio::test]
async fn load_state_against_wrong_address_is_no_deployment() {
    let ledger = Arc::new(FakeLedger::seeded(&[]));
    let mut stale = DeploymentBook::default();
    stale.insert(DEV, Deployment::new(ContractAddress::from("0xdead")));
    let mut client = SyncClient::new(ledger, stale);

    let err = client.load_state().await.unwrap_err();
    assert!(matches!(err, SyncError::NoDeployment { .. }), "got: {err}");
}

#[tokio::test]
async fn sequential_load_stops_at_first_failure_and_keeps_old_mirror() {
    let ledger = Arc::new(FakeLedger::seeded(&["#000001", "#000002", "#000003", "#000004"]));
    let mut client = SyncClient::new(ledger.clone(), book());
    client.load_state().await.expect("first load");

    let mut failing = FakeLedger::seeded(&["#000001", "#000002", "#000003", "#000004"]);
    failing.fail_at = Some(1);
    let failing = Arc::new(failing);
    let mut broken = SyncClient::new(failing.clone(), book());
    let err = broken.load_state().await.unwrap_err();
    assert!(matches!(err, SyncError::TransientFetch { .. }), "got: {err}");
    assert_eq!(failing.color_at_calls.load(Ordering::SeqCst), 2, "no reads past the failure");
    assert!(broken.state().is_none());

    // A successful mirror survives a later failed reload.
    assert_eq!(client.colors().len(), 4);
}

#[tokio::test]
async fn load_state_without_accounts_fails() {
    let mut ledger = FakeLedger::seeded(&[]);
    ledger.accounts.clear();
    let mut client = SyncClient::new(Arc::new(ledger), book());
    assert!(matches!(client.load_state().await.unwrap_err(), SyncError::NoAccount));
}

#[tokio::test]
async fn load_state_is_idempotent_and_replaces_mirror() {
    let ledger = Arc::new(FakeLedger::seeded(&["#000001"]));
    let mut client = SyncClient::new(ledger.clone(), book());
    client.load_state().await.expect("load");

    ledger
        .registry
        .lock()
        .unwrap()
        .mint(&alice(), "#000002".into())
        .expect("out-of-band mint");
    assert_eq!(client.colors().len(), 1, "mirror is not refreshed implicitly");

    let state = client.load_state().await.expect("reload");
    assert_eq!(strs(&state.colors), ["#000001", "#000002"]);
}

// ---------------------------------------------------------------------------
// 2. Validation never reaches the ledger
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_failures_are_local() {
    let ledger = Arc::new(FakeLedger::seeded(&["#EC5856"]));
    let mut client = SyncClient::new(ledger.clone(), book());
    client.load_state().await.expect("load");

    let cases = [
        ("", ValidationError::EmptyInput),
        ("ABCDEFG", ValidationError::MissingHash),
        ("#FFF", ValidationError::BadLength),
        ("a#FFFFF", ValidationError::HashNotLeading),
        ("##FFFFF", ValidationError::MultipleHash),
        ("#EC5856", ValidationError::AlreadyRegistered("#EC5856".into())),
    ];
    for (raw, expected) in cases {
        match client.submit_raw(raw).await {
            Err(SyncError::Validation(err)) => assert_eq!(err, expected, "input {raw:?}"),
            Err(other) => panic!("input {raw:?}: expected validation error, got {other}"),
            Ok(_) => panic!("input {raw:?}: expected validation error"),
        }
    }
    assert_eq!(ledger.sends.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn submit_before_load_is_rejected() {
    let ledger = Arc::new(FakeLedger::seeded(&[]));
    let mut client = SyncClient::new(ledger, book());
    let err = client.submit("#000000".into()).await.unwrap_err();
    assert!(matches!(err, SyncError::NotLoaded));
}

// ---------------------------------------------------------------------------
// 3. Submission lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn confirmed_mint_is_appended_on_acceptance() {
    let ledger = Arc::new(FakeLedger::seeded(&["#EC5856"]));
    ledger.set_script(Script::Hold);
    let mut client = SyncClient::new(ledger.clone(), book());
    client.load_state().await.expect("load");

    let mut handle = client.submit_raw("#5386E4").await.expect("submit");
    let accepted = client.next_event(&mut handle).await.expect("accepted");
    assert!(matches!(accepted, SubmissionEvent::Accepted { .. }));
    assert_eq!(strs(client.colors()), ["#EC5856", "#5386E4"], "optimistic append");

    // Confirm by hand.
    let event = ledger
        .registry
        .lock()
        .unwrap()
        .mint(&alice(), "#5386E4".into())
        .expect("apply");
    let sender = ledger.take_held();
    sender
        .send(TxEvent::Receipt(Receipt {
            tx: handle.tx().cloned().expect("tx"),
            block_number: 2,
            event,
        }))
        .unwrap();

    let outcome = client.settle(handle).await.expect("terminal outcome");
    assert!(matches!(outcome, SubmissionOutcome::Confirmed(_)));
    assert_eq!(client.colors().len(), 2, "confirmation adds nothing");
}

#[tokio::test]
async fn user_cancellation_is_silent_and_changes_nothing() {
    let ledger = Arc::new(FakeLedger::seeded(&["#EC5856"]));
    ledger.set_script(Script::Decline);
    let mut client = SyncClient::new(ledger.clone(), book());
    client.load_state().await.expect("load");

    let handle = client.submit_raw("#5386E4").await.expect("submit");
    let outcome = client.settle(handle).await.expect("terminal outcome");
    assert_eq!(outcome, SubmissionOutcome::Cancelled);
    assert!(outcome.notice().is_none());
    assert_eq!(strs(client.colors()), ["#EC5856"]);
    assert_eq!(ledger.registry.lock().unwrap().total_supply(), 1);
}

async fn race_lost(policy: ReconcilePolicy) -> (SubmissionOutcome, Vec<String>) {
    let ledger = Arc::new(FakeLedger::seeded(&[]));
    let mut client = SyncClient::new(ledger.clone(), book()).with_policy(policy);
    client.load_state().await.expect("load");

    // Another client mints the value after our mirror was loaded.
    ledger
        .registry
        .lock()
        .unwrap()
        .mint(&AccountId::from("0xb0b"), "#123456".into())
        .expect("rival mint");

    let handle = client.submit_raw("#123456").await.expect("passes local validation");
    let outcome = client.settle(handle).await.expect("terminal outcome");
    let colors = client.colors().iter().map(|c| c.0.clone()).collect();
    (outcome, colors)
}

#[tokio::test]
async fn late_duplicate_keeps_optimistic_entry_by_default() {
    let (outcome, colors) = race_lost(ReconcilePolicy::KeepOptimistic).await;
    assert_eq!(
        outcome,
        SubmissionOutcome::Failed(RejectCause::DuplicateValue {
            value: "#123456".into()
        })
    );
    assert!(outcome.notice().is_some(), "surfaced as a generic failure");
    assert_eq!(colors, ["#123456"], "optimistic entry is not rolled back");
}

#[tokio::test]
async fn late_duplicate_is_reverted_when_configured() {
    let (outcome, colors) = race_lost(ReconcilePolicy::RevertOnReject).await;
    assert!(matches!(outcome, SubmissionOutcome::Failed(_)));
    assert!(colors.is_empty());
}

#[tokio::test]
async fn dropped_transaction_fails_with_node_stopped() {
    let ledger = Arc::new(FakeLedger::seeded(&[]));
    ledger.set_script(Script::Hold);
    let mut client = SyncClient::new(ledger.clone(), book());
    client.load_state().await.expect("load");

    let handle = client.submit_raw("#000000").await.expect("submit");
    drop(ledger.take_held());
    let outcome = client.settle(handle).await.expect("terminal outcome");
    assert_eq!(outcome, SubmissionOutcome::Failed(RejectCause::NodeStopped));
}

#[tokio::test]
async fn settling_a_drained_handle_yields_nothing() {
    let ledger = Arc::new(FakeLedger::seeded(&[]));
    let mut client = SyncClient::new(ledger.clone(), book());
    client.load_state().await.expect("load");

    let mut handle = client.submit_raw("#0a0b0c").await.expect("submit");
    while client.next_event(&mut handle).await.is_some() {}
    assert!(handle.is_finished());

    assert_eq!(client.settle(handle).await, None);
    assert_eq!(strs(client.colors()), ["#0a0b0c"]);
    assert_eq!(ledger.registry.lock().unwrap().total_supply(), 1);
}

// ---------------------------------------------------------------------------
// 4. Round trip
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reload_after_confirmed_mints_matches_submission_order() {
    let ledger = Arc::new(FakeLedger::seeded(&[]));
    let mut client = SyncClient::new(ledger.clone(), book());
    client.load_state().await.expect("load");

    let submitted = ["#EC5856", "#5386E4", "#ffffff", "#000000"];
    for raw in submitted {
        let handle = client.submit_raw(raw).await.expect("submit");
        assert!(matches!(client.settle(handle).await.expect("terminal outcome"), SubmissionOutcome::Confirmed(_)));
    }
    assert!(matches!(
        client.submit_raw("#EC5856").await,
        Err(SyncError::Validation(ValidationError::AlreadyRegistered(_)))
    ));

    let mut fresh = SyncClient::new(ledger, book());
    let state = fresh.load_state().await.expect("reload");
    assert_eq!(state.total_supply, 4);
    assert_eq!(strs(&state.colors), submitted);
    assert_eq!(strs(client.colors()), submitted, "mirror converged");
}

#[tokio::test]
async fn preferred_account_is_used_for_submission() {
    let ledger = Arc::new(FakeLedger::seeded(&[]));
    let bob = AccountId::from("0x0000000000000000000000000000000000000b0b");
    let mut client = SyncClient::new(ledger.clone(), book()).with_account(bob.clone());
    assert_eq!(client.load_state().await.expect("load").account, bob);

    let handle = client.submit_raw("#000000").await.expect("submit");
    match client.settle(handle).await.expect("terminal outcome") {
        SubmissionOutcome::Confirmed(receipt) => {
            assert_eq!(receipt.event.to, bob);
            assert!(receipt.event.from.is_zero());
        }
        other => panic!("expected confirmation, got {other:?}"),
    }
}
