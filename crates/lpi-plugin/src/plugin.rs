use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info};

use lpi_events::{
    EventEmitter, HandlerRegistry, LedgerEvent, LedgerEventHandler, QueuedEventEmitter,
    SyncEventEmitter,
};
use lpi_ledger::SimulatedLedger;
use lpi_types::{
    Fulfillment, HandlerId, LedgerAddress, LedgerInfo, LedgerPluginTypeId, Message,
    RejectionReason, Transfer, TransferId,
};

use crate::adapter::{LedgerAdapter, SimulatedLedgerAdapter};
use crate::config::{PluginConfig, SimulatedPluginConfig};
use crate::error::{PluginError, PluginResult};

/// A plugin managing one connector account on one ledger.
///
/// Lifecycle, handler registration and event delivery live here; everything
/// ledger-specific is delegated to the adapter `A`.
pub struct LedgerPlugin<A: LedgerAdapter> {
    config: PluginConfig,
    adapter: A,
    connected: AtomicBool,
    handlers: Arc<HandlerRegistry>,
    emitter: Arc<dyn EventEmitter>,
    queue: Option<QueuedEventEmitter>,
}

/// A plugin backed by a [`SimulatedLedger`].
pub type MockLedgerPlugin = LedgerPlugin<SimulatedLedgerAdapter>;

impl<A: LedgerAdapter> LedgerPlugin<A> {
    /// A plugin whose handlers run synchronously inside each emit.
    pub fn new(config: PluginConfig, adapter: A) -> Self {
        let handlers = Arc::new(HandlerRegistry::new());
        let emitter = Arc::new(SyncEventEmitter::new(Arc::clone(&handlers)));
        Self::with_emitter(config, adapter, handlers, emitter)
    }

    /// A plugin whose handlers run on a background task, in emit order.
    ///
    /// Must be called from within a tokio runtime.
    pub fn queued(config: PluginConfig, adapter: A) -> Self {
        let handlers = Arc::new(HandlerRegistry::new());
        let (queue, _worker) = QueuedEventEmitter::spawn(Arc::clone(&handlers));
        let mut plugin =
            Self::with_emitter(config, adapter, handlers, Arc::new(queue.clone()));
        plugin.queue = Some(queue);
        plugin
    }

    /// A plugin with a caller-supplied emitter. `emitter` should deliver to
    /// `handlers`, otherwise [`add_handler`](Self::add_handler) has no effect.
    pub fn with_emitter(
        config: PluginConfig,
        adapter: A,
        handlers: Arc<HandlerRegistry>,
        emitter: Arc<dyn EventEmitter>,
    ) -> Self {
        Self {
            config,
            adapter,
            connected: AtomicBool::new(false),
            handlers,
            emitter,
            queue: None,
        }
    }

    pub fn plugin_type(&self) -> &LedgerPluginTypeId {
        &self.config.plugin_type
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn emitter(&self) -> &Arc<dyn EventEmitter> {
        &self.emitter
    }

    /// Connect to the ledger.
    ///
    /// Does nothing when already connected. Failures are not returned: they
    /// are logged and reported to handlers as an error event.
    pub fn connect(&self) {
        if self.is_connected() {
            debug!(ledger_prefix = %self.config.ledger_prefix, "already connected");
            return;
        }

        match self
            .adapter
            .connect(&self.config.connector_account, Arc::clone(&self.emitter))
        {
            Ok(()) => {
                if self
                    .connected
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    info!(
                        ledger_prefix = %self.config.ledger_prefix,
                        connector = %self.config.connector_account,
                        "plugin connected"
                    );
                    self.emitter.emit(LedgerEvent::Connected {
                        ledger_prefix: self.config.ledger_prefix.clone(),
                    });
                }
            }
            Err(err) => {
                error!(
                    ledger_prefix = %self.config.ledger_prefix,
                    error = %err,
                    "plugin failed to connect"
                );
                self.emitter.emit(LedgerEvent::Error {
                    ledger_prefix: self.config.ledger_prefix.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    /// Disconnect from the ledger. Does nothing when already disconnected.
    pub fn disconnect(&self) -> PluginResult<()> {
        if !self.is_connected() {
            debug!(ledger_prefix = %self.config.ledger_prefix, "already disconnected");
            return Ok(());
        }

        self.adapter.disconnect(&self.config.connector_account)?;
        if self
            .connected
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            info!(ledger_prefix = %self.config.ledger_prefix, "plugin disconnected");
            self.emitter.emit(LedgerEvent::Disconnected {
                ledger_prefix: self.config.ledger_prefix.clone(),
            });
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn ledger_info(&self) -> PluginResult<LedgerInfo> {
        self.ensure_connected()?;
        Ok(self.adapter.ledger_info())
    }

    pub fn connector_account(&self) -> PluginResult<&LedgerAddress> {
        self.ensure_connected()?;
        Ok(&self.config.connector_account)
    }

    pub fn connector_balance(&self) -> PluginResult<i128> {
        self.ensure_connected()?;
        Ok(self.adapter.balance(&self.config.connector_account)?)
    }

    /// The proof that executed `transfer_id`, if it has been executed.
    pub fn get_fulfillment(&self, transfer_id: &TransferId) -> Option<Fulfillment> {
        self.adapter.get_fulfillment(transfer_id)
    }

    /// Prepare a transfer from the connector account.
    pub fn send_transfer(&self, transfer: Transfer) -> PluginResult<()> {
        debug!(transfer_id = %transfer.transfer_id(), "send_transfer");
        self.adapter
            .send_transfer(&self.config.connector_account, transfer)?;
        Ok(())
    }

    pub fn send_message(&self, message: &Message) -> PluginResult<()> {
        debug!(message_id = %message.id, "send_message");
        self.adapter
            .send_message(&self.config.connector_account, message)?;
        Ok(())
    }

    pub fn fulfill_condition(
        &self,
        transfer_id: &TransferId,
        fulfillment: &Fulfillment,
    ) -> PluginResult<()> {
        debug!(transfer_id = %transfer_id, "fulfill_condition");
        self.adapter.fulfill_condition(transfer_id, fulfillment)?;
        Ok(())
    }

    /// Reject a transfer addressed to the connector account.
    pub fn reject_incoming_transfer(
        &self,
        transfer_id: &TransferId,
        reason: RejectionReason,
    ) -> PluginResult<()> {
        debug!(transfer_id = %transfer_id, reason = %reason, "reject_incoming_transfer");
        self.adapter.reject_incoming_transfer(
            &self.config.connector_account,
            transfer_id,
            reason,
        )?;
        Ok(())
    }

    pub fn add_handler(&self, handler: Arc<dyn LedgerEventHandler>) -> HandlerId {
        self.handlers.add(handler)
    }

    pub fn remove_handler(&self, handler_id: &HandlerId) {
        self.handlers.remove(handler_id);
    }

    /// Wait until every event emitted so far has reached the handlers.
    ///
    /// Returns immediately for synchronous plugins.
    pub async fn flush(&self) -> PluginResult<()> {
        if let Some(queue) = &self.queue {
            queue.flush().await?;
        }
        Ok(())
    }

    fn ensure_connected(&self) -> PluginResult<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(PluginError::NotConnected {
                ledger_prefix: self.config.ledger_prefix.clone(),
            })
        }
    }
}

impl MockLedgerPlugin {
    /// A synchronous plugin attached to `ledger`.
    pub fn simulated(config: SimulatedPluginConfig, ledger: Arc<SimulatedLedger>) -> Self {
        let adapter = SimulatedLedgerAdapter::new(ledger, config.password);
        Self::new(config.base, adapter)
    }

    /// A queued plugin attached to `ledger`. Must be called from within a
    /// tokio runtime.
    pub fn simulated_queued(config: SimulatedPluginConfig, ledger: Arc<SimulatedLedger>) -> Self {
        let adapter = SimulatedLedgerAdapter::new(ledger, config.password);
        Self::queued(config.base, adapter)
    }

    pub fn simulated_ledger(&self) -> &Arc<SimulatedLedger> {
        self.adapter.ledger()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{Duration, Utc};
    use lpi_events::EventKind;
    use lpi_ledger::{LedgerError, TransferHolder, TransferStatus};
    use lpi_types::{CurrencyUnit, ErrorCode};

    use super::*;
    use crate::config::{CONNECTOR_ACCOUNT, EXPECTED_CURRENCY_UNIT, LEDGER_PREFIX, PASSWORD};

    const PREIMAGE: &[u8] = b"Roses are red, Violets are blue";
    const ALTERNATE_PREIMAGE: &[u8] = b"Some other preimage that does not match";

    #[derive(Default)]
    struct Recording(Mutex<Vec<LedgerEvent>>);

    impl Recording {
        fn kinds(&self) -> Vec<EventKind> {
            self.0.lock().unwrap().iter().map(|e| e.kind()).collect()
        }

        fn clear(&self) {
            self.0.lock().unwrap().clear();
        }
    }

    impl LedgerEventHandler for Recording {
        fn handle(&self, event: &LedgerEvent) -> lpi_events::Result<()> {
            self.0.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn addr(s: &str) -> LedgerAddress {
        LedgerAddress::new(s).unwrap()
    }

    fn prefix() -> LedgerAddress {
        addr("test1.foo.")
    }

    fn connector() -> LedgerAddress {
        addr("test1.foo.connector")
    }

    fn other() -> LedgerAddress {
        addr("test1.foo.bob")
    }

    fn options(password: Option<&'static str>) -> Vec<(&'static str, &'static str)> {
        let mut options = vec![
            (LEDGER_PREFIX, "test1.foo."),
            (CONNECTOR_ACCOUNT, "test1.foo.connector"),
            (EXPECTED_CURRENCY_UNIT, "USD"),
        ];
        if let Some(password) = password {
            options.push((PASSWORD, password));
        }
        options
    }

    fn simulated_ledger() -> Arc<SimulatedLedger> {
        let info = LedgerInfo::new(prefix(), CurrencyUnit::new("USD").unwrap(), 2)
            .unwrap()
            .with_connector(connector());
        Arc::new(SimulatedLedger::new(info))
    }

    fn setup_with(password: Option<&'static str>) -> (MockLedgerPlugin, Arc<Recording>) {
        let config = SimulatedPluginConfig::from_options(options(password)).unwrap();
        let plugin = MockLedgerPlugin::simulated(config, simulated_ledger());
        let recording = Arc::new(Recording::default());
        plugin.add_handler(recording.clone());
        (plugin, recording)
    }

    /// Connected plugin with the connect event already cleared.
    fn connected() -> (MockLedgerPlugin, Arc<Recording>) {
        let (plugin, recording) = setup_with(None);
        plugin.connect();
        recording.clear();
        (plugin, recording)
    }

    fn transfer(from: LedgerAddress, to: LedgerAddress, amount: i128) -> Transfer {
        Transfer::builder()
            .ledger_prefix(prefix())
            .source_account(from)
            .destination_account(to)
            .amount(amount)
            .execution_condition(Fulfillment::from_preimage(PREIMAGE.to_vec()).condition())
            .expires_at(Utc::now() + Duration::minutes(1))
            .build()
            .unwrap()
    }

    #[test]
    fn plugin_type_is_mock() {
        let (plugin, _) = setup_with(None);
        assert_eq!(plugin.plugin_type().as_str(), "ilp-plugin-mock");
    }

    #[test]
    fn ledger_info_requires_connection() {
        let (plugin, _) = setup_with(None);
        assert!(matches!(
            plugin.ledger_info(),
            Err(PluginError::NotConnected { .. })
        ));

        plugin.connect();
        let info = plugin.ledger_info().unwrap();
        assert_eq!(info.ledger_prefix(), &prefix());
        assert_eq!(info.connector_addresses(), &[connector()]);
    }

    #[test]
    fn connector_account_requires_connection() {
        let (plugin, _) = setup_with(None);
        match plugin.connector_account() {
            Err(PluginError::NotConnected { ledger_prefix }) => assert_eq!(ledger_prefix, prefix()),
            other => panic!("unexpected result: {other:?}"),
        }

        plugin.connect();
        assert_eq!(plugin.connector_account().unwrap(), &connector());
    }

    #[test]
    fn connect_emits_once_and_registers_connection() {
        let (plugin, recording) = setup_with(None);

        plugin.connect();
        plugin.connect();

        assert!(plugin.is_connected());
        assert_eq!(recording.kinds(), vec![EventKind::Connected]);
        assert_eq!(plugin.simulated_ledger().connections().len(), 1);
    }

    #[test]
    fn disconnect_emits_once_and_drops_connection() {
        let (plugin, recording) = connected();

        plugin.disconnect().unwrap();
        plugin.disconnect().unwrap();

        assert!(!plugin.is_connected());
        assert_eq!(recording.kinds(), vec![EventKind::Disconnected]);
        assert!(plugin.simulated_ledger().connections().is_empty());
    }

    #[test]
    fn bad_password_surfaces_as_error_event() {
        let (plugin, recording) = setup_with(Some("letmein"));

        plugin.connect();

        assert!(!plugin.is_connected());
        assert_eq!(recording.kinds(), vec![EventKind::Error]);
        let events = recording.0.lock().unwrap();
        match &events[0] {
            LedgerEvent::Error { ledger_prefix, error } => {
                assert_eq!(ledger_prefix, &prefix());
                assert!(error.contains("connection refused"));
            }
            other => panic!("unexpected event: {other:?}"),
        };
    }

    #[test]
    fn send_transfer_reports_outgoing_prepared() {
        let (plugin, recording) = connected();

        plugin.send_transfer(transfer(connector(), other(), 10)).unwrap();

        assert_eq!(recording.kinds(), vec![EventKind::OutgoingTransferPrepared]);
    }

    #[test]
    fn send_transfer_to_self_is_invalid() {
        let (plugin, recording) = connected();
        let t = transfer(connector(), connector(), 10);

        let err = plugin.send_transfer(t.clone()).unwrap_err();

        match err {
            PluginError::Ledger(LedgerError::InvalidTransfer {
                ledger_prefix,
                transfer_id,
                ..
            }) => {
                assert_eq!(ledger_prefix, prefix());
                assert_eq!(transfer_id, t.transfer_id());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(recording.kinds().is_empty());
    }

    #[test]
    fn send_transfer_on_behalf_of_someone_else_is_refused() {
        let (plugin, recording) = connected();
        let err = plugin
            .send_transfer(transfer(other(), connector(), 10))
            .unwrap_err();
        assert!(matches!(
            err,
            PluginError::Ledger(LedgerError::TransferNotAccepted { .. })
        ));
        assert!(recording.kinds().is_empty());
    }

    #[test]
    fn fulfill_condition_reports_outgoing_fulfilled() {
        let (plugin, recording) = connected();
        let t = transfer(connector(), other(), 10);
        plugin.send_transfer(t.clone()).unwrap();
        recording.clear();

        let fulfillment = Fulfillment::from_preimage(PREIMAGE.to_vec());
        plugin
            .fulfill_condition(&t.transfer_id(), &fulfillment)
            .unwrap();

        assert_eq!(recording.kinds(), vec![EventKind::OutgoingTransferFulfilled]);
        assert_eq!(plugin.get_fulfillment(&t.transfer_id()), Some(fulfillment));
    }

    #[test]
    fn fulfill_with_wrong_preimage_is_invalid() {
        let (plugin, recording) = connected();
        let t = transfer(connector(), other(), 10);
        plugin.send_transfer(t.clone()).unwrap();
        recording.clear();

        let err = plugin
            .fulfill_condition(
                &t.transfer_id(),
                &Fulfillment::from_preimage(ALTERNATE_PREIMAGE.to_vec()),
            )
            .unwrap_err();

        match err {
            PluginError::Ledger(e @ LedgerError::InvalidFulfillment { .. }) => {
                assert_eq!(e.ledger_prefix(), &prefix())
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(recording.kinds().is_empty());
        assert_eq!(plugin.get_fulfillment(&t.transfer_id()), None);
    }

    #[test]
    fn fulfill_missing_transfer_is_not_found() {
        let (plugin, recording) = connected();
        let err = plugin
            .fulfill_condition(
                &TransferId::new(),
                &Fulfillment::from_preimage(PREIMAGE.to_vec()),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            PluginError::Ledger(LedgerError::TransferNotFound { .. })
        ));
        assert!(recording.kinds().is_empty());
    }

    #[test]
    fn transfers_between_other_accounts_are_not_reported() {
        let (plugin, recording) = connected();
        let alice = addr("test1.foo.alice");
        let ledger = plugin.simulated_ledger();

        let t = transfer(alice.clone(), other(), 10);
        ledger.send_transfer(&alice, t.clone()).unwrap();
        ledger
            .fulfill_condition(&t.transfer_id(), &Fulfillment::from_preimage(PREIMAGE.to_vec()))
            .unwrap();

        assert!(recording.kinds().is_empty());
    }

    #[test]
    fn reject_incoming_transfer_reports_rejection() {
        let (plugin, recording) = connected();
        let ledger = plugin.simulated_ledger();
        let t = transfer(other(), connector(), 10);
        ledger.send_transfer(&other(), t.clone()).unwrap();
        assert_eq!(recording.kinds(), vec![EventKind::IncomingTransferPrepared]);
        recording.clear();

        let reason = RejectionReason::new(ErrorCode::InsufficientLiquidity, connector());
        plugin
            .reject_incoming_transfer(&t.transfer_id(), reason)
            .unwrap();

        assert_eq!(recording.kinds(), vec![EventKind::IncomingTransferRejected]);
        assert_eq!(
            ledger.transfer_status(&t.transfer_id()),
            Some(TransferStatus::Rejected)
        );
    }

    #[test]
    fn expiry_reports_incoming_cancelled() {
        let (plugin, recording) = connected();
        let ledger = plugin.simulated_ledger();
        let t = transfer(other(), connector(), 10);
        ledger.send_transfer(&other(), t.clone()).unwrap();
        recording.clear();

        ledger.expire_transfer(&t.transfer_id());

        assert_eq!(recording.kinds(), vec![EventKind::IncomingTransferCancelled]);
    }

    #[test]
    fn connector_balance_follows_ledger() {
        let (plugin, _) = setup_with(None);
        assert!(matches!(
            plugin.connector_balance(),
            Err(PluginError::NotConnected { .. })
        ));
        plugin.connect();
        let ledger = plugin.simulated_ledger();
        ledger.insert_holder(
            TransferHolder::new(transfer(other(), connector(), 100))
                .with_status(TransferStatus::Executed),
        );
        plugin.send_transfer(transfer(connector(), other(), 30)).unwrap();

        assert_eq!(plugin.connector_balance().unwrap(), 70);
    }

    #[test]
    fn connector_balance_reports_overflow() {
        let (plugin, _) = connected();
        plugin
            .send_transfer(transfer(connector(), other(), i128::MIN))
            .unwrap();

        let err = plugin.connector_balance().unwrap_err();
        assert!(matches!(
            err,
            PluginError::Ledger(LedgerError::BalanceOverflow { .. })
        ));
        assert!(err.to_string().contains("test1.foo.connector"));
    }

    #[test]
    fn send_message_reports_outgoing_request() {
        let (plugin, recording) = connected();
        let message = Message::new(prefix(), connector(), other());

        plugin.send_message(&message).unwrap();

        assert_eq!(recording.kinds(), vec![EventKind::OutgoingMessageRequest]);
        let forged = Message::new(prefix(), other(), connector());
        assert!(matches!(
            plugin.send_message(&forged),
            Err(PluginError::Ledger(LedgerError::InvalidMessage { .. }))
        ));
    }

    #[test]
    fn removed_handler_stops_receiving() {
        let (plugin, recording) = setup_with(None);
        let second = Arc::new(Recording::default());
        let second_id = plugin.add_handler(second.clone());

        plugin.remove_handler(&second_id);
        plugin.remove_handler(&second_id);
        plugin.connect();

        assert_eq!(recording.kinds(), vec![EventKind::Connected]);
        assert!(second.kinds().is_empty());
    }

    #[test]
    fn two_plugins_see_both_sides_of_a_transfer() {
        let ledger = simulated_ledger();
        let sender = MockLedgerPlugin::simulated(
            SimulatedPluginConfig::from_options(options(None)).unwrap(),
            Arc::clone(&ledger),
        );
        let receiver = MockLedgerPlugin::simulated(
            SimulatedPluginConfig::from_options(vec![
                (LEDGER_PREFIX, "test1.foo."),
                (CONNECTOR_ACCOUNT, "test1.foo.bob"),
                (EXPECTED_CURRENCY_UNIT, "USD"),
            ])
            .unwrap(),
            Arc::clone(&ledger),
        );
        let sent = Arc::new(Recording::default());
        let received = Arc::new(Recording::default());
        sender.add_handler(sent.clone());
        receiver.add_handler(received.clone());
        sender.connect();
        receiver.connect();

        let t = transfer(connector(), other(), 5);
        sender.send_transfer(t.clone()).unwrap();
        receiver
            .fulfill_condition(&t.transfer_id(), &Fulfillment::from_preimage(PREIMAGE.to_vec()))
            .unwrap();

        assert_eq!(
            sent.kinds(),
            vec![
                EventKind::Connected,
                EventKind::OutgoingTransferPrepared,
                EventKind::OutgoingTransferFulfilled
            ]
        );
        assert_eq!(
            received.kinds(),
            vec![
                EventKind::Connected,
                EventKind::IncomingTransferPrepared,
                EventKind::IncomingTransferFulfilled
            ]
        );
    }

    #[tokio::test]
    async fn queued_plugin_delivers_in_order_after_flush() {
        let config = SimulatedPluginConfig::from_options(options(None)).unwrap();
        let plugin = MockLedgerPlugin::simulated_queued(config, simulated_ledger());
        let recording = Arc::new(Recording::default());
        plugin.add_handler(recording.clone());

        plugin.connect();
        let t = transfer(connector(), other(), 10);
        plugin.send_transfer(t.clone()).unwrap();
        plugin
            .fulfill_condition(&t.transfer_id(), &Fulfillment::from_preimage(PREIMAGE.to_vec()))
            .unwrap();
        plugin.disconnect().unwrap();
        plugin.flush().await.unwrap();

        assert_eq!(
            recording.kinds(),
            vec![
                EventKind::Connected,
                EventKind::OutgoingTransferPrepared,
                EventKind::OutgoingTransferFulfilled,
                EventKind::Disconnected
            ]
        );
    }

    #[tokio::test]
    async fn flush_on_sync_plugin_is_immediate() {
        let (plugin, recording) = setup_with(None);
        plugin.connect();
        plugin.flush().await.unwrap();
        assert_eq!(recording.kinds(), vec![EventKind::Connected]);
    }
}
