//! Background service task: a single `select!` loop that owns the session.
//!
//! The loop receives [`UiEvent`]s from the UI thread, drives the connection
//! manager and the loaders, and sends [`ServiceEvent`]s back. Each submitted
//! action runs in its own task so a slow confirmation never stalls refreshes;
//! finished actions report back through an internal channel.

use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use polylend_core::{
    load_account, load_observed_markets, Action, ActionError, ActionOrchestrator, ActionOutcome,
    ActionRequest, AssetId, ConnectionError, ConnectionManager, MarketBook, MarketObserver,
    Session,
};

use crate::config::Config;
use crate::contracts::RpcContractFactory;
use crate::events::{ServiceEvent, UiEvent};
use crate::rpc_client::EvmRpcClient;

/// Run the service loop until the cancellation token fires.
pub async fn run(
    token: CancellationToken,
    mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    svc_tx: mpsc::UnboundedSender<ServiceEvent>,
    config: Config,
) {
    let client = match EvmRpcClient::new(config.rpc_url.clone(), config.receipt_poll_interval()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            log::error!("Cannot create JSON-RPC client: {}", e);
            let _ = svc_tx.send(ServiceEvent::Error(format!("RPC client: {}", e)));
            return;
        }
    };
    let factory = Arc::new(RpcContractFactory::new(Arc::clone(&client)));
    let manager = ConnectionManager::new(client.clone(), factory, config.deployment.clone());

    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<ActionDone>();

    let mut state = ServiceState {
        svc_tx,
        client,
        manager,
        orchestrator: ActionOrchestrator::new(config.confirmation_timeout()),
        session: None,
        observer: None,
        markets: MarketBook::new(),
        done_tx,
    };

    // Markets are public; show them before any wallet is connected.
    state.observe().await;

    let mut refresh_interval = tokio::time::interval(config.refresh_interval());
    refresh_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // Skip the first immediate tick, the initial load just happened
    refresh_interval.tick().await;

    log::info!("🚀 Service loop started ({})", state.client.endpoint());

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                log::info!("🛑 Service loop shutting down");
                break;
            }

            _ = refresh_interval.tick() => {
                // A provider that stops answering must not hold up shutdown.
                tokio::select! {
                    _ = token.cancelled() => {
                        log::info!("🛑 Service loop shutting down");
                        break;
                    }
                    _ = state.refresh() => {}
                }
            }

            Some(done) = done_rx.recv() => {
                state.finish_action(done);
            }

            Some(event) = ui_rx.recv() => {
                match event {
                    UiEvent::Shutdown => break,
                    UiEvent::Connect => state.connect().await,
                    UiEvent::Disconnect => state.disconnect(),
                    UiEvent::SwitchNetwork => state.switch_network().await,
                    UiEvent::Refresh => state.refresh().await,
                    UiEvent::Submit { asset, action, amount } => {
                        state.submit(ActionRequest::new(asset, action, amount));
                    }
                }
            }
        }
    }
}

/// Result of one spawned action.
struct ActionDone {
    asset: AssetId,
    action: Action,
    decimals: u8,
    result: Result<ActionOutcome, ActionError>,
}

struct ServiceState {
    svc_tx: mpsc::UnboundedSender<ServiceEvent>,
    client: Arc<EvmRpcClient>,
    manager: ConnectionManager,
    orchestrator: ActionOrchestrator,
    session: Option<Arc<Session>>,
    observer: Option<MarketObserver>,
    /// Last market book sent to the UI; feeds the borrow liquidity check.
    markets: MarketBook,
    done_tx: mpsc::UnboundedSender<ActionDone>,
}

impl ServiceState {
    fn send(&self, event: ServiceEvent) {
        let _ = self.svc_tx.send(event);
    }

    /// Build read-only handles and load markets once.
    async fn observe(&mut self) {
        match self.manager.observe().await {
            Ok(observer) => {
                self.observer = Some(observer);
                self.refresh_markets().await;
            }
            Err(e) => {
                log::warn!("Markets unavailable until the provider answers: {}", e);
                self.send(ServiceEvent::Error(e.to_string()));
            }
        }
    }

    async fn refresh(&mut self) {
        if let Some(session) = self.session.clone() {
            let account = load_account(&session).await;
            self.send(ServiceEvent::AccountUpdated(account));
        } else if self.observer.is_none() {
            self.observe().await;
            return;
        }
        self.refresh_markets().await;
    }

    async fn refresh_markets(&mut self) {
        let book = match (&self.session, &self.observer) {
            (Some(session), _) => load_observed_markets(&session.observer()).await,
            (None, Some(observer)) => load_observed_markets(observer).await,
            (None, None) => return,
        };
        self.markets = book.clone();
        self.send(ServiceEvent::MarketsUpdated(book));
    }

    async fn connect(&mut self) {
        match self.manager.connect().await {
            Ok(session) => {
                let account = session.account();
                let chain_id = session.chain_id();
                self.session = Some(Arc::new(session));
                self.send(ServiceEvent::Connected { account, chain_id });
                self.refresh().await;
            }
            Err(ConnectionError::WrongNetwork { expected, actual }) => {
                log::warn!("Wallet on chain {}, deployment is on {}", actual, expected);
                self.send(ServiceEvent::WrongNetwork { expected, actual });
            }
            Err(e) => {
                log::warn!("Connect failed: {}", e);
                self.send(ServiceEvent::Error(e.to_string()));
            }
        }
    }

    fn disconnect(&mut self) {
        if let Some(session) = self.session.take() {
            log::info!("🔌 Disconnected {}", session.account());
        }
        self.send(ServiceEvent::Disconnected);
    }

    async fn switch_network(&mut self) {
        let Some(chain_id) = self.manager.deployment().chain_id else {
            self.send(ServiceEvent::Error(
                "No chain_id configured for this deployment".to_string(),
            ));
            return;
        };

        match self.client.switch_chain(chain_id).await {
            Ok(()) => self.connect().await,
            Err(e) => self.send(ServiceEvent::Error(format!("Network switch failed: {}", e))),
        }
    }

    fn submit(&mut self, request: ActionRequest) {
        let (asset, action) = (request.asset, request.action);

        let Some(session) = self.session.clone() else {
            self.send(ServiceEvent::ActionFailed {
                asset,
                action,
                error: "Connect a wallet first".to_string(),
            });
            return;
        };

        let decimals = session
            .asset(asset)
            .map_or(asset.conventional_decimals(), |info| info.decimals);
        self.send(ServiceEvent::ActionStarted { asset, action });

        let orchestrator = self.orchestrator.clone();
        let markets = self.markets.clone();
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = orchestrator.execute(&session, &markets, request).await;
            let _ = done_tx.send(ActionDone {
                asset,
                action,
                decimals,
                result,
            });
        });
    }

    fn finish_action(&mut self, done: ActionDone) {
        if let Ok(outcome) = &done.result {
            self.markets = outcome.markets.clone();
        }
        let current = self.session.as_ref().map(|s| s.account());
        for event in action_events(done, current) {
            self.send(event);
        }
    }
}

/// Events reporting one finished action. `current` is the account of the
/// live session, if there still is one.
fn action_events(done: ActionDone, current: Option<Address>) -> Vec<ServiceEvent> {
    let ActionDone {
        asset,
        action,
        decimals,
        result,
    } = done;

    match result {
        Ok(outcome) => {
            let message = format!("{}!", outcome.summary(decimals));
            log::info!("✅ {}", message);

            let mut events = Vec::with_capacity(3);
            // A disconnect while the action ran leaves nobody to show the account to.
            if current == Some(outcome.account.account) {
                events.push(ServiceEvent::AccountUpdated(outcome.account));
            }
            events.push(ServiceEvent::MarketsUpdated(outcome.markets));
            events.push(ServiceEvent::ActionSucceeded {
                asset,
                action,
                message,
            });
            events
        }
        // The original submission still owns the pending marker.
        Err(e @ ActionError::ActionInProgress { .. }) => vec![ServiceEvent::Error(e.to_string())],
        Err(e) => {
            log::warn!("{} {} failed: {}", action.label(), asset, e);
            vec![ServiceEvent::ActionFailed {
                asset,
                action,
                error: e.to_string(),
            }]
        }
    }
}
