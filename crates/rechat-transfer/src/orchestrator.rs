//! Drives a transfer end to end: open the destination, wait for it to
//! finish loading, give its scripts a moment to install, then deliver the
//! conversation and insist on an explicit acknowledgement.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use rechat_core::{await_condition, ConversationRecord, Error, Platform, Result};

use crate::bus::{BusRequest, BusResponse, ContextBus, LoadState, PastePayload, TabController, TransferOutcome};

/// Polling cadence and settle delay for destination readiness.
#[derive(Debug, Clone, Copy)]
pub struct TransferTiming {
    pub load_poll_interval: Duration,
    pub load_deadline: Duration,
    /// Pause after the tab reports complete, so content scripts can attach.
    pub settle_delay: Duration,
}

impl Default for TransferTiming {
    fn default() -> Self {
        Self {
            load_poll_interval: Duration::from_millis(100),
            load_deadline: Duration::from_secs(10),
            settle_delay: Duration::from_secs(1),
        }
    }
}

/// Observable progress of the transfer in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferPhase {
    Idle,
    OpeningDestination,
    WaitingReady,
    Delivering,
    Confirmed,
    Failed,
}

pub struct TransferOrchestrator {
    tabs: Arc<dyn TabController>,
    bus: Arc<dyn ContextBus>,
    timing: TransferTiming,
    phase: RwLock<TransferPhase>,
}

impl TransferOrchestrator {
    pub fn new(tabs: Arc<dyn TabController>, bus: Arc<dyn ContextBus>) -> Self {
        Self::with_timing(tabs, bus, TransferTiming::default())
    }

    pub fn with_timing(
        tabs: Arc<dyn TabController>,
        bus: Arc<dyn ContextBus>,
        timing: TransferTiming,
    ) -> Self {
        Self {
            tabs,
            bus,
            timing,
            phase: RwLock::new(TransferPhase::Idle),
        }
    }

    pub fn phase(&self) -> TransferPhase {
        *self.phase.read()
    }

    /// Carry `record` over to the platform named `target`.
    ///
    /// Success requires the destination to answer with a paste receipt;
    /// silence or any other reply is a delivery failure.
    pub async fn transfer_to(
        &self,
        target: &str,
        record: ConversationRecord,
    ) -> Result<TransferOutcome> {
        match self.run(target, record).await {
            Ok(outcome) => {
                self.set_phase(TransferPhase::Confirmed);
                Ok(outcome)
            }
            Err(err) => {
                warn!(destination = target, error = %err, "transfer failed");
                self.set_phase(TransferPhase::Failed);
                Err(err)
            }
        }
    }

    async fn run(&self, target: &str, record: ConversationRecord) -> Result<TransferOutcome> {
        let platform = Platform::from_name(target)
            .ok_or_else(|| Error::UnknownTarget(target.to_string()))?;

        self.set_phase(TransferPhase::OpeningDestination);
        info!(source = %record.source, destination = %platform, "starting transfer");
        let tab = self
            .tabs
            .open_tab(platform.entry_url())
            .await
            .map_err(|err| Error::Delivery(err.to_string()))?;

        self.set_phase(TransferPhase::WaitingReady);
        self.wait_for_load(tab).await?;
        tokio::time::sleep(self.timing.settle_delay).await;

        self.set_phase(TransferPhase::Delivering);
        let request = BusRequest::PasteConversation(PastePayload {
            record,
            target: platform.name().to_string(),
        });
        let response = self
            .bus
            .send(tab, request)
            .await
            .map_err(|err| Error::Delivery(err.to_string()))?;

        match response {
            BusResponse::Pasted(receipt) => {
                info!(
                    destination = %platform,
                    messages = receipt.message_count,
                    "transfer delivered"
                );
                Ok(TransferOutcome {
                    target_tab: tab,
                    target_llm: platform,
                    message_count: receipt.message_count,
                })
            }
            BusResponse::Failure { error } => Err(Error::Delivery(error)),
            other => Err(Error::Delivery(format!(
                "unexpected reply from destination: {other:?}"
            ))),
        }
    }

    async fn wait_for_load(&self, tab: crate::bus::ContextId) -> Result<()> {
        let tabs = &self.tabs;
        await_condition(
            || async move {
                matches!(tabs.load_state(tab).await, Ok(LoadState::Complete))
            },
            self.timing.load_poll_interval,
            self.timing.load_deadline,
        )
        .await
        .map_err(|_| {
            debug!(tab = tab.0, "destination never finished loading");
            Error::TabLoadTimeout
        })
    }

    fn set_phase(&self, phase: TransferPhase) {
        debug!(?phase, "transfer phase");
        *self.phase.write() = phase;
    }
}
