//! Request dispatch on both sides of the bus.
//!
//! [`AdapterService`] runs inside a chat page and answers extract/paste
//! requests against that page. [`TransferService`] runs in the privileged
//! context and answers tab queries and transfer commands.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use rechat_core::{ConversationRecord, Error, Platform, Result};
use rechat_extract::{adapter_for, PageDriver, SiteAdapter};
use rechat_transcript::format_conversation;

use crate::bus::{
    ActiveTabInfo, BusRequest, BusResponse, ContextBus, PasteReceipt, TabController,
    TransferOutcome, TransferPayload,
};
use crate::orchestrator::{TransferOrchestrator, TransferTiming};

/// Page-side handler bound to one platform's adapter.
pub struct AdapterService {
    adapter: &'static dyn SiteAdapter,
    page: Arc<dyn PageDriver>,
}

impl AdapterService {
    pub fn new(platform: Platform, page: Arc<dyn PageDriver>) -> Self {
        Self {
            adapter: adapter_for(platform),
            page,
        }
    }

    pub async fn handle(&self, request: BusRequest) -> Result<BusResponse> {
        match request {
            BusRequest::ExtractConversation => {
                let outcome = self.adapter.extract(self.page.as_ref()).await?;
                if !outcome.skipped.is_empty() {
                    debug!(
                        platform = %self.adapter.platform(),
                        skipped = outcome.skipped.len(),
                        "containers skipped during extraction"
                    );
                }
                Ok(BusResponse::Conversation(outcome.record))
            }
            BusRequest::PasteConversation(payload) => {
                let target = self.adapter.platform().name();
                let transcript = format_conversation(
                    &payload.record.messages,
                    &payload.record.source,
                    target,
                    Utc::now(),
                );
                let field = self.adapter.locate_input(self.page.as_ref()).await?;
                self.adapter
                    .insert_text(self.page.as_ref(), &field, &transcript.formatted)
                    .await?;
                info!(
                    source = %payload.record.source,
                    destination = target,
                    messages = transcript.message_count,
                    "conversation pasted"
                );
                Ok(BusResponse::Pasted(PasteReceipt {
                    message_count: transcript.message_count,
                }))
            }
            other => Err(Error::Internal(format!(
                "unsupported page-side action: {other:?}"
            ))),
        }
    }
}

/// Caller-side facade for contexts that do not know the privileged
/// context's id; every request goes out as a broadcast.
pub struct TransferClient {
    bus: Arc<dyn ContextBus>,
}

impl TransferClient {
    pub fn new(bus: Arc<dyn ContextBus>) -> Self {
        Self { bus }
    }

    pub async fn active_tab(&self) -> Result<ActiveTabInfo> {
        match self
            .bus
            .broadcast(BusRequest::GetActiveTab)
            .await
            .map_err(|err| Error::Delivery(err.to_string()))?
        {
            BusResponse::ActiveTab(info) => Ok(info),
            BusResponse::Failure { error } => Err(Error::Delivery(error)),
            other => Err(Error::Delivery(format!("unexpected reply: {other:?}"))),
        }
    }

    pub async fn transfer(
        &self,
        target: &str,
        record: ConversationRecord,
    ) -> Result<TransferOutcome> {
        let request = BusRequest::TransferConversation(TransferPayload {
            target_llm: target.to_string(),
            conversation_data: record,
        });
        match self
            .bus
            .broadcast(request)
            .await
            .map_err(|err| Error::Delivery(err.to_string()))?
        {
            BusResponse::Transferred(outcome) => Ok(outcome),
            BusResponse::Failure { error } => Err(Error::Delivery(error)),
            other => Err(Error::Delivery(format!("unexpected reply: {other:?}"))),
        }
    }
}

/// Privileged-side handler: tab queries and whole transfers.
pub struct TransferService {
    tabs: Arc<dyn TabController>,
    orchestrator: TransferOrchestrator,
}

impl TransferService {
    pub fn new(tabs: Arc<dyn TabController>, bus: Arc<dyn ContextBus>) -> Self {
        Self::with_timing(tabs, bus, TransferTiming::default())
    }

    pub fn with_timing(
        tabs: Arc<dyn TabController>,
        bus: Arc<dyn ContextBus>,
        timing: TransferTiming,
    ) -> Self {
        Self {
            orchestrator: TransferOrchestrator::with_timing(Arc::clone(&tabs), bus, timing),
            tabs,
        }
    }

    pub fn orchestrator(&self) -> &TransferOrchestrator {
        &self.orchestrator
    }

    pub async fn handle(&self, request: BusRequest) -> Result<BusResponse> {
        match request {
            BusRequest::GetActiveTab => {
                let tab = self
                    .tabs
                    .active_tab()
                    .await
                    .map_err(|err| Error::Delivery(err.to_string()))?
                    .ok_or(Error::NoActiveContext)?;
                let llm = Platform::detect(&tab.url);
                Ok(BusResponse::ActiveTab(ActiveTabInfo {
                    tab_id: tab.id,
                    url: tab.url,
                    title: tab.title,
                    llm,
                }))
            }
            BusRequest::TransferConversation(payload) => {
                let outcome = self
                    .orchestrator
                    .transfer_to(&payload.target_llm, payload.conversation_data)
                    .await?;
                Ok(BusResponse::Transferred(outcome))
            }
            other => Err(Error::Internal(format!(
                "unsupported privileged action: {other:?}"
            ))),
        }
    }
}
