//! Context bus contract and protocol vocabulary.
//!
//! Every request carries an `action` discriminant on the wire so a host
//! runtime can route it without knowing the full payload shape. Hosts
//! implement [`ContextBus`] and [`TabController`]; the orchestrator and
//! dispatch services are written against those seams only.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rechat_core::{ConversationRecord, Platform};

/// Opaque identifier of an isolated browsing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(pub u64);

/// Load status of a browsing context, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Loading,
    Complete,
}

/// Failures at the bus layer itself, below the protocol.
#[derive(Debug, Error)]
pub enum BusError {
    /// The destination context is gone, or has no listener installed yet.
    #[error("context unreachable: {0}")]
    Unreachable(String),
}

/// Raw tab facts from the host, before platform detection.
#[derive(Debug, Clone)]
pub struct TabInfo {
    pub id: ContextId,
    pub url: String,
    pub title: String,
}

/// The active tab enriched with the platform detected from its URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveTabInfo {
    #[serde(rename = "tabId")]
    pub tab_id: ContextId,
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<Platform>,
}

/// Payload of a `transferConversation` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferPayload {
    #[serde(rename = "targetLLM")]
    pub target_llm: String,
    #[serde(rename = "conversationData")]
    pub conversation_data: ConversationRecord,
}

/// Payload of a `pasteConversation` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PastePayload {
    #[serde(flatten)]
    pub record: ConversationRecord,
    pub target: String,
}

/// Destination-side acknowledgement of a completed paste.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasteReceipt {
    #[serde(rename = "messageCount")]
    pub message_count: usize,
}

/// Result of a whole transfer, reported back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOutcome {
    #[serde(rename = "targetTab")]
    pub target_tab: ContextId,
    #[serde(rename = "targetLLM")]
    pub target_llm: Platform,
    #[serde(rename = "messageCount")]
    pub message_count: usize,
}

/// Requests flowing over the bus, tagged by action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum BusRequest {
    GetActiveTab,
    TransferConversation(TransferPayload),
    ExtractConversation,
    PasteConversation(PastePayload),
}

/// Replies flowing back over the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum BusResponse {
    ActiveTab(ActiveTabInfo),
    Conversation(ConversationRecord),
    Pasted(PasteReceipt),
    Transferred(TransferOutcome),
    /// A handler ran but could not fulfil the request.
    Failure { error: String },
}

/// Message delivery between browsing contexts.
#[async_trait]
pub trait ContextBus: Send + Sync {
    /// Send a request to one context and wait for its reply.
    async fn send(&self, context: ContextId, request: BusRequest) -> Result<BusResponse, BusError>;

    /// Send a request not addressed to a specific context; the host routes
    /// it to the privileged handler.
    async fn broadcast(&self, request: BusRequest) -> Result<BusResponse, BusError>;
}

/// Tab lifecycle operations the host exposes.
#[async_trait]
pub trait TabController: Send + Sync {
    /// The currently focused tab, if any.
    async fn active_tab(&self) -> Result<Option<TabInfo>, BusError>;

    /// Open a new tab at `url` and return its context id immediately;
    /// the page may still be loading.
    async fn open_tab(&self, url: &str) -> Result<ContextId, BusError>;

    /// Current load status of a context.
    async fn load_state(&self, context: ContextId) -> Result<LoadState, BusError>;
}
