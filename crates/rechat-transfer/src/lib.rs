//! Transfer orchestration — opening a destination context, waiting for it
//! to become ready, and delivering the formatted transcript over the
//! context message bus.

pub mod bus;
pub mod orchestrator;
pub mod service;

pub use bus::{
    ActiveTabInfo, BusError, BusRequest, BusResponse, ContextBus, ContextId, LoadState,
    PastePayload, PasteReceipt, TabController, TabInfo, TransferOutcome, TransferPayload,
};
pub use orchestrator::{TransferOrchestrator, TransferPhase, TransferTiming};
pub use service::{AdapterService, TransferClient, TransferService};
