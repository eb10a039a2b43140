//! Structural extraction — per-site strategies for locating message
//! containers, classifying turn authorship, preserving formatting, and
//! filling the destination input surface.
//!
//! Everything here operates on DOM snapshots and input mutations exposed
//! through the [`page::PageDriver`] seam; the host runtime decides how
//! those reach a live page.

pub mod adapter;
pub mod classify;
pub mod locate;
pub mod page;
pub mod sites;
pub mod walk;

pub use adapter::{
    adapter_for, ExtractTiming, ExtractionOutcome, SiteAdapter, SkipReason, SkippedContainer,
};
pub use classify::{classify, RoleRules, Signal};
pub use locate::locate_containers;
pub use page::{FieldHandle, FieldKind, PageDriver};
pub use walk::preserve_formatting;
