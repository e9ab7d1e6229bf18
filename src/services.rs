pub mod listing_service;
pub mod reconcile_service;

pub use listing_service::ListingService;
pub use reconcile_service::{
    EntryOutcome, EntryReport, ReconcileError, ReconcileService, RunSummary, Strategy,
};
