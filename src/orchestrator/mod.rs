pub mod controller;
pub mod registry;
mod worker;

pub use controller::{Artifact, BatchController};
pub use registry::OperationRegistry;

/// Pointer to one job in the shared queue. Workers resolve it against the
/// registry at claim time, so a ticket for cleaned-up work is simply dropped.
#[derive(Debug, Clone)]
pub(crate) struct JobTicket {
    pub operation_id: String,
    pub job_id: String,
}
