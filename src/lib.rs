//! clipcast turns one long-form source video into a batch of localized
//! vertical short clips.
//!
//! Discovery walks the transcript for scored, non-overlapping moments; a
//! batch orchestrator then fans out one render job per (moment, language)
//! pair over a bounded worker pool, with aggregate status, partial failure,
//! and idempotent cleanup. Scoring, translation, and rendering sit behind
//! capability traits so providers are swappable.

pub mod config;
pub mod error;
pub mod extract;
pub mod localize;
pub mod models;
pub mod orchestrator;
pub mod render;
pub mod selector;
mod studio;
mod utils;

pub use config::StudioConfig;
pub use error::{ClipError, ClipResult, ProviderError};
pub use localize::{HttpLocalizer, LocalizeRequest, LocalizedCopy, Localizer};
pub use models::{
    AggregateStatus, JobStatus, Moment, OperationSnapshot, RenderJobRow, Session,
    TranscriptSegment,
};
pub use orchestrator::{Artifact, BatchController, OperationRegistry};
pub use render::{ClipRenderer, RenderRequest, RenderStyle, Renderer};
pub use selector::{HeuristicScorer, MomentScorer, MomentSelector, RemoteScorer, SelectorConfig};
pub use studio::ClipStudio;

/// Initialize logging from `RUST_LOG`, defaulting to info.
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
