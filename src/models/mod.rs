mod moment;
mod operation;
mod session;
mod transcript;

pub use moment::{CandidateWindow, Moment, WindowFeatures};
pub use operation::{
    derive_aggregate, AggregateStatus, JobStatus, Operation, OperationSnapshot, RenderJob,
    RenderJobRow,
};
pub use session::Session;
pub use transcript::{FrameSample, TranscriptSegment};
