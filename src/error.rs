use std::io;

use thiserror::Error;

pub type ClipResult<T> = Result<T, ClipError>;

/// Errors surfaced by the public API.
///
/// `Input` and `Validation` abort the call that raised them; `NotFound` and
/// `Gone` are client usage errors on lookups of unknown or already-removed
/// state. Provider failures never appear here directly — they land on the
/// owning render job and are reported through status polling as data.
#[derive(Error, Debug)]
pub enum ClipError {
    #[error("input error: {0}")]
    Input(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("gone: {0}")]
    Gone(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Failure of an external capability call (scoring, translation, rendering).
///
/// The variant is the retry contract: `Transient` failures are requeued by the
/// orchestrator up to the retry budget, `Terminal` failures fail the owning
/// job immediately.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("transient provider failure: {0}")]
    Transient(String),
    #[error("terminal provider failure: {0}")]
    Terminal(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Transient(_))
    }
}
