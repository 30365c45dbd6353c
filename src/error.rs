use thiserror::Error;

/// Failures a caller has to tell apart from plain I/O trouble.
///
/// These travel inside `anyhow::Error`; match them with `downcast_ref`.
#[derive(Debug, Error)]
pub enum CareError {
    /// A record with the same reference was written first. Re-read and recompute.
    #[error("Reference {0} is already taken by another plan. Try again.")]
    Conflict(String),

    #[error("Unknown business branch '{0}'. Add it with: care branch add <CODE> <NAME>")]
    UnknownBranch(String),

    #[error("Ambiguous reference '{prefix}': matches {count} plans. Use the full reference.")]
    AmbiguousReference { prefix: String, count: usize },
}

impl CareError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, CareError::Conflict(_))
    }
}
