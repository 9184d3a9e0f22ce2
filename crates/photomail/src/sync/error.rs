//! Failure taxonomy for sync runs

/// Coarse category of a failed run, used for exit codes and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Config,
    Fetch,
    Delivery,
    Persist,
}

/// Why a sync run stopped early
#[derive(Debug, thiserror::Error)]
pub enum SyncFailure {
    /// Required settings are missing or invalid. Nothing was contacted.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The album listing could not be fetched. Nothing was committed.
    #[error("Failed to fetch album items")]
    Fetch(#[source] anyhow::Error),

    /// A batch failed to download or send. Earlier batches were committed.
    #[error(
        "Failed to deliver batch {batch} of {total} ({delivered} images delivered before the failure)"
    )]
    Delivery {
        /// 1-based index of the failed batch
        batch: usize,
        total: usize,
        delivered: usize,
        #[source]
        source: anyhow::Error,
    },

    /// The seen set could not be read or written
    #[error("Failed to access seen-image state")]
    Persist(#[source] anyhow::Error),
}

impl SyncFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Config(_) => FailureKind::Config,
            Self::Fetch(_) => FailureKind::Fetch,
            Self::Delivery { .. } => FailureKind::Delivery,
            Self::Persist(_) => FailureKind::Persist,
        }
    }
}
