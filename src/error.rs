//! Scout error types with code and severity mapping.
//!
//! [`ScoutError`] is the central error type for the crate. Each variant
//! maps to a stable numeric code and tells whether it aborts a run.
//!
//! Per-identifier failures (a single probe or a single status write) are
//! not raised as errors during a scan. They are folded into
//! [`crate::domain::Diagnostics`] and surface in the final report.

use std::process::ExitCode;

/// Central error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category      | Fatal to a run |
/// |-----------|---------------|----------------|
/// | 1000–1999 | Configuration | yes            |
/// | 2000–2999 | Status store  | watermark only |
/// | 3000–3999 | Network/parse | no             |
/// | 4000–4999 | Notification  | no             |
/// | 5000–5999 | Internal      | yes            |
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Configuration is missing or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading from the status store failed.
    #[error("status store read failed: {0}")]
    StoreRead(String),

    /// Writing a per-identifier status failed.
    #[error("status store write failed: {0}")]
    StoreWrite(String),

    /// Reading the scan watermark failed.
    #[error("failed to read watermark: {0}")]
    WatermarkRead(String),

    /// Persisting the scan watermark failed.
    #[error("failed to persist watermark {watermark}: {reason}")]
    WatermarkWrite {
        /// Watermark value that could not be stored.
        watermark: u64,
        /// Underlying failure.
        reason: String,
    },

    /// Transport failure or unexpected HTTP status after all attempts.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The response body could not be read or parsed.
    #[error("parse failed: {0}")]
    Parse(String),

    /// Digest delivery failed.
    #[error("notification failed: {0}")]
    Notify(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ScoutError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Config(_) => 1001,
            Self::StoreRead(_) => 2001,
            Self::StoreWrite(_) => 2002,
            Self::WatermarkWrite { .. } => 2003,
            Self::WatermarkRead(_) => 2004,
            Self::Fetch(_) => 3001,
            Self::Parse(_) => 3002,
            Self::Notify(_) => 4001,
            Self::Internal(_) => 5000,
        }
    }

    /// Returns `true` if this error must abort the current run.
    ///
    /// Losing the watermark risks an unbounded re-scan or lost progress,
    /// whereas a single lost classification is recovered by a later pass.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::WatermarkRead(_)
                | Self::WatermarkWrite { .. }
                | Self::Internal(_)
        )
    }

    /// Process exit code reported by the binary for this error.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        let category = self.error_code() / 1000;
        ExitCode::from(u8::try_from(category).unwrap_or(1).saturating_add(1))
    }
}

impl From<sqlx::Error> for ScoutError {
    fn from(err: sqlx::Error) -> Self {
        Self::StoreRead(err.to_string())
    }
}
