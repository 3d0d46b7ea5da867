//! Container-level duration queries.
//!
//! A probe never fails from the caller's point of view: any problem running the
//! inspection tool or reading its output turns into [`ProbedDuration::Unknown`]
//! carrying the reason, so planning can carry on with degraded information.

use std::fmt;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, warn};

/// Duration returned by a failed probe when a plain number is required
pub const UNKNOWN_DURATION_SENTINEL: f64 = 0.0;

/// Result of a duration query
#[derive(Debug, Clone, PartialEq)]
pub enum ProbedDuration {
    /// Positive, finite duration in seconds
    Known(f64),
    /// The duration could not be determined
    Unknown { reason: String },
}

impl ProbedDuration {
    pub fn unknown<S: Into<String>>(reason: S) -> Self {
        Self::Unknown { reason: reason.into() }
    }

    /// Build from a raw seconds value; zero, negative and non-finite values are unknown
    pub fn from_secs(secs: f64) -> Self {
        if secs.is_finite() && secs > 0.0 {
            Self::Known(secs)
        } else {
            Self::unknown(format!("unusable duration value {}", secs))
        }
    }

    /// Usable seconds; a `Known` value that is not finite and positive counts as unknown
    pub fn secs(&self) -> Option<f64> {
        match self {
            Self::Known(secs) if secs.is_finite() && *secs > 0.0 => Some(*secs),
            _ => None,
        }
    }

    /// Seconds, or [`UNKNOWN_DURATION_SENTINEL`] when unknown
    pub fn seconds_or_sentinel(&self) -> f64 {
        self.secs().unwrap_or(UNKNOWN_DURATION_SENTINEL)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl fmt::Display for ProbedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(secs) => write!(f, "{:.3}s", secs),
            Self::Unknown { reason } => write!(f, "unknown ({})", reason),
        }
    }
}

/// Parse the single `format=duration` field printed by ffprobe
pub fn parse_duration_output(stdout: &str) -> ProbedDuration {
    let value = stdout.trim();
    if value.is_empty() {
        return ProbedDuration::unknown("empty probe output");
    }

    match value.parse::<f64>() {
        Ok(secs) => ProbedDuration::from_secs(secs),
        Err(_) => ProbedDuration::unknown(format!("non-numeric duration '{}'", value)),
    }
}

/// Duration probe backed by an ffprobe-compatible binary
#[derive(Debug, Clone)]
pub struct DurationProbe {
    binary_path: String,
}

impl DurationProbe {
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Arguments requesting only the container duration
    pub fn probe_args(path: &Path) -> Vec<String> {
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            path.to_string_lossy().to_string(),
        ]
    }

    /// Query the duration of a media file. Single attempt, no retries.
    pub async fn probe(&self, path: &Path) -> ProbedDuration {
        debug!("Probing duration of {}", path.display());

        let output = match Command::new(&self.binary_path)
            .args(Self::probe_args(path))
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!("Failed to run {} for {}: {}", self.binary_path, path.display(), e);
                return ProbedDuration::unknown(format!("failed to run {}: {}", self.binary_path, e));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Duration probe failed for {}: {}", path.display(), stderr.trim());
            return ProbedDuration::unknown(format!("probe exited with {}", output.status));
        }

        let duration = parse_duration_output(&String::from_utf8_lossy(&output.stdout));
        match &duration {
            ProbedDuration::Known(secs) => debug!("Duration of {}: {:.3}s", path.display(), secs),
            ProbedDuration::Unknown { reason } => {
                warn!("Could not read duration of {}: {}", path.display(), reason)
            }
        }
        duration
    }
}
