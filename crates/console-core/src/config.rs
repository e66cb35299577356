//! Session configuration

use serde::{Deserialize, Serialize};

use crate::errors::{ConsoleError, Result};

/// Default number of candidates shown
pub const DEFAULT_CANDIDATE_LIMIT: usize = 15;

/// Default minimum score for a candidate, exclusive
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f32 = 400.0;

/// Tunables for [`ConsoleSession`](crate::session::ConsoleSession)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of ranked candidates kept
    pub candidate_limit: usize,
    /// Candidates must score strictly above this
    pub acceptance_threshold: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            candidate_limit: DEFAULT_CANDIDATE_LIMIT,
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
        }
    }
}

impl SessionConfig {
    /// Check the values are usable.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::InvalidConfiguration`] for a zero limit or a negative
    /// or non-finite threshold.
    pub fn validate(&self) -> Result<()> {
        if self.candidate_limit == 0 {
            return Err(ConsoleError::invalid_config(
                "candidate_limit must be at least 1",
            ));
        }
        if !self.acceptance_threshold.is_finite() || self.acceptance_threshold < 0.0 {
            return Err(ConsoleError::invalid_config(format!(
                "acceptance_threshold must be a non-negative number, got {}",
                self.acceptance_threshold
            )));
        }
        Ok(())
    }

    /// Same configuration with a different candidate limit
    pub fn with_candidate_limit(mut self, limit: usize) -> Self {
        self.candidate_limit = limit;
        self
    }
}
