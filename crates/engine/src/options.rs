//! Resolved settings for a run.

use crate::convention::Convention;

/// What a run does to every file or stream it touches. Built once from the
/// command line and shared across the whole batch.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Flavor to convert to. `Convention::None` means check only.
    pub target: Convention,
    /// Add a final newline to files that do not end with one.
    pub force_final_newline: bool,
    /// Process files that look binary instead of skipping them.
    pub process_binaries: bool,
    /// Restore access and modification times after a rewrite.
    pub keep_times: bool,
}

impl RunOptions {
    /// Check-only settings with every toggle off.
    pub fn check() -> Self {
        Self {
            target: Convention::None,
            force_final_newline: false,
            process_binaries: false,
            keep_times: false,
        }
    }

    /// Conversion settings with every toggle off.
    pub fn convert_to(target: Convention) -> Self {
        Self {
            target,
            ..Self::check()
        }
    }

    /// True when the run classifies without rewriting.
    pub fn is_check(&self) -> bool {
        self.target == Convention::None
    }
}
