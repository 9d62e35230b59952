use std::time::Duration;

/// Counters for a completed walk.
///
/// Every field counts callback invocations, so nodes the callback skipped
/// past are not included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Non-directory nodes visited (files, symlinks, devices, `Unknown`).
    pub files: usize,

    /// Directory nodes visited, the root included when it is a directory.
    pub dirs: usize,

    /// Errors handed to the callback: the root's lstat failing, or a
    /// directory that could not be listed.
    pub read_errors: usize,

    /// Wall-clock time from walk start to completion.
    pub duration: Duration,
}

impl WalkStats {
    /// Total nodes visited per second, clamped to 0 on zero-duration runs.
    pub fn entries_per_sec(&self) -> usize {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            ((self.files + self.dirs) as f64 / secs) as usize
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_per_sec_counts_files_and_dirs() {
        let stats = WalkStats {
            files: 150,
            dirs: 50,
            duration: Duration::from_millis(500),
            ..Default::default()
        };
        assert_eq!(stats.entries_per_sec(), 400);
    }

    #[test]
    fn entries_per_sec_zero_duration() {
        let stats = WalkStats {
            files: 10,
            ..Default::default()
        };
        assert_eq!(stats.entries_per_sec(), 0);
    }
}
