//! Collection wrappers.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::db::ProcessedBuild;

/// Newtype wrapper for displaying the contents of the scan cache.
pub struct ProcessedBuilds(pub Vec<ProcessedBuild>);

impl ProcessedBuilds {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for ProcessedBuilds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No processed builds.");
        }

        writeln!(f, "| Build | Processed at |")?;
        writeln!(f, "|---|---|")?;
        for entry in &self.0 {
            writeln!(
                f,
                "| {} | {} |",
                entry.build_id,
                LocalDateTime(&entry.processed_at)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;

    #[test]
    fn test_processed_builds_display() {
        let empty = ProcessedBuilds(Vec::new());
        assert_eq!(empty.to_string(), "No processed builds.\n");

        let builds = ProcessedBuilds(vec![ProcessedBuild {
            build_id: 42,
            processed_at: Timestamp::UNIX_EPOCH,
        }]);
        assert_eq!(builds.len(), 1);
        assert!(builds.to_string().contains("| 42 | 19"));
    }
}
