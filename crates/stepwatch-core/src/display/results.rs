//! Run outcome formatting.

use std::fmt;

use crate::collector::RunSummary;

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Run summary")?;
        writeln!(f)?;
        writeln!(f, "- Emitted: {}", self.emitted)?;
        writeln!(f, "- Skipped (cached): {}", self.skipped)?;
        writeln!(f, "- Failed: {}", self.failed)
    }
}
