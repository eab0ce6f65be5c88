//! Display implementations for domain models.
//!
//! Output is markdown: a build renders as a heading, a metadata list and one
//! table row per step.

use std::fmt;

use super::datetime::{Elapsed, EpochTime};
use crate::models::{BuildMetric, BuildStatus, Phase, StepDescriptor, StepKind};

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A table cell with `|` escaped so it cannot split the row.
struct Cell<'a>(&'a str);

impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = self.0.split('|');
        if let Some(first) = parts.next() {
            f.write_str(first)?;
        }
        for part in parts {
            write!(f, "\\|{part}")?;
        }
        Ok(())
    }
}

impl StepDescriptor {
    fn fmt_row(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "| {} | {} | {} | {} | {} | {} | {} |",
            Cell(&self.name),
            self.kind,
            Cell(&self.id),
            EpochTime(self.initialize_time),
            EpochTime(self.start_time),
            EpochTime(self.finish_time),
            Elapsed(self.duration()),
        )
    }
}

impl fmt::Display for StepDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}): {}",
            self.kind,
            self.name,
            self.id,
            Elapsed(self.duration())
        )
    }
}

impl fmt::Display for BuildMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# {}/{} #{} (build {})",
            self.pipeline_name, self.job_name, self.name, self.id
        )?;
        writeln!(f)?;

        writeln!(f, "- Status: {}", self.status)?;
        writeln!(f, "- Team: {}", self.team_name)?;
        writeln!(f, "- Started: {}", EpochTime(self.start_time))?;
        writeln!(f, "- Ended: {}", EpochTime(self.end_time))?;

        if self.steps.is_empty() {
            writeln!(f, "\nNo steps recorded for this build.")?;
            return Ok(());
        }

        writeln!(f, "\n## Steps")?;
        writeln!(f)?;
        writeln!(
            f,
            "| Step | Type | Id | Initialized | Started | Finished | Duration |"
        )?;
        writeln!(f, "|---|---|---|---|---|---|---|")?;
        for step in &self.steps {
            step.fmt_row(f)?;
        }

        Ok(())
    }
}
