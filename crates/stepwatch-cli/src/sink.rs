//! Prints metrics to standard output.

use async_trait::async_trait;
use stepwatch_core::{BuildMetric, MetricSink, Result};

use crate::{args::OutputFormat, renderer::TerminalRenderer};

/// Writes each metric in the chosen format.
///
/// `json` output is a single array, so metrics are held back until
/// [`PrintSink::finish`].
pub struct PrintSink<'a> {
    format: OutputFormat,
    renderer: &'a TerminalRenderer,
    pending: Vec<BuildMetric>,
}

impl<'a> PrintSink<'a> {
    pub fn new(format: OutputFormat, renderer: &'a TerminalRenderer) -> Self {
        Self {
            format,
            renderer,
            pending: Vec::new(),
        }
    }

    /// Flushes held-back output.
    pub fn finish(self) -> Result<()> {
        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&self.pending)?);
        }
        Ok(())
    }
}

#[async_trait]
impl<'a> MetricSink for PrintSink<'a> {
    async fn emit(&mut self, metric: &BuildMetric) -> Result<()> {
        match self.format {
            OutputFormat::Text => self.renderer.render(&format!("{metric}\n")),
            OutputFormat::Json => self.pending.push(metric.clone()),
            OutputFormat::JsonLines => println!("{}", serde_json::to_string(metric)?),
        }
        Ok(())
    }
}
