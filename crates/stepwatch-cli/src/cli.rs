//! Command handlers.
//!
//! Each handler turns clap arguments into core parameters, calls into
//! `stepwatch-core` and renders the result.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::{debug, info};
use stepwatch_core::{
    concourse::decode_events, models::decode_plan, replay, BuildContext, CollectParams,
    CollectorBuilder, ConcourseClient, Config, DatadogSink, MetricSink, ProcessedBuilds,
    RunSummary, ScanCache,
};

use crate::{
    args::{CacheCommands, CollectArgs, OutputFormat, ReplayArgs},
    renderer::TerminalRenderer,
    sink::PrintSink,
};

pub struct Cli {
    renderer: TerminalRenderer,
    config_file: Option<PathBuf>,
    cache_file: Option<PathBuf>,
}

impl Cli {
    pub fn new(
        renderer: TerminalRenderer,
        config_file: Option<PathBuf>,
        cache_file: Option<PathBuf>,
    ) -> Self {
        Self {
            renderer,
            config_file,
            cache_file,
        }
    }

    pub async fn collect(&self, args: CollectArgs) -> Result<()> {
        let config = self.load_config()?;

        let client = ConcourseClient::connect(&config.concourse)
            .await
            .with_context(|| format!("Failed to connect to {}", config.concourse.url))?
            .with_page_limit(args.limit);

        let collector = CollectorBuilder::new(client)
            .with_cache_path(self.cache_file.as_ref())
            .build()
            .await
            .context("Failed to open scan cache")?;

        let params = CollectParams::from(&args);

        if args.datadog {
            let datadog = config
                .datadog
                .as_ref()
                .context("--datadog needs a \"datadog\" section in the configuration")?;
            let mut sink = DatadogSink::new(datadog).context("Invalid Datadog configuration")?;
            info!("Publishing to {}", sink.metric_name());

            let summary = collector
                .run(&params, &mut sink)
                .await
                .context("Collection run failed")?;
            self.render_summary(&summary);
        } else {
            let mut sink = PrintSink::new(args.format, &self.renderer);
            let summary = collector
                .run(&params, &mut sink)
                .await
                .context("Collection run failed")?;
            sink.finish().context("Failed to write metrics")?;

            if args.format == OutputFormat::Text {
                self.render_summary(&summary);
            }
        }

        Ok(())
    }

    pub async fn replay(&self, args: ReplayArgs) -> Result<()> {
        let plan_bytes = tokio::fs::read(&args.plan)
            .await
            .with_context(|| format!("Failed to read plan file {}", args.plan.display()))?;
        let events_text = tokio::fs::read_to_string(&args.events)
            .await
            .with_context(|| format!("Failed to read events file {}", args.events.display()))?;

        let plan = decode_plan(&plan_bytes, Some(args.build_id))?;
        let events = decode_events(&events_text).context("Failed to decode events")?;
        debug!("Replaying {} events", events.len());

        let metric = replay(Some(&plan), &events, &BuildContext::from(&args))?;

        let mut sink = PrintSink::new(args.format, &self.renderer);
        sink.emit(&metric).await?;
        sink.finish()?;
        Ok(())
    }

    pub async fn handle_cache_command(&self, command: CacheCommands) -> Result<()> {
        let cache = self.open_cache().await?;

        match command {
            CacheCommands::List => {
                let builds = ProcessedBuilds(cache.list().await?);
                self.renderer.render(&builds.to_string());
            }
            CacheCommands::Forget(args) => {
                if cache.forget(args.id).await? {
                    self.renderer.render(&format!("Forgot build {}.\n", args.id));
                } else {
                    self.renderer
                        .render(&format!("Build {} was not in the cache.\n", args.id));
                }
            }
            CacheCommands::Clear(args) => {
                if !args.confirm {
                    bail!("Refusing to clear the cache without --confirm");
                }
                let removed = cache.clear().await?;
                self.renderer
                    .render(&format!("Removed {removed} builds from the cache.\n"));
            }
            CacheCommands::Import(args) => {
                let imported = cache
                    .import_file(&args.file)
                    .await
                    .with_context(|| format!("Failed to import {}", args.file.display()))?;
                self.renderer
                    .render(&format!("Imported {imported} cache entries.\n"));
            }
        }

        Ok(())
    }

    fn load_config(&self) -> Result<Config> {
        let path = match &self.config_file {
            Some(path) => path.clone(),
            None => Config::default_path()?,
        };
        Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))
    }

    async fn open_cache(&self) -> Result<ScanCache> {
        let path = match &self.cache_file {
            Some(path) => path.clone(),
            None => ScanCache::default_path()?,
        };
        ScanCache::open(&path)
            .await
            .with_context(|| format!("Failed to open scan cache {}", path.display()))
    }

    fn render_summary(&self, summary: &RunSummary) {
        self.renderer.render(&summary.to_string());
    }
}
