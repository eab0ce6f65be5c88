//! Command-line argument definitions.
//!
//! clap types live here and convert into the core parameter structures with
//! `From` impls, so `stepwatch-core` stays free of CLI derives.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use jiff::SignedDuration;
use stepwatch_core::{params::DEFAULT_SINCE, BuildContext, BuildStatus, CollectParams};

/// Collects per-step timing metrics from completed Concourse builds
///
/// Each build's plan is flattened into its task, get and put steps, and the
/// build's event log supplies when each step was initialized, started and
/// finished. Builds already reported are remembered in a local cache.
#[derive(Parser)]
#[command(version, about, name = "stepwatch")]
pub struct Args {
    /// Path to the JSON configuration file. Defaults to
    /// $XDG_CONFIG_HOME/stepwatch/config.json
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the processed-build cache. Defaults to
    /// $XDG_DATA_HOME/stepwatch/cache.db
    #[arg(long, global = true)]
    pub cache_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands. `collect` runs when none is given.
#[derive(Subcommand)]
pub enum Commands {
    /// Collect metrics for builds that finished recently
    #[command(alias = "c")]
    Collect(CollectArgs),
    /// Compute one build's metric from a saved plan and event log
    #[command(alias = "r")]
    Replay(ReplayArgs),
    /// Inspect or edit the processed-build cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

/// How metrics are written to standard output.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Markdown, rendered for the terminal
    #[default]
    Text,
    /// One pretty-printed JSON array
    Json,
    /// One compact JSON object per line
    JsonLines,
}

#[derive(ClapArgs)]
pub struct CollectArgs {
    /// Look-back window, e.g. `1h`, `30m` or `PT2H`
    #[arg(long, default_value = "1h")]
    pub since: SignedDuration,

    /// Output format when printing metrics
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Publish to Datadog instead of printing
    #[arg(long)]
    pub datadog: bool,

    /// Stop at the first build that cannot be collected
    #[arg(long)]
    pub fail_fast: bool,

    /// Collect builds even if they were already reported
    #[arg(long)]
    pub ignore_cache: bool,

    /// Maximum number of builds requested per job
    #[arg(long)]
    pub limit: Option<u32>,
}

impl Default for CollectArgs {
    fn default() -> Self {
        Self {
            since: DEFAULT_SINCE,
            format: OutputFormat::default(),
            datadog: false,
            fail_fast: false,
            ignore_cache: false,
            limit: None,
        }
    }
}

impl From<&CollectArgs> for CollectParams {
    fn from(val: &CollectArgs) -> Self {
        CollectParams {
            since: val.since,
            fail_fast: val.fail_fast,
            ignore_cache: val.ignore_cache,
        }
    }
}

#[derive(ClapArgs)]
pub struct ReplayArgs {
    /// Plan JSON as returned by `/api/v1/builds/:id/plan`
    #[arg(long)]
    pub plan: PathBuf,

    /// Event log: a server-sent-event transcript or a JSON array of events
    #[arg(long)]
    pub events: PathBuf,

    #[arg(long, default_value_t = 0)]
    pub build_id: u64,

    #[arg(long, default_value = "")]
    pub build_name: String,

    #[arg(long, default_value = "")]
    pub team: String,

    #[arg(long, default_value = "")]
    pub pipeline: String,

    #[arg(long, default_value = "")]
    pub job: String,

    #[arg(long, default_value = "succeeded")]
    pub status: BuildStatus,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl From<&ReplayArgs> for BuildContext {
    fn from(val: &ReplayArgs) -> Self {
        BuildContext {
            id: val.build_id,
            name: val.build_name.clone(),
            status: val.status,
            team_name: val.team.clone(),
            pipeline_name: val.pipeline.clone(),
            job_name: val.job.clone(),
            start_time: None,
            end_time: None,
        }
    }
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// List processed builds
    #[command(alias = "ls")]
    List,
    /// Remove one build so the next run reports it again
    Forget(ForgetArgs),
    /// Remove every build from the cache
    Clear(ClearArgs),
    /// Import a JSON cache file of the form {"1234": true}
    Import(ImportArgs),
}

#[derive(ClapArgs)]
pub struct ForgetArgs {
    /// Build id to forget
    pub id: u64,
}

#[derive(ClapArgs)]
pub struct ClearArgs {
    /// Confirm the removal (required to prevent accidental clearing)
    #[arg(long)]
    pub confirm: bool,
}

#[derive(ClapArgs)]
pub struct ImportArgs {
    /// JSON file to import
    pub file: PathBuf,
}
