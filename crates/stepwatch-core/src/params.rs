//! Parameter structures shared by the collector and its front ends.
//!
//! These carry no CLI framework derives; the CLI converts its clap arguments
//! into them with `From` impls.

use jiff::SignedDuration;

/// Default look-back window for a collection run.
pub const DEFAULT_SINCE: SignedDuration = SignedDuration::from_hours(1);

/// Parameters for one collection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectParams {
    /// Builds that ended within this window before now are considered
    pub since: SignedDuration,

    /// Abort the run on the first build that cannot be collected
    pub fail_fast: bool,

    /// Collect builds even if the cache records them as processed
    pub ignore_cache: bool,
}

impl Default for CollectParams {
    fn default() -> Self {
        Self {
            since: DEFAULT_SINCE,
            fail_fast: false,
            ignore_cache: false,
        }
    }
}
