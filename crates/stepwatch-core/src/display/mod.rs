//! Markdown formatting for metrics and cache entries.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and time values get small wrapper types so the CLI can hand
//! any of them to the terminal renderer unchanged.
//!
//! ```rust
//! use stepwatch_core::display::{Elapsed, EpochTime};
//!
//! assert_eq!(Elapsed(Some(65)).to_string(), "1m 05s");
//! assert_eq!(EpochTime(None).to_string(), "-");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;

pub use collections::ProcessedBuilds;
pub use datetime::{Elapsed, EpochTime, LocalDateTime};
