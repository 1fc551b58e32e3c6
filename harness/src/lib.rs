//! Meridian Harness: end-to-end orchestration of the search engines.
//!
//! The harness runs an engine over a world, replays the plan it returns and
//! packages the result as a report bundle on disk.
//!
//! The harness does NOT implement search logic; it delegates to
//! `meridian_search`. Worlds provide problem models and heuristics only.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod bundle_dir;
pub mod contract;
pub mod report;
pub mod runner;
pub mod worlds;
