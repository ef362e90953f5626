//! Capture Registry, Blacklist Filter, and Sampling Middleware — the
//! parts of the pipeline that decide which raw occurrences become
//! recorded events at all.

mod blacklist;
mod registry;
mod sampling_config;
mod sampling_middleware;

pub use blacklist::{BlacklistFilter, FilterRule, FilterRuleSet, RuleAction, RuleType};
pub use registry::{CaptureRegistry, CapturePoint, CapturePointError, CaptureStats, CaptureStatsSnapshot};
pub use sampling_config::{SamplingConfig, SamplingStrategy};
pub use sampling_middleware::{spawn_flusher, EventSink, FlusherHandle, SamplingMiddleware, SamplingStats};
