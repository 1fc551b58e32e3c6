//! Search configuration.
//!
//! One [`SearchConfig`] drives every engine. Values are validated before a
//! run starts; an invalid value is a [`SearchError::InvalidConfig`] and no
//! search step is taken.

use std::time::Duration;

use meridian_kernel::proof::canon::{real_from_canonical_string, real_to_canonical_string};
use serde_json::{json, Map, Value};

use crate::error::SearchError;
use crate::frontier::FrontierKind;

/// Default wall-clock budget: five minutes.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(300);

/// Default node-store ceiling.
pub const DEFAULT_MAX_NODES: usize = 5_000_000;

/// Budgets and engine options shared by every search engine.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Wall-clock budget for one `solve` call (IDA* shares it across bounds).
    pub time_limit: Duration,
    /// Ceiling on stored nodes (best-first store size or MCTS tree size).
    pub max_nodes: usize,
    /// Successors retained per expansion by beam search.
    pub beam_width: usize,
    /// Open-list implementation for A*, greedy and multi-heuristic A*.
    pub frontier: FrontierKind,
    /// Record one trace event per expansion.
    pub record_trace: bool,
    /// Monte-Carlo tree search options.
    pub mcts: MctsConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            max_nodes: DEFAULT_MAX_NODES,
            beam_width: 2,
            frontier: FrontierKind::BinaryHeap,
            record_trace: false,
            mcts: MctsConfig::default(),
        }
    }
}

/// Monte-Carlo tree search options.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Consecutive iterations without improving the best trajectory before
    /// the solver stops.
    pub patience: u64,
    /// Maximum operator applications performed by one rollout.
    pub step_batch: usize,
    /// A leaf is expanded once its visit count exceeds this threshold.
    pub expansion_threshold: u32,
    /// UCB exploration weight, scaled by the observed score range.
    pub exploration: f64,
    /// Operators sampled per decision by the tournament rollout.
    pub tournament_size: usize,
    /// RNG seed; equal seeds give identical runs.
    pub seed: u64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            patience: 2000,
            step_batch: 400,
            expansion_threshold: 1,
            exploration: std::f64::consts::SQRT_2,
            tournament_size: 3,
            seed: 0,
        }
    }
}

impl SearchConfig {
    /// Validate every option.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] naming the first offending option.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_nodes == 0 {
            return Err(SearchError::invalid_config("max_nodes must be at least 1"));
        }
        if self.beam_width == 0 {
            return Err(SearchError::invalid_config("beam_width must be at least 1"));
        }
        self.mcts.validate()
    }

    /// Serialize to a JSON value suitable for canonical hashing.
    ///
    /// The time limit is recorded in whole milliseconds.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "beam_width": self.beam_width,
            "frontier": self.frontier.as_str(),
            "max_nodes": self.max_nodes,
            "mcts": self.mcts.to_json(),
            "record_trace": self.record_trace,
            "time_limit_ms": u64::try_from(self.time_limit.as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// Parse a configuration object. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] for unknown keys, mistyped
    /// values, or a result that fails [`SearchConfig::validate`].
    pub fn from_json(value: &Value) -> Result<Self, SearchError> {
        let obj = as_object(value, "search config")?;
        let mut config = Self::default();
        for (key, v) in obj {
            match key.as_str() {
                "beam_width" => config.beam_width = as_usize(v, key)?,
                "frontier" => {
                    let name = v
                        .as_str()
                        .ok_or_else(|| SearchError::invalid_config("frontier must be a string"))?;
                    config.frontier = name.parse()?;
                }
                "max_nodes" => config.max_nodes = as_usize(v, key)?,
                "mcts" => config.mcts = MctsConfig::from_json(v)?,
                "record_trace" => {
                    config.record_trace = v.as_bool().ok_or_else(|| {
                        SearchError::invalid_config("record_trace must be a boolean")
                    })?;
                }
                "time_limit_ms" => config.time_limit = Duration::from_millis(as_u64(v, key)?),
                other => {
                    return Err(SearchError::invalid_config(format!(
                        "unknown search option `{other}`"
                    )))
                }
            }
        }
        config.validate()?;
        Ok(config)
    }
}

impl MctsConfig {
    /// Validate MCTS options.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] naming the offending option.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.patience == 0 {
            return Err(SearchError::invalid_config("mcts.patience must be at least 1"));
        }
        if self.step_batch == 0 {
            return Err(SearchError::invalid_config("mcts.step_batch must be at least 1"));
        }
        if self.tournament_size == 0 {
            return Err(SearchError::invalid_config(
                "mcts.tournament_size must be at least 1",
            ));
        }
        if !self.exploration.is_finite() || self.exploration < 0.0 {
            return Err(SearchError::invalid_config(
                "mcts.exploration must be finite and non-negative",
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "expansion_threshold": self.expansion_threshold,
            "exploration": real_to_canonical_string(self.exploration),
            "patience": self.patience,
            "seed": self.seed,
            "step_batch": self.step_batch,
            "tournament_size": self.tournament_size,
        })
    }

    /// Parse an MCTS options object. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidConfig`] for unknown keys or mistyped values.
    pub fn from_json(value: &Value) -> Result<Self, SearchError> {
        let obj = as_object(value, "mcts config")?;
        let mut config = Self::default();
        for (key, v) in obj {
            match key.as_str() {
                "expansion_threshold" => {
                    config.expansion_threshold = u32::try_from(as_u64(v, key)?).map_err(|_| {
                        SearchError::invalid_config("mcts.expansion_threshold out of range")
                    })?;
                }
                "exploration" => {
                    config.exploration = match v {
                        Value::String(s) => real_from_canonical_string(s),
                        other => other.as_f64(),
                    }
                    .ok_or_else(|| SearchError::invalid_config("mcts.exploration must be a real"))?;
                }
                "patience" => config.patience = as_u64(v, key)?,
                "seed" => config.seed = as_u64(v, key)?,
                "step_batch" => config.step_batch = as_usize(v, key)?,
                "tournament_size" => config.tournament_size = as_usize(v, key)?,
                other => {
                    return Err(SearchError::invalid_config(format!(
                        "unknown mcts option `{other}`"
                    )))
                }
            }
        }
        Ok(config)
    }
}

fn as_object<'v>(value: &'v Value, what: &str) -> Result<&'v Map<String, Value>, SearchError> {
    value
        .as_object()
        .ok_or_else(|| SearchError::invalid_config(format!("{what} must be a JSON object")))
}

fn as_u64(value: &Value, key: &str) -> Result<u64, SearchError> {
    value.as_u64().ok_or_else(|| {
        SearchError::invalid_config(format!("`{key}` must be a non-negative integer"))
    })
}

fn as_usize(value: &Value, key: &str) -> Result<usize, SearchError> {
    usize::try_from(as_u64(value, key)?)
        .map_err(|_| SearchError::invalid_config(format!("`{key}` out of range")))
}
