//! Typed experiment model
//!
//! The strongly-typed view over one experiment document: the required and
//! optional top-level blocks, plus read-only views that give convenient
//! access to the parts the validator and the CLI care about (optimizer
//! hyperparameter groups, backbone shapes, command budgets).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::Result;
use crate::num;
use crate::selector::Selector;
use crate::video::VideoTemplate;

pub const TRAIN_COMMAND: &str = "train";
pub const RECORD_COMMAND: &str = "record";

/// One experiment document, typed.
///
/// Unknown top-level keys are retained in `extra` so a document with
/// site-local additions still parses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Experiment identifier, used for output file naming
    pub name: String,
    /// Environment selector (game id, normalization flags)
    pub env: Selector,
    /// How environment instances are parallelized/stacked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vec_env: Option<Selector>,
    /// Network architecture selector
    pub model: Selector,
    /// Training-loop strategy selector, nesting `algo` and `env_roller`
    pub reinforcer: Selector,
    /// Gradient-update rule selector
    pub optimizer: Selector,
    /// Learning-rate schedule selector
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<Selector>,
    /// Named operations (`train`, `record`, ...)
    pub commands: BTreeMap<String, Selector>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ExperimentConfig {
    pub fn parse_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn reinforcer(&self) -> ReinforcerView<'_> {
        ReinforcerView(&self.reinforcer)
    }

    pub fn model(&self) -> ModelView<'_> {
        ModelView(&self.model)
    }

    pub fn optimizer(&self) -> OptimizerView<'_> {
        OptimizerView(&self.optimizer)
    }

    pub fn command(&self, name: &str) -> Option<&Selector> {
        self.commands.get(name)
    }

    pub fn train_command(&self) -> Option<TrainCommandView<'_>> {
        self.commands.get(TRAIN_COMMAND).map(TrainCommandView)
    }

    pub fn record_command(&self) -> Option<RecordCommandView<'_>> {
        self.commands.get(RECORD_COMMAND).map(RecordCommandView)
    }
}

/// Read-only view over a `reinforcer` block
#[derive(Debug, Clone, Copy)]
pub struct ReinforcerView<'a>(pub &'a Selector);

impl ReinforcerView<'_> {
    pub fn algo(&self) -> Option<Selector> {
        self.0.sub_selector("algo")
    }

    pub fn env_roller(&self) -> Option<Selector> {
        self.0.sub_selector("env_roller")
    }

    pub fn parallel_envs(&self) -> Option<usize> {
        self.0.usize_param("parallel_envs")
    }

    pub fn number_of_steps(&self) -> Option<usize> {
        self.0.usize_param("number_of_steps")
    }
}

/// Read-only view over a `model` block
#[derive(Debug, Clone, Copy)]
pub struct ModelView<'a>(pub &'a Selector);

impl ModelView<'_> {
    pub fn backbone(&self) -> Option<Selector> {
        self.0.sub_selector("backbone")
    }

    /// Actor network backbone, for models split into policy/value halves
    pub fn policy_backbone(&self) -> Option<Selector> {
        self.0.sub_selector("policy_backbone")
    }

    /// Critic network backbone
    pub fn value_backbone(&self) -> Option<Selector> {
        self.0.sub_selector("value_backbone")
    }

    /// Action dimensionality implied by the backbone shapes.
    ///
    /// For actor-critic models where the critic consumes observation and
    /// action concatenated, value input minus policy input is the action
    /// size. `None` when either backbone or `input_length` is absent, or
    /// when the difference would be non-positive.
    pub fn implied_action_dim(&self) -> Option<u64> {
        let policy = self.policy_backbone()?.u64_param("input_length")?;
        let value = self.value_backbone()?.u64_param("input_length")?;
        value.checked_sub(policy).filter(|d| *d > 0)
    }
}

/// A hyperparameter that is either a single scalar or one scalar per
/// parameter group
#[derive(Debug, Clone, PartialEq)]
pub enum HyperValue {
    Scalar(f64),
    PerGroup(Vec<f64>),
}

impl HyperValue {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Sequence(seq) => {
                let groups: Option<Vec<f64>> = seq.iter().map(num::as_f64).collect();
                groups.map(HyperValue::PerGroup)
            }
            other => num::as_f64(other).map(HyperValue::Scalar),
        }
    }

    /// Number of parameter groups, `None` for a scalar
    pub fn group_count(&self) -> Option<usize> {
        match self {
            HyperValue::Scalar(_) => None,
            HyperValue::PerGroup(groups) => Some(groups.len()),
        }
    }
}

/// Read-only view over an `optimizer` block
#[derive(Debug, Clone, Copy)]
pub struct OptimizerView<'a>(pub &'a Selector);

impl<'a> OptimizerView<'a> {
    pub fn learning_rate(&self) -> Option<HyperValue> {
        self.hyper("lr")
    }

    pub fn hyper(&self, key: &str) -> Option<HyperValue> {
        self.0.get(key).and_then(HyperValue::from_value)
    }

    /// All list-valued hyperparameters with their group counts, in
    /// document-independent (sorted) order
    pub fn group_lists(&self) -> Vec<(&'a str, usize)> {
        self.0
            .params
            .iter()
            .filter_map(|(key, value)| match value {
                Value::Sequence(seq) => Some((key.as_str(), seq.len())),
                _ => None,
            })
            .collect()
    }
}

/// Read-only view over a `train` command block
#[derive(Debug, Clone, Copy)]
pub struct TrainCommandView<'a>(pub &'a Selector);

impl TrainCommandView<'_> {
    /// Total environment-step budget for the run
    pub fn total_frames(&self) -> Option<u64> {
        self.0.u64_param("total_frames")
    }

    pub fn batches_per_epoch(&self) -> Option<u64> {
        self.0.u64_param("batches_per_epoch")
    }
}

/// Read-only view over a `record` command block
#[derive(Debug, Clone, Copy)]
pub struct RecordCommandView<'a>(pub &'a Selector);

impl RecordCommandView<'_> {
    /// Number of episodes to record
    pub fn takes(&self) -> Option<u64> {
        self.0.u64_param("takes")
    }

    pub fn fps(&self) -> Option<u64> {
        self.0.u64_param("fps")
    }

    pub fn videoname(&self) -> Option<&str> {
        self.0.str_param("videoname")
    }

    /// Parse the `videoname` template, when present
    pub fn video_template(&self) -> Option<Result<VideoTemplate>> {
        self.videoname()
            .map(|raw| VideoTemplate::parse(raw).map_err(Into::into))
    }
}
