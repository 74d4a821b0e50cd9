//! Document validation
//!
//! Structural and schema checks over one experiment document. The
//! validator never fails fast: it walks the whole tree and returns every
//! issue found, each addressed by a dotted path into the document, so a
//! bad file is fixed in one pass rather than one error at a time.

use std::fmt;

use serde_yaml::Value;

use crate::document::Document;
use crate::num;
use crate::registry::{SelectorKind, SelectorRegistry};
use crate::selector;
use crate::video::VideoTemplate;

/// Top-level keys every document must carry, with non-empty values
pub const REQUIRED_KEYS: &[&str] = &["name", "env", "model", "reinforcer", "optimizer", "commands"];

/// Optional top-level keys the format recognizes
pub const OPTIONAL_KEYS: &[&str] = &["vec_env", "scheduler"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One finding, addressed by a dotted path into the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub path: String,
    pub message: String,
}

impl Issue {
    fn error(path: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            path: path.to_string(),
            message: message.into(),
        }
    }

    fn warning(path: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.path, self.message)
    }
}

pub fn has_errors(issues: &[Issue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}

/// Environment dimensions supplied by the caller for exact backbone
/// shape checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvDims {
    pub observation: u64,
    pub action: u64,
}

/// Configurable document validator
#[derive(Debug, Clone)]
pub struct Validator<'a> {
    registry: &'a SelectorRegistry,
    strict: bool,
    env_dims: Option<EnvDims>,
}

impl<'a> Validator<'a> {
    pub fn new(registry: &'a SelectorRegistry) -> Self {
        Self {
            registry,
            strict: false,
            env_dims: None,
        }
    }

    /// In strict mode unknown selector names are errors instead of warnings
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Supply observation/action sizes for exact backbone shape checks
    pub fn with_env_dims(mut self, dims: EnvDims) -> Self {
        self.env_dims = Some(dims);
        self
    }

    /// Run every check against one document
    pub fn check_document(&self, doc: &Document) -> Vec<Issue> {
        let mut issues = Vec::new();

        let Some(root) = doc.root().as_mapping() else {
            issues.push(Issue::error("", "document root is not a mapping"));
            return issues;
        };

        for key in REQUIRED_KEYS {
            match root.get(*key) {
                None => issues.push(Issue::error(key, "required key is missing")),
                Some(value) if value.is_null() => {
                    issues.push(Issue::error(key, "required key is empty"))
                }
                Some(_) => {}
            }
        }

        if let Some(name) = root.get("name") {
            match name.as_str() {
                Some("") => issues.push(Issue::error("name", "experiment name is empty")),
                Some(_) => {}
                None => issues.push(Issue::error("name", "experiment name must be a string")),
            }
        }

        let top_level = [
            ("env", SelectorKind::Env),
            ("vec_env", SelectorKind::VecEnv),
            ("model", SelectorKind::Model),
            ("reinforcer", SelectorKind::Reinforcer),
            ("optimizer", SelectorKind::Optimizer),
            ("scheduler", SelectorKind::Scheduler),
        ];
        for (key, kind) in top_level {
            if let Some(value) = root.get(key) {
                if !value.is_null() {
                    self.check_selector(key, value, Some(kind), &mut issues);
                }
            }
        }

        if let Some(commands) = root.get("commands") {
            self.check_commands(commands, &mut issues);
        }

        if let Some(optimizer) = root.get("optimizer") {
            check_optimizer_groups("optimizer", optimizer, &mut issues);
        }

        if let Some(model) = root.get("model") {
            self.check_backbone_shapes("model", model, &mut issues);
        }

        issues
    }

    /// Validate one selector block and recurse into nested selector
    /// positions. A parameter is a selector position either by key
    /// convention (`algo`, `env_roller`, `backbone`, `*_backbone`) or by
    /// shape (a mapping carrying a `name` key); a convention-keyed mapping
    /// without `name` is an error, not a plain parameter.
    fn check_selector(
        &self,
        path: &str,
        value: &Value,
        expected: Option<SelectorKind>,
        issues: &mut Vec<Issue>,
    ) {
        let Some(mapping) = value.as_mapping() else {
            issues.push(Issue::error(path, "selector block must be a mapping"));
            return;
        };

        let name = match mapping.get("name") {
            None => {
                issues.push(Issue::error(path, "selector block has no `name` key"));
                return;
            }
            Some(Value::String(s)) if s.is_empty() => {
                issues.push(Issue::error(path, "selector name is empty"));
                return;
            }
            Some(Value::String(s)) => s.as_str(),
            Some(_) => {
                issues.push(Issue::error(path, "selector name must be a string"));
                return;
            }
        };

        if !selector::is_well_formed_name(name) {
            issues.push(Issue::error(
                path,
                format!("selector name '{name}' is not a dotted identifier"),
            ));
        } else {
            self.check_against_registry(path, name, expected, mapping, issues);
        }

        for (key, nested) in mapping {
            let Some(key) = key.as_str() else { continue };
            if key == "name" {
                continue;
            }
            let kind = position_kind(key);
            if (kind.is_some() && nested.is_mapping()) || selector::value_is_selector(nested) {
                let nested_path = format!("{path}.{key}");
                self.check_selector(&nested_path, nested, kind, issues);
            }
        }
    }

    fn check_against_registry(
        &self,
        path: &str,
        name: &str,
        expected: Option<SelectorKind>,
        mapping: &serde_yaml::Mapping,
        issues: &mut Vec<Issue>,
    ) {
        let Some(spec) = self.registry.lookup(name) else {
            let message = format!("unknown selector name '{name}'");
            issues.push(if self.strict {
                Issue::error(path, message)
            } else {
                Issue::warning(path, message)
            });
            return;
        };

        if let Some(expected) = expected {
            if spec.kind != expected {
                issues.push(Issue::error(
                    path,
                    format!(
                        "'{name}' ({}) cannot appear in {} position",
                        spec.kind.as_str(),
                        expected.as_str()
                    ),
                ));
            }
        }

        for required in &spec.required {
            if mapping.get(required.as_str()).is_none() {
                issues.push(Issue::error(
                    path,
                    format!("'{name}' requires parameter '{required}'"),
                ));
            }
        }

        for (key, _) in mapping {
            let Some(key) = key.as_str() else { continue };
            if key == "name" {
                continue;
            }
            let known = spec.required.iter().any(|p| p == key)
                || spec.optional.iter().any(|p| p == key);
            if !known {
                issues.push(Issue::warning(
                    path,
                    format!("'{name}' does not take parameter '{key}'"),
                ));
            }
        }
    }

    fn check_commands(&self, commands: &Value, issues: &mut Vec<Issue>) {
        let Some(mapping) = commands.as_mapping() else {
            issues.push(Issue::error("commands", "commands must be a mapping"));
            return;
        };
        if mapping.is_empty() {
            issues.push(Issue::error("commands", "commands mapping is empty"));
            return;
        }

        for (key, command) in mapping {
            let Some(command_name) = key.as_str() else {
                issues.push(Issue::error("commands", "command key must be a string"));
                continue;
            };
            let path = format!("commands.{command_name}");
            self.check_selector(&path, command, Some(SelectorKind::Command), issues);

            if let Some(videoname) = command
                .as_mapping()
                .and_then(|m| m.get("videoname"))
            {
                check_videoname(&format!("{path}.videoname"), videoname, issues);
            }
        }
    }

    /// Cross-field backbone consistency. When both a policy and a value
    /// backbone declare `input_length`, the value network reads the
    /// observation concatenated with the action, so its input must be
    /// strictly wider; with known environment dimensions the equality is
    /// checked exactly.
    fn check_backbone_shapes(&self, path: &str, model: &Value, issues: &mut Vec<Issue>) {
        let Some(mapping) = model.as_mapping() else {
            return;
        };

        let input_length = |block: &str| -> Option<u64> {
            mapping
                .get(block)
                .and_then(Value::as_mapping)
                .and_then(|m| m.get("input_length"))
                .and_then(num::as_u64)
        };

        let policy = input_length("policy_backbone");
        let value = input_length("value_backbone");

        if let (Some(policy), Some(value)) = (policy, value) {
            if value <= policy {
                issues.push(Issue::error(
                    &format!("{path}.value_backbone.input_length"),
                    format!(
                        "value backbone input ({value}) must exceed policy backbone \
                         input ({policy}) by the action dimensionality"
                    ),
                ));
            }
        }

        if let Some(dims) = self.env_dims {
            if let Some(policy) = policy {
                if policy != dims.observation {
                    issues.push(Issue::error(
                        &format!("{path}.policy_backbone.input_length"),
                        format!(
                            "policy backbone input ({policy}) does not match \
                             observation size ({})",
                            dims.observation
                        ),
                    ));
                }
            }
            if let Some(value) = value {
                let expected = dims.observation + dims.action;
                if value != expected {
                    issues.push(Issue::error(
                        &format!("{path}.value_backbone.input_length"),
                        format!(
                            "value backbone input ({value}) does not match observation \
                             + action size ({expected})"
                        ),
                    ));
                }
            }
            // Single-backbone models read the raw observation.
            if policy.is_none() && value.is_none() {
                if let Some(input) = input_length("backbone") {
                    if input != dims.observation {
                        issues.push(Issue::error(
                            &format!("{path}.backbone.input_length"),
                            format!(
                                "backbone input ({input}) does not match observation \
                                 size ({})",
                                dims.observation
                            ),
                        ));
                    }
                }
            }
        }
    }
}

/// Selector kind implied by a nested parameter key, for positions that
/// must hold a selector block even when the `name` key was forgotten
fn position_kind(key: &str) -> Option<SelectorKind> {
    match key {
        "algo" => Some(SelectorKind::Algo),
        "env_roller" => Some(SelectorKind::EnvRoller),
        "backbone" => Some(SelectorKind::Backbone),
        _ if key.ends_with("_backbone") => Some(SelectorKind::Backbone),
        _ => None,
    }
}

/// All list-valued hyperparameters of one optimizer block must agree on
/// the number of parameter groups.
fn check_optimizer_groups(path: &str, optimizer: &Value, issues: &mut Vec<Issue>) {
    let Some(mapping) = optimizer.as_mapping() else {
        return;
    };

    let mut lists: Vec<(&str, usize)> = Vec::new();
    for (key, value) in mapping {
        let (Some(key), Value::Sequence(seq)) = (key.as_str(), value) else {
            continue;
        };
        if !seq.iter().all(|v| num::as_f64(v).is_some()) {
            issues.push(Issue::error(
                &format!("{path}.{key}"),
                "per-group hyperparameter list contains a non-numeric entry",
            ));
            continue;
        }
        lists.push((key, seq.len()));
    }

    if let Some(&(first_key, first_len)) = lists.first() {
        for &(key, len) in &lists[1..] {
            if len != first_len {
                issues.push(Issue::error(
                    &format!("{path}.{key}"),
                    format!(
                        "per-group list has {len} entries but '{first_key}' has {first_len}; \
                         all group lists must have equal length"
                    ),
                ));
            }
        }
    }
}

fn check_videoname(path: &str, videoname: &Value, issues: &mut Vec<Issue>) {
    let Some(template) = videoname.as_str() else {
        issues.push(Issue::error(path, "videoname must be a string"));
        return;
    };
    if let Err(err) = VideoTemplate::parse(template) {
        issues.push(Issue::error(path, err.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::parse_str(text).unwrap()
    }

    fn check(text: &str) -> Vec<Issue> {
        let registry = SelectorRegistry::builtin();
        Validator::new(&registry).check_document(&doc(text))
    }

    const VALID: &str = r#"
name: 'a2c_breakout'
env:
  name: vel.rl.env.classic_atari
  game: 'BreakoutNoFrameskip-v4'
vec_env:
  name: vel.rl.vecenv.subproc
  frame_history: 4
model:
  name: vel.rl.models.stochastic_policy_model
  backbone:
    name: vel.rl.models.backbone.nature_cnn
    input_width: 84
    input_height: 84
    input_channels: 4
reinforcer:
  name: vel.rl.reinforcers.on_policy_iteration_reinforcer
  algo:
    name: vel.rl.algo.policy_gradient.a2c
    entropy_coefficient: 0.01
    value_coefficient: 0.5
    discount_factor: 0.99
  env_roller:
    name: vel.rl.env_roller.vec.step_env_roller
    gae_lambda: 1.0
  parallel_envs: 16
  number_of_steps: 5
optimizer:
  name: rmsprop
  lr: 7.0e-4
  alpha: 0.99
  epsilon: 1.0e-3
commands:
  train:
    name: vel.rl.commands.rl_train_command
    total_frames: 1.1e7
    batches_per_epoch: 100
  record:
    name: vel.rl.commands.record_movie_command
    takes: 10
    videoname: 'breakout_vid_{:04}.avi'
"#;

    #[test]
    fn test_valid_document_is_clean() {
        let issues = check(VALID);
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");
    }

    #[test]
    fn test_missing_required_key() {
        let issues = check("name: x\nenv: {name: vel.rl.env.mujoco, game: g}");
        assert!(issues
            .iter()
            .any(|i| i.path == "optimizer" && i.severity == Severity::Error));
        assert!(issues.iter().any(|i| i.path == "commands"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let issues = check("name: ''\nenv: {name: vel.rl.env.mujoco, game: g}");
        assert!(issues
            .iter()
            .any(|i| i.path == "name" && i.message.contains("empty")));
    }

    #[test]
    fn test_unknown_selector_warns_then_errors_in_strict() {
        let text = VALID.replace("rmsprop", "rmspropx");
        let registry = SelectorRegistry::builtin();

        let issues = Validator::new(&registry).check_document(&doc(&text));
        let issue = issues.iter().find(|i| i.path == "optimizer").unwrap();
        assert_eq!(issue.severity, Severity::Warning);

        let issues = Validator::new(&registry).strict(true).check_document(&doc(&text));
        let issue = issues.iter().find(|i| i.path == "optimizer").unwrap();
        assert_eq!(issue.severity, Severity::Error);
    }

    #[test]
    fn test_missing_required_selector_param() {
        let text = VALID.replace("  game: 'BreakoutNoFrameskip-v4'\n", "");
        let issues = check(&text);
        assert!(issues
            .iter()
            .any(|i| i.path == "env" && i.message.contains("requires parameter 'game'")));
    }

    #[test]
    fn test_nameless_nested_blocks_are_errors() {
        let text = r#"
name: 'nameless_blocks'
env: {name: vel.rl.env.classic_atari, game: 'BreakoutNoFrameskip-v4'}
model:
  name: vel.rl.models.stochastic_policy_model
  backbone: {input_width: 84, input_height: 84, input_channels: 4}
reinforcer:
  name: vel.rl.reinforcers.on_policy_iteration_reinforcer
  algo: {entropy_coefficient: 0.01}
  env_roller: {gae_lambda: 1.0}
  parallel_envs: 16
  number_of_steps: 5
optimizer: {name: rmsprop, lr: 7.0e-4}
commands:
  train: {name: vel.rl.commands.rl_train_command, total_frames: 1.1e7, batches_per_epoch: 100}
"#;
        let issues = check(text);
        for path in ["model.backbone", "reinforcer.algo", "reinforcer.env_roller"] {
            assert!(
                issues.iter().any(|i| i.severity == Severity::Error
                    && i.path == path
                    && i.message.contains("no `name` key")),
                "no error for nameless block at {path}: {issues:?}"
            );
        }
    }

    #[test]
    fn test_nameless_policy_value_backbones_are_errors() {
        let text = r#"
name: 'nameless_backbones'
env: {name: vel.rl.env.mujoco, game: 'HalfCheetah-v2'}
model:
  name: vel.rl.models.deterministic_policy_model
  policy_backbone: {input_length: 17}
  value_backbone: {input_length: 23}
reinforcer:
  name: vel.rl.reinforcers.buffered_off_policy_iteration_reinforcer
  algo: {name: vel.rl.algo.ddpg, discount_factor: 0.99}
  env_roller:
    name: vel.rl.env_roller.single.deque_replay_roller_ou_noise
    buffer_capacity: 1_000_000
    buffer_initial_size: 2_000
optimizer: {name: adam, lr: 1.0e-4}
commands:
  train: {name: vel.rl.commands.rl_train_command, total_frames: 1_000_000, batches_per_epoch: 1000}
"#;
        let issues = check(text);
        for path in ["model.policy_backbone", "model.value_backbone"] {
            assert!(
                issues.iter().any(|i| i.severity == Severity::Error && i.path == path),
                "no error for nameless block at {path}: {issues:?}"
            );
        }
    }

    #[test]
    fn test_unknown_parameter_warns() {
        let text = VALID.replace("  alpha: 0.99\n", "  alpha: 0.99\n  warmup: 10\n");
        let issues = check(&text);
        let issue = issues
            .iter()
            .find(|i| i.path == "optimizer" && i.message.contains("'warmup'"))
            .expect("no issue for unknown optimizer parameter");
        assert_eq!(issue.severity, Severity::Warning);
    }

    #[test]
    fn test_selector_kind_must_match_position() {
        let text = VALID.replace(
            "env:\n  name: vel.rl.env.classic_atari\n  game: 'BreakoutNoFrameskip-v4'\n",
            "env:\n  name: rmsprop\n  lr: 7.0e-4\n",
        );
        let issues = check(&text);
        assert!(issues.iter().any(|i| i.path == "env"
            && i.severity == Severity::Error
            && i.message.contains("cannot appear in env position")));
    }

    #[test]
    fn test_optimizer_group_lengths() {
        let text = VALID.replace(
            "  lr: 7.0e-4\n",
            "  lr: [1.0e-4, 1.0e-3, 1.0e-3]\n  weight_decay: [0.0, 0.001]\n",
        );
        let issues = check(&text);
        assert!(issues
            .iter()
            .any(|i| i.path == "optimizer.weight_decay" && i.message.contains("equal length")));
    }

    #[test]
    fn test_optimizer_group_non_numeric() {
        let text = VALID.replace("  lr: 7.0e-4\n", "  lr: [1.0e-4, banana]\n");
        let issues = check(&text);
        assert!(issues
            .iter()
            .any(|i| i.path == "optimizer.lr" && i.message.contains("non-numeric")));
    }

    #[test]
    fn test_bad_videoname_template() {
        let text = VALID.replace("breakout_vid_{:04}.avi", "breakout_vid.avi");
        let issues = check(&text);
        assert!(issues
            .iter()
            .any(|i| i.path == "commands.record.videoname" && i.message.contains("slot")));
    }

    #[test]
    fn test_backbone_width_ordering() {
        let text = r#"
name: 'ddpg_bad'
env: {name: vel.rl.env.mujoco, game: 'HalfCheetah-v2'}
model:
  name: vel.rl.models.deterministic_policy_model
  policy_backbone: {name: vel.rl.models.backbone.mlp, input_length: 17}
  value_backbone: {name: vel.rl.models.backbone.mlp, input_length: 17}
reinforcer:
  name: vel.rl.reinforcers.buffered_off_policy_iteration_reinforcer
  algo: {name: vel.rl.algo.ddpg, discount_factor: 0.99}
  env_roller:
    name: vel.rl.env_roller.single.deque_replay_roller_ou_noise
    buffer_capacity: 1_000_000
    buffer_initial_size: 2_000
optimizer: {name: adam, lr: 1.0e-4}
commands:
  train: {name: vel.rl.commands.rl_train_command, total_frames: 1_000_000, batches_per_epoch: 1000}
"#;
        let issues = check(text);
        assert!(issues
            .iter()
            .any(|i| i.path == "model.value_backbone.input_length"));
    }

    #[test]
    fn test_env_dims_exact_check() {
        let text = r#"
name: 'ddpg_half_cheetah'
env: {name: vel.rl.env.mujoco, game: 'HalfCheetah-v2'}
model:
  name: vel.rl.models.deterministic_policy_model
  policy_backbone: {name: vel.rl.models.backbone.mlp, input_length: 17}
  value_backbone: {name: vel.rl.models.backbone.mlp, input_length: 23}
reinforcer:
  name: vel.rl.reinforcers.buffered_off_policy_iteration_reinforcer
  algo: {name: vel.rl.algo.ddpg, discount_factor: 0.99}
  env_roller:
    name: vel.rl.env_roller.single.deque_replay_roller_ou_noise
    buffer_capacity: 1_000_000
    buffer_initial_size: 2_000
optimizer: {name: adam, lr: 1.0e-4}
commands:
  train: {name: vel.rl.commands.rl_train_command, total_frames: 1_000_000, batches_per_epoch: 1000}
"#;
        let registry = SelectorRegistry::builtin();
        let document = doc(text);

        // half-cheetah: 17 observations, 6 actions
        let issues = Validator::new(&registry)
            .with_env_dims(EnvDims { observation: 17, action: 6 })
            .check_document(&document);
        assert!(issues.is_empty(), "unexpected issues: {issues:?}");

        let issues = Validator::new(&registry)
            .with_env_dims(EnvDims { observation: 17, action: 4 })
            .check_document(&document);
        assert!(issues
            .iter()
            .any(|i| i.path == "model.value_backbone.input_length"));
    }
}
