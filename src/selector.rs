//! Discriminated selector blocks
//!
//! Every subsystem block in an experiment document follows the same
//! convention: a `name` key holding a dotted identifier that picks the
//! implementation, with sibling keys as that implementation's constructor
//! parameters. A `Selector` keeps the name typed and the parameters as
//! raw YAML values so nothing is lost.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::num;

/// A selector block: implementation name plus constructor parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    /// Dotted identifier resolved against a registry (e.g. `vel.rl.env.classic_atari`)
    pub name: String,
    /// Constructor parameters, kept as raw YAML values
    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,
}

impl Selector {
    /// Build a selector with no parameters
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Extract a nested parameter as a selector block of its own.
    ///
    /// Returns `None` when the parameter is absent or is not a mapping
    /// carrying a `name` key; malformed nesting is reported by the
    /// validator rather than here.
    pub fn sub_selector(&self, key: &str) -> Option<Selector> {
        let value = self.params.get(key)?;
        if !value_is_selector(value) {
            return None;
        }
        serde_yaml::from_value(value.clone()).ok()
    }

    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    pub fn bool_param(&self, key: &str) -> Option<bool> {
        self.params.get(key).and_then(Value::as_bool)
    }

    pub fn f64_param(&self, key: &str) -> Option<f64> {
        self.params.get(key).and_then(num::as_f64)
    }

    pub fn u64_param(&self, key: &str) -> Option<u64> {
        self.params.get(key).and_then(num::as_u64)
    }

    pub fn usize_param(&self, key: &str) -> Option<usize> {
        self.params.get(key).and_then(num::as_usize)
    }

    /// Namespace prefix of the dotted identifier (everything before the
    /// final segment), empty for bare names like `adam`.
    pub fn namespace(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => "",
        }
    }

    /// Final segment of the dotted identifier
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// Whether a raw value has the shape of a selector block
pub fn value_is_selector(value: &Value) -> bool {
    value
        .as_mapping()
        .map(|m| m.get("name").is_some())
        .unwrap_or(false)
}

/// Check a dotted identifier: one or more `[A-Za-z_][A-Za-z0-9_]*`
/// segments joined by single dots.
pub fn is_well_formed_name(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    name.split('.').all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(text: &str) -> Selector {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_flattened_params_survive() {
        let s = selector("{name: vel.rl.env.classic_atari, game: 'BreakoutNoFrameskip-v4'}");
        assert_eq!(s.name, "vel.rl.env.classic_atari");
        assert_eq!(s.str_param("game"), Some("BreakoutNoFrameskip-v4"));
        assert_eq!(s.short_name(), "classic_atari");
        assert_eq!(s.namespace(), "vel.rl.env");
    }

    #[test]
    fn test_numeric_params_coerce() {
        let s = selector("{name: adam, lr: 7.0e-4, epsilon: 1.0e-3}");
        assert_eq!(s.f64_param("lr"), Some(7.0e-4));
        assert_eq!(s.f64_param("missing"), None);
    }

    #[test]
    fn test_sub_selector() {
        let s = selector(
            "{name: vel.rl.models.stochastic_policy_model, \
             backbone: {name: vel.rl.models.backbone.nature_cnn, input_width: 84}}",
        );
        let backbone = s.sub_selector("backbone").unwrap();
        assert_eq!(backbone.short_name(), "nature_cnn");
        assert_eq!(backbone.u64_param("input_width"), Some(84));
        // a plain mapping without `name` is not a selector
        let s = selector("{name: x, sample_args: {argmax_sampling: true}}");
        assert!(s.sub_selector("sample_args").is_none());
    }

    #[test]
    fn test_well_formed_names() {
        assert!(is_well_formed_name("adam"));
        assert!(is_well_formed_name("vel.rl.env_roller.vec.step_env_roller"));
        assert!(is_well_formed_name("_private.thing"));
        assert!(!is_well_formed_name(""));
        assert!(!is_well_formed_name("vel..rl"));
        assert!(!is_well_formed_name(".leading"));
        assert!(!is_well_formed_name("1numeric"));
        assert!(!is_well_formed_name("has space"));
    }

    #[test]
    fn test_missing_name_is_a_parse_error() {
        let parsed: Result<Selector, _> = serde_yaml::from_str("{game: pong}");
        assert!(parsed.is_err());
    }
}
