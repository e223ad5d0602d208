//! Node parameter values and parameter sets

use crate::error::SubstitutionError;
use crate::substitution::{
    parse_substitutions, render_substitutions, resolve_substitutions, LaunchContext, Substitution,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Type given to a deferred value once it is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Always a string parameter
    String,
    /// Read as a YAML scalar, so `true`/`false` become booleans
    Yaml,
}

/// A single node parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    Text(String),
    Bool(bool),
    /// Evaluated by the runner, typed according to `value_type`
    Deferred {
        subs: Vec<Substitution>,
        value_type: ValueType,
    },
}

impl ParameterValue {
    pub fn text(value: impl Into<String>) -> Self {
        ParameterValue::Text(value.into())
    }

    /// `$(var name)`, YAML-typed
    pub fn launch_configuration(name: impl Into<String>) -> Self {
        ParameterValue::Deferred {
            subs: vec![Substitution::LaunchConfiguration(name.into())],
            value_type: ValueType::Yaml,
        }
    }

    /// Substitutions whose result is always passed as a string
    pub fn deferred_string(subs: Vec<Substitution>) -> Self {
        ParameterValue::Deferred {
            subs,
            value_type: ValueType::String,
        }
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, ParameterValue::Deferred { .. })
    }

    /// Evaluate any substitutions, leaving literal values untouched
    pub fn resolve(&self, context: &LaunchContext) -> Result<ParameterValue, SubstitutionError> {
        match self {
            ParameterValue::Deferred { subs, value_type } => {
                let resolved = resolve_substitutions(subs, context)?;
                Ok(match value_type {
                    ValueType::String => ParameterValue::Text(resolved),
                    ValueType::Yaml => yaml_scalar(resolved),
                })
            }
            other => Ok(other.clone()),
        }
    }

    /// Read a value back from its serialized launch syntax.
    ///
    /// A value that is a single `$(command ...)` is string-typed, matching how
    /// compiled descriptions are passed; any other substitution is YAML-typed.
    pub fn from_launch_syntax(value: &str) -> Result<Self, SubstitutionError> {
        if !value.contains("$(") {
            return Ok(ParameterValue::text(value));
        }

        let subs = parse_substitutions(value)?;
        let value_type = match subs.as_slice() {
            [Substitution::Command(_)] => ValueType::String,
            _ => ValueType::Yaml,
        };
        Ok(ParameterValue::Deferred { subs, value_type })
    }
}

fn yaml_scalar(value: String) -> ParameterValue {
    match value.as_str() {
        "true" => ParameterValue::Bool(true),
        "false" => ParameterValue::Bool(false),
        _ => ParameterValue::Text(value),
    }
}

impl Serialize for ParameterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParameterValue::Text(s) => serializer.serialize_str(s),
            ParameterValue::Bool(b) => serializer.serialize_bool(*b),
            ParameterValue::Deferred { subs, .. } => {
                serializer.serialize_str(&render_substitutions(subs))
            }
        }
    }
}

impl<'de> Deserialize<'de> for ParameterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Bool(b) => Ok(ParameterValue::Bool(b)),
            Raw::Text(s) => {
                let parsed = ParameterValue::from_launch_syntax(&s);
                parsed.map_err(serde::de::Error::custom)
            }
        }
    }
}

/// Parameter mapping handed to one or more nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet(BTreeMap<String, ParameterValue>);

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: ParameterValue) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterValue)> {
        self.0.iter()
    }

    pub fn resolve(&self, context: &LaunchContext) -> Result<ParameterSet, SubstitutionError> {
        let resolved = self
            .0
            .iter()
            .map(|(k, v)| Ok((k.clone(), v.resolve(context)?)))
            .collect::<Result<BTreeMap<_, _>, SubstitutionError>>()?;
        Ok(ParameterSet(resolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIM: &str = "use_sim_time";

    fn sim_time() -> ParameterValue {
        ParameterValue::launch_configuration(SIM)
    }

    fn sim_time_context(value: &str) -> LaunchContext {
        let mut context = LaunchContext::new();
        context.set_configuration(SIM.to_string(), value.to_string());
        context
    }

    #[test]
    fn test_serialize_values() {
        let set = ParameterSet::new()
            .with(SIM, sim_time())
            .with("publish_frequency", ParameterValue::text("30.0"))
            .with("ignore_timestamp", ParameterValue::Bool(false));

        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(
            json,
            r#"{"ignore_timestamp":false,"publish_frequency":"30.0","use_sim_time":"$(var use_sim_time)"}"#
        );
    }

    #[test]
    fn test_launch_configuration_resolves_to_bool() {
        let value = sim_time();
        let resolved = value.resolve(&sim_time_context("false")).unwrap();
        assert_eq!(resolved, ParameterValue::Bool(false));

        let resolved = value.resolve(&sim_time_context("true")).unwrap();
        assert_eq!(resolved, ParameterValue::Bool(true));
    }

    #[test]
    fn test_yaml_typed_non_bool_stays_text() {
        let value = ParameterValue::launch_configuration("frame");
        let mut context = LaunchContext::new();
        context.set_configuration("frame".to_string(), "world".to_string());

        let resolved = value.resolve(&context).unwrap();
        assert_eq!(resolved, ParameterValue::text("world"));
    }

    #[test]
    fn test_string_typed_stays_text() {
        let subs = vec![Substitution::LaunchConfiguration(SIM.to_string())];
        let value = ParameterValue::deferred_string(subs);

        let resolved = value.resolve(&sim_time_context("true")).unwrap();
        assert_eq!(resolved, ParameterValue::text("true"));
    }

    #[test]
    fn test_resolve_set() {
        let set = ParameterSet::new()
            .with(SIM, sim_time())
            .with("frame", ParameterValue::text("world"));

        let resolved = set.resolve(&sim_time_context("true")).unwrap();
        assert_eq!(resolved.get(SIM), Some(&ParameterValue::Bool(true)));
        assert_eq!(resolved.get("frame"), Some(&ParameterValue::text("world")));
        assert!(!resolved.iter().any(|(_, v)| v.is_deferred()));
    }

    #[test]
    fn test_resolve_undefined_variable_fails() {
        let set = ParameterSet::new().with(SIM, sim_time());
        assert!(set.resolve(&LaunchContext::new()).is_err());
    }

    #[test]
    fn test_deserialize_launch_syntax() {
        let json = r#"{"a": true, "b": "$(var x)", "c": "$(command 'xacro /r.xacro')"}"#;
        let set: ParameterSet = serde_json::from_str(json).unwrap();

        let var = ParameterValue::launch_configuration("x");
        let xacro = Substitution::Text("xacro /r.xacro".to_string());
        let command = ParameterValue::deferred_string(vec![Substitution::Command(vec![xacro])]);

        assert_eq!(set.get("a"), Some(&ParameterValue::Bool(true)));
        assert_eq!(set.get("b"), Some(&var));
        assert_eq!(set.get("c"), Some(&command));
    }

    #[test]
    fn test_deserialize_plain_text() {
        let set: ParameterSet = serde_json::from_str(r#"{"frame": "world"}"#).unwrap();
        assert_eq!(set.get("frame"), Some(&ParameterValue::text("world")));
    }

    #[test]
    fn test_deserialize_rejects_unknown_substitution() {
        let result: Result<ParameterSet, _> = serde_json::from_str(r#"{"a": "$(env HOME)"}"#);
        assert!(result.is_err());
    }
}
