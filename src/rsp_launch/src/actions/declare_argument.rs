//! Declared launch arguments and their resolution against caller overrides

use crate::error::{LaunchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user-overridable launch input with a default value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDeclaration {
    pub name: String,
    pub default_value: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
}

impl ArgumentDeclaration {
    pub fn new(
        name: impl Into<String>,
        default_value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            default_value: default_value.into(),
            description: description.into(),
            choices: None,
        }
    }

    /// Declare a `"true"`/`"false"` argument
    pub fn boolean(
        name: impl Into<String>,
        default_value: bool,
        description: impl Into<String>,
    ) -> Self {
        Self {
            choices: Some(vec!["true".to_string(), "false".to_string()]),
            ..Self::new(name, default_value.to_string(), description)
        }
    }

    fn validate(&self, value: &str) -> Result<()> {
        match &self.choices {
            Some(choices) if !choices.iter().any(|c| c == value) => {
                Err(LaunchError::InvalidArgument {
                    name: self.name.clone(),
                    value: value.to_string(),
                    expected: choices.join(", "),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Resolve every declared argument to a value.
///
/// Overrides win over defaults. Overrides naming no declared argument are
/// logged and dropped.
pub fn resolve_arguments(
    declarations: &[&ArgumentDeclaration],
    overrides: &HashMap<String, String>,
) -> Result<HashMap<String, String>> {
    for name in overrides.keys() {
        if !declarations.iter().any(|d| &d.name == name) {
            log::warn!("Ignoring undeclared launch argument '{}'", name);
        }
    }

    let mut resolved = HashMap::new();
    for decl in declarations {
        let value = match overrides.get(&decl.name) {
            Some(value) => value.clone(),
            None => decl.default_value.clone(),
        };
        decl.validate(&value)?;
        log::debug!("Launch argument {} := {}", decl.name, value);
        resolved.insert(decl.name.clone(), value);
    }
    Ok(resolved)
}
