//! Launch record data structures

use crate::actions::ArgumentDeclaration;
use crate::error::SubstitutionError;
use crate::params::ParameterSet;
use crate::substitution::LaunchContext;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where a process's stdout/stderr is routed by the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    #[default]
    Screen,
    Log,
    Both,
}

/// A ROS node started from a package executable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub package: String,
    pub executable: String,
    pub name: String,
    pub output: OutputMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Arc<ParameterSet>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

impl NodeRecord {
    pub fn new(package: impl Into<String>, executable: impl Into<String>) -> Self {
        let executable = executable.into();
        Self {
            package: package.into(),
            name: executable.clone(),
            executable,
            output: OutputMode::default(),
            parameters: Vec::new(),
            arguments: Vec::new(),
        }
    }

    pub fn output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn parameters(mut self, parameters: Arc<ParameterSet>) -> Self {
        self.parameters.push(parameters);
        self
    }

    pub fn arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(arguments.into_iter().map(Into::into));
        self
    }

    /// True if any attached parameter set defines `name`
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p.contains_key(name))
    }
}

/// A raw command line started without ROS node semantics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub cmd: Vec<String>,
    pub output: OutputMode,
    pub name: String,
}

/// An informational message printed by the runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub msg: String,
}

/// One entry of a launch description, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LaunchEntity {
    DeclareArgument(ArgumentDeclaration),
    Node(NodeRecord),
    ExecuteProcess(ProcessRecord),
    LogInfo(LogRecord),
}

impl LaunchEntity {
    pub fn kind(&self) -> &'static str {
        match self {
            LaunchEntity::DeclareArgument(_) => "declare_argument",
            LaunchEntity::Node(_) => "node",
            LaunchEntity::ExecuteProcess(_) => "execute_process",
            LaunchEntity::LogInfo(_) => "log_info",
        }
    }
}

/// Ordered list of entities handed to the launch runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchDescription {
    pub entities: Vec<LaunchEntity>,
}

impl LaunchDescription {
    pub fn new(entities: Vec<LaunchEntity>) -> Self {
        Self { entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn declared_arguments(&self) -> impl Iterator<Item = &ArgumentDeclaration> {
        self.entities.iter().filter_map(|e| match e {
            LaunchEntity::DeclareArgument(d) => Some(d),
            _ => None,
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.entities.iter().filter_map(|e| match e {
            LaunchEntity::Node(n) => Some(n),
            _ => None,
        })
    }

    pub fn processes(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.entities.iter().filter_map(|e| match e {
            LaunchEntity::ExecuteProcess(p) => Some(p),
            _ => None,
        })
    }

    pub fn node(&self, name: &str) -> Option<&NodeRecord> {
        self.nodes().find(|n| n.name == name)
    }

    pub fn process(&self, name: &str) -> Option<&ProcessRecord> {
        self.processes().find(|p| p.name == name)
    }

    /// Copy of this description with every parameter substitution evaluated.
    ///
    /// Parameter sets shared between nodes stay shared in the copy.
    pub fn resolve(&self, context: &LaunchContext) -> Result<Self, SubstitutionError> {
        let mut resolved_sets: Vec<(Arc<ParameterSet>, Arc<ParameterSet>)> = Vec::new();
        let mut entities = Vec::with_capacity(self.entities.len());

        for entity in &self.entities {
            let entity = match entity {
                LaunchEntity::Node(node) => {
                    let mut node = node.clone();
                    for params in node.parameters.iter_mut() {
                        let cached = resolved_sets
                            .iter()
                            .find(|(original, _)| Arc::ptr_eq(original, params))
                            .map(|(_, resolved)| Arc::clone(resolved));
                        let resolved = match cached {
                            Some(resolved) => resolved,
                            None => {
                                let resolved = Arc::new(params.resolve(context)?);
                                resolved_sets.push((Arc::clone(params), Arc::clone(&resolved)));
                                resolved
                            }
                        };
                        *params = resolved;
                    }
                    LaunchEntity::Node(node)
                }
                other => other.clone(),
            };
            entities.push(entity);
        }

        Ok(Self { entities })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_yaml(&self) -> serde_yaml::Result<String> {
        serde_yaml::to_string(self)
    }
}
