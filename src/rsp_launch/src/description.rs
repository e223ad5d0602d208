//! Robot description compilation
//!
//! The model is a xacro template compiled by an external tool. By default the
//! generator only records the command (`$(command 'xacro <file>')`) and the
//! runner evaluates it. In eager mode the tool is run during assembly and its
//! output is checked to be a URDF document.

use crate::error::{LaunchError, Result};
use crate::params::ParameterValue;
use crate::substitution::{resolve_substitutions, LaunchContext, Substitution};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// When the robot description is compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionMode {
    /// Hand the compiler command to the runner
    #[default]
    Deferred,
    /// Compile now and pass the URDF text
    Eager,
}

/// External model-description compiler
pub trait DescriptionCompiler {
    /// Command substitution that compiles `path` when evaluated
    fn command(&self, path: &Path) -> Vec<Substitution>;

    /// Compile `path` to URDF text
    fn compile(&self, path: &Path) -> Result<String> {
        let command = self.command(path);
        Ok(resolve_substitutions(&command, &LaunchContext::new())?)
    }
}

/// Compiler backed by the `xacro` executable
#[derive(Debug, Clone)]
pub struct XacroCompiler {
    program: String,
}

impl XacroCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for XacroCompiler {
    fn default() -> Self {
        Self::new("xacro")
    }
}

impl DescriptionCompiler for XacroCompiler {
    fn command(&self, path: &Path) -> Vec<Substitution> {
        let command = format!("{} {}", self.program, path.display());
        vec![Substitution::Command(vec![Substitution::Text(command)])]
    }
}

/// Output of an eager compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledDescription {
    pub urdf: String,
    /// Names of all non-fixed joints, in document order
    pub movable_joints: Vec<String>,
}

/// Check that `urdf` is a `<robot>` document and list its movable joints
pub fn inspect_urdf(urdf: &str, source: &Path) -> Result<CompiledDescription> {
    let invalid = |message: String| LaunchError::InvalidDescription {
        file: source.display().to_string(),
        message,
    };

    let doc = roxmltree::Document::parse(urdf).map_err(|e| invalid(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "robot" {
        return Err(invalid(format!(
            "expected <robot> root element, found <{}>",
            root.tag_name().name()
        )));
    }

    let movable_joints = root
        .children()
        .filter(|n| n.has_tag_name("joint"))
        .filter(|n| n.attribute("type") != Some("fixed"))
        .filter_map(|n| n.attribute("name"))
        .map(str::to_string)
        .collect();

    Ok(CompiledDescription {
        urdf: urdf.to_string(),
        movable_joints,
    })
}

/// Run the compiler and validate its output
pub fn compile_description(
    compiler: &dyn DescriptionCompiler,
    path: &Path,
) -> Result<CompiledDescription> {
    let urdf = compiler.compile(path)?;
    let compiled = inspect_urdf(&urdf, path)?;
    log::info!(
        "URDF loaded: {} characters, {} movable joints",
        compiled.urdf.len(),
        compiled.movable_joints.len()
    );
    Ok(compiled)
}

/// Deferred parameter value for the robot description
pub fn deferred_description(compiler: &dyn DescriptionCompiler, path: &Path) -> ParameterValue {
    ParameterValue::deferred_string(compiler.command(path))
}
