//! Launch configuration
//!
//! Every name, path, and constant the orchestrator uses lives here. The
//! defaults describe the Articubot bringup; a YAML file can override any
//! subset of fields.

use crate::description::DescriptionMode;
use crate::error::{LaunchError, Result};
use crate::record::OutputMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchConfig {
    /// Package that installs the robot model and rviz layout
    pub package: String,
    /// Xacro source, relative to the package share directory
    pub description_file: PathBuf,
    pub description_mode: DescriptionMode,
    /// Description compiler executable
    pub xacro: String,
    /// Rviz layout, relative to the package share directory
    pub rviz_config: PathBuf,
    /// Optional package probed for the interactive joint-state publisher
    pub gui_package: String,
    pub joint_states: FallbackJointStates,
    pub startup_delay_secs: u32,
    pub startup_message: String,
    pub output: OutputMode,
}

/// Static joint state published when the GUI publisher is not installed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackJointStates {
    pub topic: String,
    pub rate_hz: u32,
    pub frame_id: String,
    pub joints: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            package: "Articubot_CT".to_string(),
            description_file: PathBuf::from("description/robot.urdf.xacro"),
            description_mode: DescriptionMode::Deferred,
            xacro: "xacro".to_string(),
            rviz_config: PathBuf::from("rviz/display.rviz"),
            gui_package: "joint_state_publisher_gui".to_string(),
            joint_states: FallbackJointStates::default(),
            startup_delay_secs: 2,
            startup_message: "Waiting for nodes to start...".to_string(),
            output: OutputMode::Screen,
        }
    }
}

impl Default for FallbackJointStates {
    fn default() -> Self {
        Self {
            topic: "/joint_states".to_string(),
            rate_hz: 10,
            frame_id: "world".to_string(),
            joints: vec!["joint1".to_string(), "joint2".to_string()],
        }
    }
}

impl LaunchConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: LaunchConfig = serde_yaml::from_str(content)
            .map_err(|e| LaunchError::Config(format!("YAML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        log::debug!("Loading launch configuration from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            LaunchError::Config(message) => {
                LaunchError::Config(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    /// Reject settings no environment could satisfy
    pub fn validate(&self) -> Result<()> {
        if self.package.is_empty() {
            return Err(LaunchError::Config("package must not be empty".to_string()));
        }
        if self.gui_package.is_empty() {
            return Err(LaunchError::Config(
                "gui_package must not be empty".to_string(),
            ));
        }
        if self.description_file.is_absolute() || self.rviz_config.is_absolute() {
            return Err(LaunchError::Config(
                "description_file and rviz_config must be relative to the package share directory"
                    .to_string(),
            ));
        }
        if self.joint_states.rate_hz == 0 {
            return Err(LaunchError::Config(
                "joint_states.rate_hz must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
