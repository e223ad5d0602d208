//! rsp_launch library
//!
//! Generates the launch description for a robot model bringup:
//! `robot_state_publisher` fed by a xacro-compiled model, a joint-state source,
//! and rviz2. The description is handed to an external launch runner; nothing
//! here starts processes.

pub mod actions;
pub mod ament;
pub mod config;
pub mod description;
pub mod error;
pub mod joint_state;
pub mod orchestrator;
pub mod params;
pub mod record;
pub mod substitution;

use actions::resolve_arguments;
use ament::{AmentIndex, LocalFs};
use config::LaunchConfig;
use description::XacroCompiler;
use error::Result;
use orchestrator::Orchestrator;
use record::LaunchDescription;
use std::collections::HashMap;
use substitution::LaunchContext;

/// Assemble the launch description against the sourced ROS environment.
pub fn generate_launch_description(config: &LaunchConfig) -> Result<LaunchDescription> {
    let packages = AmentIndex::from_env();
    let compiler = XacroCompiler::new(config.xacro.as_str());
    Orchestrator::new(config, &packages, &LocalFs, &compiler).assemble()
}

/// Resolve the description's declared arguments against caller overrides.
pub fn launch_context(
    description: &LaunchDescription,
    overrides: &HashMap<String, String>,
) -> Result<LaunchContext> {
    let declarations: Vec<_> = description.declared_arguments().collect();
    let configurations = resolve_arguments(&declarations, overrides)?;
    Ok(LaunchContext::from_configurations(configurations))
}
