//! Substitution types

use crate::error::SubstitutionError;
use crate::substitution::context::LaunchContext;
use std::fmt;
use std::process::Command;

/// Deferred value evaluated by the launch runner, not by the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    /// Plain text (no substitution)
    Text(String),
    /// $(var name) - Launch configuration variable
    LaunchConfiguration(String),
    /// $(command ...) - stdout of an external command
    Command(Vec<Substitution>),
}

impl Substitution {
    /// Resolve substitution to string value
    pub fn resolve(&self, context: &LaunchContext) -> Result<String, SubstitutionError> {
        match self {
            Substitution::Text(s) => Ok(s.clone()),
            Substitution::LaunchConfiguration(name) => context
                .get_configuration(name)
                .ok_or_else(|| SubstitutionError::UndefinedVariable(name.clone())),
            Substitution::Command(parts) => {
                let command_line = resolve_substitutions(parts, context)?;
                run_command(&command_line)
            }
        }
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Substitution::Text(s) => f.write_str(s),
            Substitution::LaunchConfiguration(name) => write!(f, "$(var {})", name),
            Substitution::Command(parts) => {
                f.write_str("$(command '")?;
                for part in parts {
                    write!(f, "{}", part)?;
                }
                f.write_str("')")
            }
        }
    }
}

/// Run a whitespace-separated command line and capture its stdout
fn run_command(command_line: &str) -> Result<String, SubstitutionError> {
    let mut tokens = command_line.split_whitespace();
    let program = tokens
        .next()
        .ok_or_else(|| SubstitutionError::CommandFailed("empty command".to_string()))?;

    log::debug!("Executing command substitution: {}", command_line);

    let output = Command::new(program)
        .args(tokens)
        .output()
        .map_err(|e| SubstitutionError::CommandFailed(format!("{}: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SubstitutionError::CommandFailed(format!(
            "'{}' exited with {}: {}",
            command_line,
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Resolve list of substitutions to single string
pub fn resolve_substitutions(
    subs: &[Substitution],
    context: &LaunchContext,
) -> Result<String, SubstitutionError> {
    let mut result = String::new();
    for sub in subs {
        result.push_str(&sub.resolve(context)?);
    }
    Ok(result)
}

/// Render a substitution list in launch-file syntax
pub fn render_substitutions(subs: &[Substitution]) -> String {
    subs.iter().map(|s| s.to_string()).collect()
}
