//! Error types for rsp_launch

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Package '{0}' not found. Ensure the package is installed and sourced.")]
    PackageNotFound(String),

    #[error("Robot description not found: {}", .0.display())]
    DescriptionNotFound(PathBuf),

    #[error("Invalid robot description from {file}: {message}")]
    InvalidDescription { file: String, message: String },

    #[error("Invalid value '{value}' for launch argument '{name}' (expected one of: {expected})")]
    InvalidArgument {
        name: String,
        value: String,
        expected: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Substitution error: {0}")]
    Substitution(#[from] SubstitutionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Error, Debug)]
pub enum SubstitutionError {
    #[error("Undefined variable: '{0}'. Did you forget to declare it as a launch argument?")]
    UndefinedVariable(String),

    #[error("Invalid substitution: {0}")]
    InvalidSubstitution(String),

    #[error("Command execution failed: {0}")]
    CommandFailed(String),
}

pub type Result<T> = std::result::Result<T, LaunchError>;
