//! Record module for the generated launch description

pub mod types;

pub use types::{
    LaunchDescription, LaunchEntity, LogRecord, NodeRecord, OutputMode, ProcessRecord,
};
