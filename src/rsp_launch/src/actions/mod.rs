//! Launch actions

pub mod declare_argument;

pub use declare_argument::{resolve_arguments, ArgumentDeclaration};
