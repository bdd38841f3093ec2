//! Inputs read from the workspace.

pub mod source;
