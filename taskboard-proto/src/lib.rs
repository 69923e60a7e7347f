//! Shared task model and JSON wire format for `Taskboard`.

pub mod demo;
pub mod task;
pub mod wire;
