//! External process execution

mod subprocess;

pub use subprocess::{
    command_exists, ExecutionResult, ExecutionStatus, ProcessRunner, SystemRunner,
};
