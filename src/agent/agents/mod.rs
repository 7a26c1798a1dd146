pub mod task_agent;

pub use task_agent::*;
