pub mod cli;
pub mod config;

pub use cli::{Cli, Commands, InstanceArgs, Method, SolveArgs};
pub use config::UcpConfig;
