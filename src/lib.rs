pub mod cli;
pub mod config;
pub mod filter;
pub mod parser;
pub mod schema;
pub mod source;
pub mod sql;
pub mod writer;

pub use cli::{Cli, Commands};
pub use config::DwConfig;
