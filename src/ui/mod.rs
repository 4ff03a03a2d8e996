mod cli;

pub use cli::{Args, Cli, MenuChoice};
