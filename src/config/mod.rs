mod settings;
#[cfg(test)]
mod tests;

pub use settings::{ConfigError, Settings};
