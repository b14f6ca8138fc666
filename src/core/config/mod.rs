pub(crate) mod parsing;
mod settings;
mod types;

pub(crate) use types::{ConfigError, Settings};
