use std::io::ErrorKind;
use std::path::Path;
use serde_derive::Deserialize;
use tracing::debug;

use crate::helpers::{self, RunnerError};

pub const APP_NAME: &str = "prompt-runner";

/// Output defaults read from `config.json` in the user's config directory.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
	pub strict: bool,
	pub pretty: bool,
	pub print_values: bool,
}

impl Settings {
	/// An explicit path must exist. A missing default config file means defaults.
	pub fn load(explicit: Option<&Path>) -> Result<Self, RunnerError> {
		if let Some(path) = explicit {
			return helpers::read_from_json(path);
		}
		match helpers::config_load::<Settings>(APP_NAME, "config") {
			Ok(settings) => Ok(settings),
			Err(RunnerError::Io(err)) if err.kind() == ErrorKind::NotFound => {
				debug!("no config file, using defaults");
				Ok(Settings::default())
			},
			Err(err) => Err(err),
		}
	}

	/// Flags given on the command line switch options on, never off.
	pub fn with_flags(self, strict: bool, pretty: bool, print_values: bool) -> Self {
		Settings {
			strict: self.strict || strict,
			pretty: self.pretty || pretty,
			print_values: self.print_values || print_values,
		}
	}
}
