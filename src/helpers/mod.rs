use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::env;
use std::sync::OnceLock;
use std::collections::HashMap;
use serde::de::DeserializeOwned;
use regex::Regex;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum RunnerError {
	#[error("IO error: {0}")]
	Io(#[from] io::Error),
	#[error("Serde error: {0}")]
	Serde(#[from] serde_json::Error),
	#[error("Invalid prompt template: {0}")]
	InvalidTemplate(#[source] serde_json::Error),
	#[error("CSV error: {0}")]
	Csv(#[from] csv::Error),
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),
	#[error("Row {row}: no value for placeholder {{{placeholder}}}")]
	Unresolved { row: usize, placeholder: String },
}

pub fn config_get_dir(name: Option<&str>) -> Result<PathBuf, io::Error> {
	let mut pb = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
		PathBuf::from(config_home)
	} else if let Ok(home) = env::var("HOME") {
		let mut config_home = PathBuf::from(home);
		config_home.push(".config");
		config_home
	} else {
		return Err(io::Error::new(ErrorKind::NotFound, "XDG_CONFIG_HOME or HOME not found"));
	};
	if let Some(app_name) = name {
		pb.push(app_name);
	}
	Ok(pb)
}

pub fn config_load<T: DeserializeOwned>(app_name: &str, config_name: &str) -> Result<T, RunnerError> {
	let mut config_file = config_get_dir(Some(app_name))?;
	config_file.push(config_name.to_string() + ".json");
	read_from_json(&config_file)
}

pub fn read_from_json<T: DeserializeOwned>(file_path: impl AsRef<Path>) -> Result<T, RunnerError> {
	let content = fs::read_to_string(file_path.as_ref())?;
	let parsed_json: T = serde_json::from_str(&content)?;
	Ok(parsed_json)
}

/// GET `url` and return the body. Non-2xx statuses are errors.
pub async fn fetch_text(client: &reqwest::Client, url: &Url) -> Result<String, RunnerError> {
	let response = client
		.get(url.clone())
		.send()
		.await?
		.error_for_status()?;
	Ok(response.text().await?)
}

/// Whether a brace group's name looks like a column reference rather than
/// literal text such as inline JSON.
pub fn is_placeholder_name(key: &str) -> bool {
	static PATTERN: OnceLock<Regex> = OnceLock::new();
	PATTERN
		.get_or_init(|| Regex::new(r"^\w[\w .-]*$").expect("placeholder pattern compiles"))
		.is_match(key)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
	Normal,
	InKey,
}

/// Result of one pass of the processor over a piece of text.
#[derive(Debug, Default, PartialEq)]
pub struct Expansion {
	pub text: String,
	/// Placeholder names with no replacement, in order of first appearance.
	pub unresolved: Vec<String>,
}

/// Replaces `{key}` tokens with values in a single pass. Replacement values
/// are copied verbatim and never scanned again.
pub struct TemplateProcessor {
	replacements: HashMap<String, String>,
}

impl TemplateProcessor {
	pub fn new() -> Self {
		Self {
			replacements: HashMap::new(),
		}
	}

	pub fn with_replacements(replacements: HashMap<String, String>) -> Self {
		Self { replacements }
	}

	#[cfg(test)]
	pub fn add_replacement(&mut self, key: String, value: String) {
		self.replacements.insert(key, value);
	}

	pub fn process_template(&self, template: &str) -> Expansion {
		let mut expansion = Expansion::default();
		let mut state = State::Normal;
		let mut current_key = String::new();

		for ch in template.chars() {
			match state {
				State::Normal => {
					if ch == '{' {
						state = State::InKey;
						current_key.clear();
					} else {
						expansion.text.push(ch);
					}
				}
				State::InKey => match ch {
					'}' => {
						self.resolve(&current_key, &mut expansion);
						state = State::Normal;
					}
					'{' => {
						// the previous brace was literal, the key starts again here
						expansion.text.push('{');
						expansion.text.push_str(&current_key);
						current_key.clear();
					}
					_ => current_key.push(ch),
				},
			}
		}

		if state == State::InKey {
			expansion.text.push('{');
			expansion.text.push_str(&current_key);
		}

		expansion
	}

	fn resolve(&self, key: &str, expansion: &mut Expansion) {
		// `{}` is always literal, even when a column has an empty header
		let replacement = if key.is_empty() { None } else { self.replacements.get(key) };
		match replacement {
			Some(replacement) => expansion.text.push_str(replacement),
			None => {
				// Key not found, output original token
				expansion.text.push('{');
				expansion.text.push_str(key);
				expansion.text.push('}');
				if is_placeholder_name(key) && !expansion.unresolved.iter().any(|k| k == key) {
					expansion.unresolved.push(key.to_string());
				}
			}
		}
	}
}
