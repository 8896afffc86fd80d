use std::fs::{self, File};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

use crate::helpers::{self, RunnerError};

/// Where a command line argument's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
	Url(Url),
	File(PathBuf),
	Inline(String),
}

fn remote_url(arg: &str) -> Option<Url> {
	Url::parse(arg)
		.ok()
		.filter(|url| matches!(url.scheme(), "http" | "https"))
}

impl Source {
	/// Only arguments ending in `.json` are looked up remotely or on disk.
	/// Anything else, and any `.json` argument that is neither an http(s)
	/// URL nor an existing file, is the template text itself.
	pub fn classify_template(arg: &str) -> Self {
		if !arg.ends_with(".json") {
			return Source::Inline(arg.to_string());
		}
		if let Some(url) = remote_url(arg) {
			return Source::Url(url);
		}
		if Path::new(arg).is_file() {
			return Source::File(PathBuf::from(arg));
		}
		warn!(argument = %arg, "ends in .json but is neither an http(s) URL nor a file, using it as inline JSON");
		Source::Inline(arg.to_string())
	}

	/// http(s) URLs are fetched and `file:` URLs name a local path. Anything
	/// else is a path as given.
	pub fn classify_values(arg: &str) -> Self {
		if let Some(url) = remote_url(arg) {
			return Source::Url(url);
		}
		match Url::parse(arg) {
			Ok(url) if url.scheme() == "file" => match url.to_file_path() {
				Ok(path) => Source::File(path),
				Err(()) => Source::File(PathBuf::from(arg)),
			},
			_ => Source::File(PathBuf::from(arg)),
		}
	}

	pub async fn read_to_string(&self, client: &reqwest::Client) -> Result<String, RunnerError> {
		match self {
			Source::Url(url) => {
				debug!(%url, "fetching");
				helpers::fetch_text(client, url).await
			},
			Source::File(path) => {
				debug!(path = %path.display(), "reading");
				Ok(fs::read_to_string(path)?)
			},
			Source::Inline(text) => Ok(text.clone()),
		}
	}

	/// Opens the source for streaming. Remote bodies are fetched in full first.
	pub async fn open(&self, client: &reqwest::Client) -> Result<Box<dyn Read>, RunnerError> {
		match self {
			Source::File(path) => {
				debug!(path = %path.display(), "opening");
				Ok(Box::new(File::open(path)?))
			},
			_ => {
				let text = self.read_to_string(client).await?;
				Ok(Box::new(Cursor::new(text.into_bytes())))
			},
		}
	}
}
