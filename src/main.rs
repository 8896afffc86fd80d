use clap::Parser;
use url::Url;
use std::path::PathBuf;
use std::io::{self, Write};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod helpers;
mod messages;
mod rows;
mod settings;
mod source;
mod template;


use helpers::RunnerError;
use rows::{Expanded, Expander, RowReader};
use settings::Settings;
use source::Source;
use template::Template;

/// Runs a prompt against an LLM server using values from a CSV file
#[derive(Parser)]
#[clap(name = "prompt-runner")]
struct Cli {
	#[clap(long)]
	/// Endpoint URL of the LLM server
	server: Url,
	#[clap(long)]
	/// JSON array of the messages sent to the LLM server with variables enclosed in curly braces;
	/// or local path or URL of a .json file containing such
	prompt_template: String,
	#[clap(long)]
	/// CSV file (local path or URL) whose column headers correspond to variables in the prompt,
	/// each row holding the values for one execution
	values: String,
	#[clap(long)]
	/// fail when a placeholder has no matching column instead of leaving it in the output
	strict: bool,
	#[clap(long)]
	/// pretty-print each rendered message list
	pretty: bool,
	#[clap(long)]
	/// print the row values after each rendered message list
	print_values: bool,
	#[clap(long)]
	/// JSON config file (default is prompt-runner/config.json in the user config directory)
	config: Option<PathBuf>,
	#[clap(short, long, action = clap::ArgAction::Count)]
	/// more logging on stderr (-v info, -vv debug); RUST_LOG takes precedence
	verbose: u8,
}

fn init_logging(verbose: u8) {
	let default_level = match verbose {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Cli::parse();
	init_logging(args.verbose);

	if let Err(e) = run(args).await {
		error!("operation failed: {}", e);
		return Err(e.into());
	}
	Ok(())
}

async fn run(args: Cli) -> Result<(), RunnerError> {
	let settings = Settings::load(args.config.as_deref())?
		.with_flags(args.strict, args.pretty, args.print_values);

	// The prompts are only rendered, nothing is sent to the server yet.
	info!(server = %args.server, "server endpoint accepted");

	let client = reqwest::Client::new();
	let template = Template::load(&args.prompt_template, &client).await?;
	if template.messages().is_empty() {
		warn!("prompt template has no messages");
	}

	let values = Source::classify_values(&args.values);
	let rows = RowReader::from_reader(values.open(&client).await?)?;
	for placeholder in template.placeholders() {
		if !rows.has_column(&placeholder) {
			warn!(%placeholder, "no column supplies this placeholder");
		}
	}

	let stdout = io::stdout();
	let mut out = stdout.lock();
	print_rows(&mut out, Expander::new(&template, rows, settings.strict), &settings)?;
	Ok(())
}

/// Writes one JSON line per rendered row, followed by the row values when
/// asked. Rows written before a failing row stay written.
fn print_rows<W, I>(out: &mut W, expanded: I, settings: &Settings) -> Result<usize, RunnerError>
where
	W: Write,
	I: Iterator<Item = Result<Expanded, RunnerError>>,
{
	let mut count = 0;
	for expanded in expanded {
		let expanded = match expanded {
			Ok(expanded) => expanded,
			Err(e) => {
				out.flush()?;
				return Err(e);
			},
		};
		let rendered = if settings.pretty {
			expanded.messages.to_json_pretty()?
		} else {
			expanded.messages.to_json()?
		};
		writeln!(out, "{}", rendered)?;
		if settings.print_values {
			writeln!(out, "{}", serde_json::to_string(&expanded.row)?)?;
		}
		count += 1;
	}
	out.flush()?;
	Ok(count)
}
