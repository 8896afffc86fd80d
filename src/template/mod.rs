use tracing::debug;

use crate::helpers::{RunnerError, TemplateProcessor};
use crate::messages::{Message, MessageList};
use crate::source::Source;

/// A validated prompt template. Placeholders live inside message contents
/// and are only ever substituted there.
#[derive(Debug, Clone)]
pub struct Template {
	messages: MessageList,
}

impl Template {
	pub fn parse(text: &str) -> Result<Self, RunnerError> {
		let messages = MessageList::from_json(text).map_err(RunnerError::InvalidTemplate)?;
		Ok(Template { messages })
	}

	pub async fn load(arg: &str, client: &reqwest::Client) -> Result<Self, RunnerError> {
		let source = Source::classify_template(arg);
		let text = source.read_to_string(client).await?;
		let template = Self::parse(&text)?;
		debug!(messages = template.messages().len(), "prompt template loaded");
		Ok(template)
	}

	pub fn messages(&self) -> &MessageList {
		&self.messages
	}

	/// Distinct placeholder names, in order of first appearance.
	pub fn placeholders(&self) -> Vec<String> {
		let (_, names) = self.render(&TemplateProcessor::new());
		names
	}

	/// Returns the substituted messages and any placeholders left unresolved.
	pub fn render(&self, processor: &TemplateProcessor) -> (MessageList, Vec<String>) {
		let mut unresolved: Vec<String> = Vec::new();
		let messages = self
			.messages
			.iter()
			.map(|message| {
				let expansion = processor.process_template(message.content());
				for name in expansion.unresolved {
					if !unresolved.contains(&name) {
						unresolved.push(name);
					}
				}
				Message::new(message.role(), expansion.text)
			})
			.collect();
		(messages, unresolved)
	}
}
