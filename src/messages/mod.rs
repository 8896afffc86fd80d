use std::fmt;
use std::slice;
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	Assistant,
	System,
	User,
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Role::Assistant => "assistant",
			Role::System => "system",
			Role::User => "user",
		};
		f.write_str(name)
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Message {
	role: Role,
	content: String,
}

impl Message {
	pub fn new(role: Role, content: impl Into<String>) -> Self {
		Message { role, content: content.into() }
	}

	pub fn role(&self) -> Role {
		self.role
	}

	pub fn content(&self) -> &str {
		&self.content
	}
}

/// One complete prompt, serialized as a JSON array of messages.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct MessageList(Vec<Message>);

impl MessageList {
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}

	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}

	pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string_pretty(self)
	}

	pub fn iter(&self) -> slice::Iter<'_, Message> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl FromIterator<Message> for MessageList {
	fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
		MessageList(iter.into_iter().collect())
	}
}

impl<'a> IntoIterator for &'a MessageList {
	type Item = &'a Message;
	type IntoIter = slice::Iter<'a, Message>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}
