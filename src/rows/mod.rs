use std::collections::HashMap;
use std::io::Read;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::helpers::{RunnerError, TemplateProcessor};
use crate::messages::MessageList;
use crate::template::Template;

/// One record of the values table, keyed by column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
	number: usize,
	fields: Vec<(String, String)>,
}

impl Row {
	pub fn new(number: usize, fields: Vec<(String, String)>) -> Self {
		Row { number, fields }
	}

	/// 1-based position among the data rows; the header is not counted.
	pub fn number(&self) -> usize {
		self.number
	}

	#[cfg(test)]
	pub fn get(&self, column: &str) -> Option<&str> {
		self.fields
			.iter()
			.rev()
			.find(|(name, _)| name == column)
			.map(|(_, value)| value.as_str())
	}

	pub fn to_replacements(&self) -> HashMap<String, String> {
		self.fields.iter().cloned().collect()
	}
}

impl Serialize for Row {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.fields.len()))?;
		for (name, value) in &self.fields {
			map.serialize_entry(name, value)?;
		}
		map.end()
	}
}

/// Lazily reads CSV records as rows. Stops for good after the first error.
pub struct RowReader<R: Read> {
	reader: csv::Reader<R>,
	headers: csv::StringRecord,
	count: usize,
	done: bool,
}

impl<R: Read> RowReader<R> {
	pub fn from_reader(rdr: R) -> Result<Self, RunnerError> {
		let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(rdr);
		let headers = reader.headers()?.clone();
		Ok(RowReader { reader, headers, count: 0, done: false })
	}

	pub fn has_column(&self, column: &str) -> bool {
		self.headers.iter().any(|name| name == column)
	}
}

impl<R: Read> Iterator for RowReader<R> {
	type Item = Result<Row, RunnerError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}
		let mut record = csv::StringRecord::new();
		match self.reader.read_record(&mut record) {
			Ok(true) => {
				self.count += 1;
				let fields = self
					.headers
					.iter()
					.zip(record.iter())
					.map(|(name, value)| (name.to_string(), value.to_string()))
					.collect();
				Some(Ok(Row::new(self.count, fields)))
			},
			Ok(false) => {
				self.done = true;
				None
			},
			Err(err) => {
				self.done = true;
				Some(Err(err.into()))
			},
		}
	}
}

#[derive(Debug)]
pub struct Expanded {
	pub row: Row,
	pub messages: MessageList,
}

/// Renders the template once per row, in row order.
pub struct Expander<'t, I> {
	template: &'t Template,
	rows: I,
	strict: bool,
}

impl<'t, I> Expander<'t, I>
where
	I: Iterator<Item = Result<Row, RunnerError>>,
{
	pub fn new(template: &'t Template, rows: I, strict: bool) -> Self {
		Expander { template, rows, strict }
	}

	fn expand(&self, row: Row) -> Result<Expanded, RunnerError> {
		let processor = TemplateProcessor::with_replacements(row.to_replacements());
		let (messages, unresolved) = self.template.render(&processor);
		if let Some(placeholder) = unresolved.first() {
			if self.strict {
				return Err(RunnerError::Unresolved { row: row.number(), placeholder: placeholder.clone() });
			}
			debug!(row = row.number(), ?unresolved, "placeholders left as-is");
		}
		Ok(Expanded { row, messages })
	}
}

impl<'t, I> Iterator for Expander<'t, I>
where
	I: Iterator<Item = Result<Row, RunnerError>>,
{
	type Item = Result<Expanded, RunnerError>;

	fn next(&mut self) -> Option<Self::Item> {
		let row = self.rows.next()?;
		Some(row.and_then(|row| self.expand(row)))
	}
}
