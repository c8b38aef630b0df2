//! Parameterized SQL fragments.
//!
//! A [`Fragment`] is an ordered list of SQL text segments interleaved with bound parameters.
//! Placeholders are only assigned when a fragment is rendered, so fragments can be composed in any
//! order without renumbering: the n-th parameter in text order always becomes `$n`.

use serde::Serialize;

/// A value bound to a positional placeholder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
	Text(String),
	TextArray(Vec<String>),
	Bool(bool),
	Int(i64),
}
impl From<String> for SqlParam {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}
impl From<&str> for SqlParam {
	fn from(value: &str) -> Self {
		Self::Text(value.to_string())
	}
}
impl From<Vec<String>> for SqlParam {
	fn from(value: Vec<String>) -> Self {
		Self::TextArray(value)
	}
}
impl From<bool> for SqlParam {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}
impl From<i64> for SqlParam {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
	Sql(String),
	Param(SqlParam),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fragment {
	segments: Vec<Segment>,
}
impl Fragment {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn sql(text: impl AsRef<str>) -> Self {
		let mut fragment = Self::new();

		fragment.push(text);

		fragment
	}

	/// Joins fragments with `separator`; `None` when there is nothing to join.
	pub fn join<I>(fragments: I, separator: &str) -> Option<Self>
	where
		I: IntoIterator<Item = Fragment>,
	{
		let mut out: Option<Self> = None;

		for fragment in fragments {
			match out.as_mut() {
				Some(acc) => {
					acc.push(separator);
					acc.push_fragment(fragment);
				},
				None => out = Some(fragment),
			}
		}

		out
	}

	pub fn push(&mut self, text: impl AsRef<str>) -> &mut Self {
		let text = text.as_ref();

		if text.is_empty() {
			return self;
		}

		match self.segments.last_mut() {
			Some(Segment::Sql(last)) => last.push_str(text),
			_ => self.segments.push(Segment::Sql(text.to_string())),
		}

		self
	}

	pub fn push_bind(&mut self, param: impl Into<SqlParam>) -> &mut Self {
		self.segments.push(Segment::Param(param.into()));

		self
	}

	pub fn push_fragment(&mut self, other: Fragment) -> &mut Self {
		for segment in other.segments {
			match segment {
				Segment::Sql(text) => {
					self.push(text);
				},
				Segment::Param(param) => {
					self.push_bind(param);
				},
			}
		}

		self
	}

	pub fn text(mut self, text: impl AsRef<str>) -> Self {
		self.push(text);

		self
	}

	pub fn bind(mut self, param: impl Into<SqlParam>) -> Self {
		self.push_bind(param);

		self
	}

	pub fn append(mut self, other: Fragment) -> Self {
		self.push_fragment(other);

		self
	}

	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	pub fn params(&self) -> impl Iterator<Item = &SqlParam> {
		self.segments.iter().filter_map(|segment| match segment {
			Segment::Param(param) => Some(param),
			Segment::Sql(_) => None,
		})
	}

	pub fn param_count(&self) -> usize {
		self.params().count()
	}

	/// Renders the text with `$1..$n` placeholders in segment order.
	pub fn render(&self) -> String {
		let mut out = String::new();
		let mut index = 0_usize;

		for segment in &self.segments {
			match segment {
				Segment::Sql(text) => out.push_str(text),
				Segment::Param(_) => {
					index += 1;

					out.push('$');
					out.push_str(&index.to_string());
				},
			}
		}

		out
	}
}

/// A compiled statement ready to hand to the executor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Statement {
	sql: String,
	params: Vec<SqlParam>,
	#[serde(skip)]
	segments: Vec<Segment>,
}
impl Statement {
	pub fn new(fragment: Fragment) -> Self {
		let sql = fragment.render();
		let params = fragment.params().cloned().collect();

		Self { sql, params, segments: fragment.segments }
	}

	pub fn sql(&self) -> &str {
		&self.sql
	}

	pub fn params(&self) -> &[SqlParam] {
		&self.params
	}

	/// Raw segments, for executors that assign placeholders themselves.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}
}
