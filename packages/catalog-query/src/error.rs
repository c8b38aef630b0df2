pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
	#[error("Invalid filter {field}: {message}")]
	InvalidFilter { field: &'static str, message: String },
}
impl Error {
	pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
		Self::InvalidFilter { field, message: message.into() }
	}
}
