pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<catalog_query::Error> for Error {
	fn from(err: catalog_query::Error) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}
impl From<catalog_storage::Error> for Error {
	fn from(err: catalog_storage::Error) -> Self {
		match err {
			catalog_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			catalog_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			err @ catalog_storage::Error::Decode { .. } => Self::Storage { message: err.to_string() },
		}
	}
}
