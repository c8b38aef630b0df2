pub mod db;
pub mod executor;
pub mod models;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
