//! Compiles marketplace catalog and NFT filter specifications into parameterized SQL.
//!
//! Compilation is synchronous and pure: the same filters always yield the same text and the same
//! parameters, and every user-supplied value is bound rather than spliced into the text.

pub mod catalog;
pub mod cte;
pub mod filters;
pub mod joins;
pub mod nfts;
pub mod predicates;
pub mod search;
pub mod sort;
pub mod sql;
pub mod validate;

mod error;

pub use catalog::CatalogQueryCompiler;
pub use error::{Error, Result};
pub use filters::{CatalogFilters, CatalogSortBy, Network, SortDirection};
pub use joins::JoinPlan;
pub use nfts::NftFilters;
pub use sql::{Fragment, Segment, SqlParam, Statement};
