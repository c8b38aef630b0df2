use std::cmp::Ordering;

use crate::{
	Error, Result,
	filters::{CatalogFilters, is_set},
};

pub fn validate_catalog_filters(filters: &CatalogFilters) -> Result<()> {
	if let Some(creator) = filters.creator.as_ref() {
		require_non_blank("creator", creator.values())?;
	}

	require_non_blank("contractAddresses", &filters.contract_addresses)?;
	require_non_blank("ids", &filters.ids)?;
	require_non_blank("urns", &filters.urns)?;

	validate_price_range(filters.min_price.as_deref(), filters.max_price.as_deref())?;

	if is_set(filters.only_listing) && is_set(filters.only_minting) {
		return Err(Error::invalid(
			"onlyListing",
			"onlyListing and onlyMinting select disjoint item sets and cannot be combined.",
		));
	}

	Ok(())
}

pub(crate) fn validate_price_range(min: Option<&str>, max: Option<&str>) -> Result<()> {
	if let Some(min) = min {
		require_decimal("minPrice", min)?;
	}
	if let Some(max) = max {
		require_decimal("maxPrice", max)?;
	}
	if let (Some(min), Some(max)) = (min, max)
		&& compare_decimal(min, max) == Ordering::Greater
	{
		return Err(Error::invalid("minPrice", "minPrice must not exceed maxPrice."));
	}

	Ok(())
}

pub(crate) fn require_non_blank(field: &'static str, values: &[String]) -> Result<()> {
	if values.iter().any(|value| value.trim().is_empty()) {
		return Err(Error::invalid(field, format!("{field} must not contain blank entries.")));
	}

	Ok(())
}

fn require_decimal(field: &'static str, value: &str) -> Result<()> {
	if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
		return Err(Error::invalid(
			field,
			format!("{field} must be a non-negative integer amount in wei, got {value:?}."),
		));
	}

	Ok(())
}

/// Compares two unsigned decimal strings of arbitrary length.
fn compare_decimal(a: &str, b: &str) -> Ordering {
	let a = a.trim_start_matches('0');
	let b = b.trim_start_matches('0');

	a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
	use std::cmp::Ordering;

	use super::{compare_decimal, validate_catalog_filters};
	use crate::{
		Error,
		filters::{CatalogFilters, Creator},
	};

	#[test]
	fn compares_wei_amounts_beyond_u64() {
		assert_eq!(compare_decimal("100000000000000000000000", "99"), Ordering::Greater);
		assert_eq!(compare_decimal("0010", "10"), Ordering::Equal);
		assert_eq!(compare_decimal("9", "10"), Ordering::Less);
	}

	#[test]
	fn rejects_non_numeric_price() {
		let filters = CatalogFilters { min_price: Some("1e18".to_string()), ..Default::default() };
		let err = validate_catalog_filters(&filters).expect_err("Expected price validation error.");

		assert!(matches!(err, Error::InvalidFilter { field: "minPrice", .. }), "{err}");
	}

	#[test]
	fn rejects_inverted_price_range() {
		let filters = CatalogFilters {
			min_price: Some("200".to_string()),
			max_price: Some("100".to_string()),
			..Default::default()
		};

		assert!(validate_catalog_filters(&filters).is_err());
	}

	#[test]
	fn rejects_listing_and_minting_together() {
		let filters = CatalogFilters {
			only_listing: Some(true),
			only_minting: Some(true),
			..Default::default()
		};

		assert!(validate_catalog_filters(&filters).is_err());
	}

	#[test]
	fn rejects_blank_creator_entries() {
		let filters = CatalogFilters {
			creator: Some(Creator::Many(vec!["0xa".to_string(), " ".to_string()])),
			..Default::default()
		};

		assert!(validate_catalog_filters(&filters).is_err());
	}

	#[test]
	fn empty_filters_are_valid() {
		assert!(validate_catalog_filters(&CatalogFilters::default()).is_ok());
	}
}
