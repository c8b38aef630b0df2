mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Marketplace, Postgres, Schemas, Service, Storage};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	for (label, value) in [
		("schemas.marketplace", &cfg.schemas.marketplace),
		("schemas.builder_server", &cfg.schemas.builder_server),
		("schemas.trades", &cfg.schemas.trades),
		("schemas.squid_trades", &cfg.schemas.squid_trades),
	] {
		if !is_sql_identifier(value) {
			return Err(Error::Validation {
				message: format!("{label} must be a plain SQL identifier."),
			});
		}
	}
	for (label, value) in [
		("marketplace.ethereum_offchain_marketplace", &cfg.marketplace.ethereum_offchain_marketplace),
		("marketplace.polygon_offchain_marketplace", &cfg.marketplace.polygon_offchain_marketplace),
	] {
		if !is_address(value) {
			return Err(Error::Validation {
				message: format!("{label} must be a 0x-prefixed 20-byte hex address."),
			});
		}
	}

	Ok(())
}

pub fn is_sql_identifier(value: &str) -> bool {
	let mut chars = value.chars();

	match chars.next() {
		Some(first) if first.is_ascii_alphabetic() || first == '_' =>
			chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
		_ => false,
	}
}

fn is_address(value: &str) -> bool {
	value
		.strip_prefix("0x")
		.map(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
		.unwrap_or(false)
}

fn normalize(cfg: &mut Config) {
	cfg.service.log_level = cfg.service.log_level.trim().to_string();
	cfg.schemas.marketplace = cfg.schemas.marketplace.trim().to_string();
	cfg.schemas.builder_server = cfg.schemas.builder_server.trim().to_string();
	cfg.schemas.trades = cfg.schemas.trades.trim().to_string();
	cfg.schemas.squid_trades = cfg.schemas.squid_trades.trim().to_string();
	cfg.marketplace.ethereum_offchain_marketplace =
		cfg.marketplace.ethereum_offchain_marketplace.trim().to_lowercase();
	cfg.marketplace.polygon_offchain_marketplace =
		cfg.marketplace.polygon_offchain_marketplace.trim().to_lowercase();
}
