//! Configuration loading for the bridge service.
//!
//! Configuration is read once at startup from a TOML, JSON or YAML file.
//! `${VAR}` placeholders are substituted from the environment before
//! parsing, a fixed set of environment variables may override individual
//! settings afterwards, and the result is validated so that the process
//! fails before it starts accepting connections.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

mod types;

pub use types::*;

/// Operator account override.
pub const OPERATOR_ACCOUNT_ENV: &str = "HEDERA_ACCOUNT_ID";
/// Operator key override.
pub const OPERATOR_KEY_ENV: &str = "HEDERA_PRIVATE_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "BRIDGE_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	#[cfg(test)]
	fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<BridgeConfig, ConfigError> {
		let Some(file_path) = &self.file_path else {
			return Err(ConfigError::FileNotFound(
				"No configuration file specified".to_string(),
			));
		};

		info!("Loading configuration from {:?}", file_path);
		let mut config = self.load_from_file(file_path).await?;

		self.apply_overrides(&mut config, |name| env::var(name).ok())?;
		validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, file_path: &Path) -> Result<BridgeConfig, ConfigError> {
		let content = match tokio::fs::read_to_string(file_path).await {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(ConfigError::FileNotFound(file_path.display().to_string()));
			}
			Err(e) => return Err(e.into()),
		};

		let substituted = substitute_env_vars(&content, |name| env::var(name).ok())?;

		match file_path.extension().and_then(|s| s.to_str()) {
			Some("toml") => parse_toml(&substituted),
			Some("json") => serde_json::from_str(&substituted)
				.map_err(|e| ConfigError::ParseError(format!("Failed to parse JSON: {}", e))),
			Some("yaml") | Some("yml") => serde_yaml::from_str(&substituted)
				.map_err(|e| ConfigError::ParseError(format!("Failed to parse YAML: {}", e))),
			_ => Err(ConfigError::ParseError(format!(
				"Unsupported config format: {}",
				file_path.display()
			))),
		}
	}

	fn apply_overrides<F>(&self, config: &mut BridgeConfig, lookup: F) -> Result<(), ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(host) = lookup(&format!("{}HOST", self.env_prefix)) {
			debug!("Overriding listen host from environment");
			config.server.host = host;
		}

		if let Some(port) = lookup(&format!("{}HTTP_PORT", self.env_prefix)) {
			debug!("Overriding HTTP port from environment");
			config.server.port = port
				.parse()
				.map_err(|e| ConfigError::ValidationError(format!("Invalid HTTP port: {}", e)))?;
		}

		if let Some(account) = lookup(OPERATOR_ACCOUNT_ENV) {
			debug!("Overriding operator account from environment");
			config.ledger.operator_account_id = account;
		}

		if let Some(key) = lookup(OPERATOR_KEY_ENV) {
			debug!("Overriding operator key from environment");
			config.ledger.operator_key = key;
		}

		Ok(())
	}
}

/// Parses a TOML document without environment handling or validation.
pub fn parse_toml(content: &str) -> Result<BridgeConfig, ConfigError> {
	toml::from_str(content).map_err(|e| ConfigError::ParseError(format!("Failed to parse TOML: {}", e)))
}

/// Replaces every `${VAR}` with the value returned by `lookup`.
///
/// Values are escaped for a double-quoted string, which is valid in TOML,
/// JSON and YAML alike. Placeholders therefore belong inside `"..."`.
fn substitute_env_vars<F>(content: &str, lookup: F) -> Result<String, ConfigError>
where
	F: Fn(&str) -> Option<String>,
{
	let re = regex::Regex::new(r"\$\{([^}]+)\}")
		.map_err(|e| ConfigError::ParseError(e.to_string()))?;

	let mut values = HashMap::new();
	for cap in re.captures_iter(content) {
		let var_name = &cap[1];
		let value =
			lookup(var_name).ok_or_else(|| ConfigError::EnvVarNotFound(var_name.to_string()))?;
		values.insert(var_name.to_string(), escape_quoted(&value));
	}

	let result = re.replace_all(content, |cap: &regex::Captures| {
		values.get(&cap[1]).cloned().unwrap_or_default()
	});

	Ok(result.into_owned())
}

fn escape_quoted(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'\\' => escaped.push_str("\\\\"),
			'"' => escaped.push_str("\\\""),
			'\n' => escaped.push_str("\\n"),
			'\r' => escaped.push_str("\\r"),
			'\t' => escaped.push_str("\\t"),
			c => escaped.push(c),
		}
	}
	escaped
}

/// Checks everything that would otherwise only fail on the first request.
pub fn validate_config(config: &BridgeConfig) -> Result<(), ConfigError> {
	config.ledger.operator().map_err(|e| {
		ConfigError::ValidationError(format!("Invalid operator account id: {}", e))
	})?;

	if config.ledger.operator_key.trim().is_empty() {
		return Err(ConfigError::ValidationError(
			"Operator key must not be empty".to_string(),
		));
	}

	match &config.ledger.client {
		LedgerClientConfig::Relay(relay) => {
			if !(relay.url.starts_with("http://") || relay.url.starts_with("https://")) {
				return Err(ConfigError::ValidationError(format!(
					"Relay URL must start with http:// or https://, got {}",
					relay.url
				)));
			}
			if relay.poll_interval_ms == 0 {
				return Err(ConfigError::ValidationError(
					"Relay poll_interval_ms must be greater than zero".to_string(),
				));
			}
			if relay.receipt_timeout_secs == 0 || relay.request_timeout_secs == 0 {
				return Err(ConfigError::ValidationError(
					"Relay timeouts must be greater than zero".to_string(),
				));
			}
		}
		LedgerClientConfig::Memory(memory) => {
			if memory.max_message_size == 0 {
				return Err(ConfigError::ValidationError(
					"Memory max_message_size must be greater than zero".to_string(),
				));
			}
			for topic in &memory.topics {
				topic.parse::<bridge_types::TopicId>().map_err(|e| {
					ConfigError::ValidationError(format!("Invalid memory topic {}: {}", topic, e))
				})?;
			}
		}
	}

	Ok(())
}
