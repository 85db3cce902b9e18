//! Configuration types for the bridge.

use bridge_types::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Complete bridge configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
	/// HTTP listener settings
	#[serde(default)]
	pub server: ServerConfig,
	/// Ledger network, operator and client settings
	pub ledger: LedgerConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: default_host(),
			port: default_port(),
		}
	}
}

impl ServerConfig {
	pub fn bind_address(&self) -> String {
		format!("{}:{}", self.host, self.port)
	}
}

/// Target consensus network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
	#[default]
	Testnet,
	Previewnet,
	Mainnet,
}

impl fmt::Display for Network {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Network::Testnet => write!(f, "testnet"),
			Network::Previewnet => write!(f, "previewnet"),
			Network::Mainnet => write!(f, "mainnet"),
		}
	}
}

/// Ledger settings shared by every client implementation
#[derive(Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
	#[serde(default)]
	pub network: Network,
	/// Payer account, `shard.realm.num`
	pub operator_account_id: String,
	/// Secret authorizing submissions on behalf of the operator
	pub operator_key: String,
	pub client: LedgerClientConfig,
}

impl LedgerConfig {
	/// Parsed operator account. Only fails on configs that skipped validation.
	pub fn operator(&self) -> Result<AccountId, bridge_types::EntityIdParseError> {
		self.operator_account_id.parse()
	}
}

impl fmt::Debug for LedgerConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LedgerConfig")
			.field("network", &self.network)
			.field("operator_account_id", &self.operator_account_id)
			.field("operator_key", &"<redacted>")
			.field("client", &self.client)
			.finish()
	}
}

/// Ledger client implementation selection
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LedgerClientConfig {
	/// Signing relay reached over HTTP
	Relay(RelayConfig),
	/// In-process simulated consensus service
	Memory(MemoryConfig),
}

impl LedgerClientConfig {
	pub fn kind(&self) -> &'static str {
		match self {
			LedgerClientConfig::Relay(_) => "relay",
			LedgerClientConfig::Memory(_) => "memory",
		}
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
	/// Base URL of the relay, e.g. `http://127.0.0.1:7546`
	pub url: String,
	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,
	/// Upper bound on waiting for a receipt after the transaction is accepted
	#[serde(default = "default_receipt_timeout_secs")]
	pub receipt_timeout_secs: u64,
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemoryConfig {
	#[serde(default = "default_max_message_size")]
	pub max_message_size: usize,
	/// Topics that exist; empty means every well-formed topic exists
	#[serde(default)]
	pub topics: Vec<String>,
}

impl Default for MemoryConfig {
	fn default() -> Self {
		Self {
			max_message_size: default_max_message_size(),
			topics: Vec::new(),
		}
	}
}

fn default_host() -> String {
	"0.0.0.0".to_string()
}

fn default_port() -> u16 {
	8090
}

fn default_request_timeout_secs() -> u64 {
	30
}

fn default_receipt_timeout_secs() -> u64 {
	120
}

fn default_poll_interval_ms() -> u64 {
	500
}

fn default_max_message_size() -> usize {
	1024
}
