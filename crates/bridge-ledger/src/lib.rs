//! Ledger client adapter.
//!
//! `LedgerInterface` is the seam to the external ledger SDK: topic id
//! parsing, message submission and receipt retrieval. `LedgerService`
//! composes those three calls into the single `submit` operation used by
//! the orchestrator. One service is built at startup and shared by every
//! request, so implementations must be safe for concurrent use.

use async_trait::async_trait;
use bridge_config::{LedgerClientConfig, LedgerConfig};
use bridge_types::{PendingTransaction, Receipt, TopicId};
use thiserror::Error;
use tracing::{debug, info};

pub mod implementations {
	pub mod memory;
	pub mod relay;
}

use implementations::{memory::MemoryLedger, relay::RelayLedger};

#[derive(Debug, Error)]
pub enum LedgerError {
	#[error("Invalid topic ID {topic_id:?}: {reason}")]
	InvalidTopicId { topic_id: String, reason: String },
	#[error("Submission failed: {0}")]
	SubmissionFailed(String),
	#[error("Receipt unavailable: {0}")]
	ReceiptUnavailable(String),
	#[error("Payload too large: {size} bytes ({detail})")]
	PayloadTooLarge { size: usize, detail: String },
	#[error("Client configuration error: {0}")]
	Configuration(String),
}

/// Operations the bridge needs from a ledger SDK.
#[async_trait]
pub trait LedgerInterface: Send + Sync {
	fn name(&self) -> &str;

	/// Parses a topic id into the network's identifier format.
	fn parse_topic_id(&self, topic_id: &str) -> Result<TopicId, LedgerError> {
		topic_id
			.parse()
			.map_err(|e: bridge_types::EntityIdParseError| LedgerError::InvalidTopicId {
				topic_id: topic_id.to_string(),
				reason: e.to_string(),
			})
	}

	/// Signs and executes a topic message submission. Not idempotent.
	async fn submit_message(
		&self,
		topic_id: &TopicId,
		message: &[u8],
	) -> Result<PendingTransaction, LedgerError>;

	/// Waits for the finality receipt of an executed transaction.
	async fn await_receipt(&self, pending: &PendingTransaction) -> Result<Receipt, LedgerError>;
}

pub struct LedgerService {
	client: Box<dyn LedgerInterface>,
}

impl LedgerService {
	pub fn new(client: Box<dyn LedgerInterface>) -> Self {
		Self { client }
	}

	pub fn client_name(&self) -> &str {
		self.client.name()
	}

	/// Submits `payload` to `topic_id` and waits for its receipt.
	///
	/// Each call is exactly one network submission. Resubmitting after an
	/// ambiguous failure may record the message twice.
	pub async fn submit(&self, topic_id: &str, payload: &[u8]) -> Result<Receipt, LedgerError> {
		let topic = self.client.parse_topic_id(topic_id)?;

		debug!(
			"Submitting {} byte message to topic {} via {}",
			payload.len(),
			topic,
			self.client.name()
		);
		let pending = self.client.submit_message(&topic, payload).await?;

		debug!("Transaction {} accepted, awaiting receipt", pending);
		let receipt = self.client.await_receipt(&pending).await?;

		if receipt.raw_status.is_empty() {
			return Err(LedgerError::ReceiptUnavailable(format!(
				"Receipt for transaction {} carries no status",
				pending
			)));
		}

		info!(
			"Transaction {} on topic {} reached {}",
			pending, topic, receipt.raw_status
		);
		Ok(receipt)
	}
}

/// Builds the ledger service selected by configuration.
pub fn create_ledger_service(config: &LedgerConfig) -> Result<LedgerService, LedgerError> {
	let operator = config
		.operator()
		.map_err(|e| LedgerError::Configuration(format!("Invalid operator account: {}", e)))?;

	let client: Box<dyn LedgerInterface> = match &config.client {
		LedgerClientConfig::Relay(relay) => Box::new(RelayLedger::new(
			relay,
			config.network,
			operator,
			config.operator_key.clone(),
		)?),
		LedgerClientConfig::Memory(memory) => Box::new(MemoryLedger::new(memory, operator)?),
	};

	info!(
		"Ledger client {} ready for {} with operator {}",
		client.name(),
		config.network,
		operator
	);
	Ok(LedgerService::new(client))
}
