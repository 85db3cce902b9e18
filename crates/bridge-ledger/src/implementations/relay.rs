//! Ledger client backed by a signing relay.
//!
//! The relay owns the SDK session for one network and operator. This client
//! forwards topic messages to it over HTTP and polls for the resulting
//! receipt until the network reports a final status.

use crate::{LedgerError, LedgerInterface};
use async_trait::async_trait;
use bridge_config::{Network, RelayConfig};
use bridge_types::{AccountId, PendingTransaction, Receipt, TopicId};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
struct SubmitMessageRequest<'a> {
	network: String,
	operator_account_id: String,
	/// Hex-encoded message bytes
	message: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubmitMessageResponse {
	transaction_id: String,
}

#[derive(Debug, Deserialize)]
struct ReceiptResponse {
	status: String,
	#[serde(default)]
	topic_sequence_number: Option<u64>,
}

pub struct RelayLedger {
	client: reqwest::Client,
	base_url: String,
	network: Network,
	operator: AccountId,
	operator_key: String,
	receipt_timeout: Duration,
	poll_interval: Duration,
}

impl RelayLedger {
	pub fn new(
		config: &RelayConfig,
		network: Network,
		operator: AccountId,
		operator_key: String,
	) -> Result<Self, LedgerError> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(config.request_timeout_secs))
			.build()
			.map_err(|e| LedgerError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			base_url: config.url.trim_end_matches('/').to_string(),
			network,
			operator,
			operator_key,
			receipt_timeout: Duration::from_secs(config.receipt_timeout_secs),
			poll_interval: Duration::from_millis(config.poll_interval_ms),
		})
	}

	pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
		self.receipt_timeout = timeout;
		self
	}

	pub fn with_poll_interval(mut self, interval: Duration) -> Self {
		self.poll_interval = interval;
		self
	}

	/// One receipt lookup. `Ok(None)` means the relay has nothing yet.
	async fn fetch_receipt(
		&self,
		pending: &PendingTransaction,
	) -> Result<Option<Receipt>, FetchError> {
		let url = format!(
			"{}/api/v1/transactions/{}/receipt",
			self.base_url, pending.transaction_id
		);

		let response = self
			.client
			.get(&url)
			.bearer_auth(&self.operator_key)
			.send()
			.await
			.map_err(|e| FetchError::Transient(e.to_string()))?;

		let status = response.status();
		if status == StatusCode::NOT_FOUND {
			return Ok(None);
		}
		if status.is_server_error() {
			return Err(FetchError::Transient(format!("relay returned {}", status)));
		}
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(FetchError::Fatal(format!(
				"relay returned {}: {}",
				status, body
			)));
		}

		let body: ReceiptResponse = response
			.json()
			.await
			.map_err(|e| FetchError::Fatal(format!("invalid receipt response: {}", e)))?;

		let mut receipt =
			Receipt::from_raw_status(body.status).with_transaction_id(pending.transaction_id.clone());
		receipt.topic_sequence_number = body.topic_sequence_number;
		Ok(Some(receipt))
	}
}

enum FetchError {
	/// Worth polling again
	Transient(String),
	Fatal(String),
}

#[async_trait]
impl LedgerInterface for RelayLedger {
	fn name(&self) -> &str {
		"relay"
	}

	async fn submit_message(
		&self,
		topic_id: &TopicId,
		message: &[u8],
	) -> Result<PendingTransaction, LedgerError> {
		let url = format!("{}/api/v1/topics/{}/messages", self.base_url, topic_id);
		let encoded = hex::encode(message);
		let request = SubmitMessageRequest {
			network: self.network.to_string(),
			operator_account_id: self.operator.to_string(),
			message: &encoded,
		};

		let response = self
			.client
			.post(&url)
			.bearer_auth(&self.operator_key)
			.json(&request)
			.send()
			.await
			.map_err(|e| LedgerError::SubmissionFailed(format!("Relay request failed: {}", e)))?;

		let status = response.status();
		if status == StatusCode::PAYLOAD_TOO_LARGE {
			let body = response.text().await.unwrap_or_default();
			return Err(LedgerError::PayloadTooLarge {
				size: message.len(),
				detail: body,
			});
		}
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(LedgerError::SubmissionFailed(format!(
				"Relay rejected submission with {}: {}",
				status, body
			)));
		}

		let body: SubmitMessageResponse = response.json().await.map_err(|e| {
			LedgerError::SubmissionFailed(format!("Invalid relay response: {}", e))
		})?;

		info!(
			"Relay accepted message for topic {} as {}",
			topic_id, body.transaction_id
		);
		Ok(PendingTransaction::new(body.transaction_id))
	}

	async fn await_receipt(&self, pending: &PendingTransaction) -> Result<Receipt, LedgerError> {
		let start_time = Instant::now();
		let mut attempts = 0u32;
		let mut last_error: Option<String> = None;

		loop {
			attempts += 1;
			debug!("Attempt {} to get receipt for {}", attempts, pending);

			match self.fetch_receipt(pending).await {
				Ok(Some(receipt)) if receipt.status.is_final() => {
					info!(
						"Receipt for {} is {} after {} attempts in {}ms",
						pending,
						receipt.raw_status,
						attempts,
						start_time.elapsed().as_millis()
					);
					return Ok(receipt);
				}
				Ok(Some(receipt)) => {
					debug!("Transaction {} still {}", pending, receipt.raw_status);
				}
				Ok(None) => {
					debug!("Receipt for {} not yet available", pending);
				}
				Err(FetchError::Transient(e)) => {
					warn!("Receipt lookup for {} failed, retrying: {}", pending, e);
					last_error = Some(e);
				}
				Err(FetchError::Fatal(e)) => {
					return Err(LedgerError::ReceiptUnavailable(format!(
						"Transaction {}: {}",
						pending, e
					)));
				}
			}

			let elapsed = start_time.elapsed();
			if elapsed >= self.receipt_timeout {
				let mut message = format!(
					"Transaction {} has no final receipt after {}s",
					pending,
					self.receipt_timeout.as_secs_f64()
				);
				if let Some(e) = last_error {
					message.push_str(&format!(" (last error: {})", e));
				}
				return Err(LedgerError::ReceiptUnavailable(message));
			}

			tokio::time::sleep(self.poll_interval.min(self.receipt_timeout - elapsed)).await;
		}
	}
}
