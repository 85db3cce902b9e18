//! In-process simulated consensus service.
//!
//! Useful for local runs and tests: messages are ordered per topic and
//! receipts become available as soon as a submission is accepted.

use crate::{LedgerError, LedgerInterface};
use async_trait::async_trait;
use bridge_config::MemoryConfig;
use bridge_types::{AccountId, PendingTransaction, Receipt, TopicId};
use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

pub struct MemoryLedger {
	operator: AccountId,
	max_message_size: usize,
	/// `None` accepts every well-formed topic.
	topics: Option<HashSet<TopicId>>,
	/// Last sequence number assigned per topic
	sequences: DashMap<TopicId, u64>,
	receipts: DashMap<String, Receipt>,
	last_valid_start: AtomicI64,
}

impl MemoryLedger {
	pub fn new(config: &MemoryConfig, operator: AccountId) -> Result<Self, LedgerError> {
		let topics = if config.topics.is_empty() {
			None
		} else {
			let parsed = config
				.topics
				.iter()
				.map(|t| {
					t.parse::<TopicId>().map_err(|e| {
						LedgerError::Configuration(format!("Invalid topic {}: {}", t, e))
					})
				})
				.collect::<Result<HashSet<_>, _>>()?;
			Some(parsed)
		};

		Ok(Self {
			operator,
			max_message_size: config.max_message_size,
			topics,
			sequences: DashMap::new(),
			receipts: DashMap::new(),
			last_valid_start: AtomicI64::new(0),
		})
	}

	/// Unique, strictly increasing transaction id in `account@seconds.nanos` form.
	fn next_transaction_id(&self) -> String {
		let now = Utc::now().timestamp_nanos_opt().unwrap_or_default();
		let previous = self
			.last_valid_start
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
				Some(now.max(last + 1))
			})
			.unwrap_or(now);
		let valid_start = now.max(previous + 1);

		format!(
			"{}@{}.{:09}",
			self.operator,
			valid_start.div_euclid(1_000_000_000),
			valid_start.rem_euclid(1_000_000_000)
		)
	}
}

#[async_trait]
impl LedgerInterface for MemoryLedger {
	fn name(&self) -> &str {
		"memory"
	}

	async fn submit_message(
		&self,
		topic_id: &TopicId,
		message: &[u8],
	) -> Result<PendingTransaction, LedgerError> {
		if message.len() > self.max_message_size {
			return Err(LedgerError::PayloadTooLarge {
				size: message.len(),
				detail: format!("limit is {} bytes", self.max_message_size),
			});
		}

		if let Some(topics) = &self.topics {
			if !topics.contains(topic_id) {
				return Err(LedgerError::SubmissionFailed(format!(
					"INVALID_TOPIC_ID: topic {} does not exist",
					topic_id
				)));
			}
		}

		let transaction_id = self.next_transaction_id();
		let sequence_number = {
			let mut entry = self.sequences.entry(*topic_id).or_default();
			*entry += 1;
			*entry
		};

		debug!(
			"Topic {} sequenced message {} as {}",
			topic_id, sequence_number, transaction_id
		);

		self.receipts.insert(
			transaction_id.clone(),
			Receipt::from_raw_status("SUCCESS")
				.with_transaction_id(transaction_id.clone())
				.with_sequence_number(sequence_number),
		);

		Ok(PendingTransaction::new(transaction_id))
	}

	async fn await_receipt(&self, pending: &PendingTransaction) -> Result<Receipt, LedgerError> {
		self.receipts
			.remove(&pending.transaction_id)
			.map(|(_, receipt)| receipt)
			.ok_or_else(|| {
				LedgerError::ReceiptUnavailable(format!(
					"No receipt recorded for transaction {}",
					pending.transaction_id
				))
			})
	}
}
