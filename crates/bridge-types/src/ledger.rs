//! Receipt model returned by ledger clients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Finality status of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptStatus {
	Success,
	Pending,
	Failed,
}

impl ReceiptStatus {
	/// Classifies a raw network status code.
	pub fn from_raw(raw: &str) -> Self {
		match raw {
			"SUCCESS" => Self::Success,
			"" | "UNKNOWN" | "PENDING" => Self::Pending,
			_ => Self::Failed,
		}
	}

	pub fn is_final(&self) -> bool {
		!matches!(self, Self::Pending)
	}
}

impl fmt::Display for ReceiptStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Success => write!(f, "SUCCESS"),
			Self::Pending => write!(f, "PENDING"),
			Self::Failed => write!(f, "FAILED"),
		}
	}
}

/// The network's acknowledgment of finality for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
	pub status: ReceiptStatus,
	/// Status code exactly as reported by the network.
	pub raw_status: String,
	pub transaction_id: Option<String>,
	pub topic_sequence_number: Option<u64>,
}

impl Receipt {
	pub fn from_raw_status(raw_status: impl Into<String>) -> Self {
		let raw_status = raw_status.into();
		Self {
			status: ReceiptStatus::from_raw(&raw_status),
			raw_status,
			transaction_id: None,
			topic_sequence_number: None,
		}
	}

	pub fn with_transaction_id(mut self, transaction_id: impl Into<String>) -> Self {
		self.transaction_id = Some(transaction_id.into());
		self
	}

	pub fn with_sequence_number(mut self, sequence_number: u64) -> Self {
		self.topic_sequence_number = Some(sequence_number);
		self
	}
}

/// A transaction accepted for execution whose receipt has not been fetched yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
	pub transaction_id: String,
}

impl PendingTransaction {
	pub fn new(transaction_id: impl Into<String>) -> Self {
		Self {
			transaction_id: transaction_id.into(),
		}
	}
}

impl fmt::Display for PendingTransaction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.transaction_id)
	}
}
