//! Maps a terminal submission outcome to the caller-facing response.

use crate::{BridgeError, Outcome};
use bridge_types::AdapterResponse;

/// Builds the response for `job_id`. Never fails.
pub fn encode(job_id: &str, outcome: &Outcome) -> AdapterResponse {
	match outcome {
		Outcome::Confirmed(receipt) => AdapterResponse::success(job_id, receipt.raw_status.clone()),
		Outcome::Failed(error) => AdapterResponse::failure(job_id, error.to_string()),
	}
}

/// Serializes a response body.
pub fn to_json(response: &AdapterResponse) -> Result<Vec<u8>, BridgeError> {
	serde_json::to_vec(response).map_err(|e| BridgeError::EncodingFailure(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use bridge_ledger::LedgerError;
	use bridge_types::Receipt;

	#[test]
	fn test_encode_receipt() {
		let outcome = Outcome::Confirmed(Receipt::from_raw_status("SUCCESS"));
		let response = encode("job-1", &outcome);
		assert_eq!(response, AdapterResponse::success("job-1", "SUCCESS"));
		assert_eq!(
			to_json(&response).unwrap(),
			br#"{"jobRunID":"job-1","data":"SUCCESS"}"#
		);
	}

	#[test]
	fn test_encode_failed_receipt_keeps_raw_status() {
		let outcome = Outcome::Confirmed(Receipt::from_raw_status("INVALID_TOPIC_ID"));
		let response = encode("job-1", &outcome);
		assert_eq!(response.data.as_deref(), Some("INVALID_TOPIC_ID"));
		assert!(response.error.is_none());
	}

	#[test]
	fn test_encode_error() {
		let outcome = Outcome::Failed(BridgeError::Ledger(LedgerError::SubmissionFailed(
			"BUSY".to_string(),
		)));
		let response = encode("job-1", &outcome);
		assert_eq!(response.job_run_id, "job-1");
		assert!(response.data.is_none());
		assert_eq!(response.error.as_deref(), Some("Submission failed: BUSY"));
		assert_eq!(
			to_json(&response).unwrap(),
			br#"{"jobRunID":"job-1","error":"Submission failed: BUSY"}"#
		);
	}
}
