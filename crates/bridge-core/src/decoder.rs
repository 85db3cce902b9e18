//! Inbound job body decoding.
//!
//! Only the structure is checked here. The topic id is passed through
//! untouched so that the ledger client stays the single owner of its
//! parsing rules.

use crate::BridgeError;
use bridge_types::{JobRequest, SubmissionRequest};
use serde_json::value::RawValue;

pub fn decode(raw: &[u8]) -> Result<SubmissionRequest, BridgeError> {
	if raw.iter().all(u8::is_ascii_whitespace) {
		return Err(BridgeError::MalformedRequest(
			"request body is empty".to_string(),
		));
	}

	let job: JobRequest = serde_json::from_slice(raw)
		.map_err(|e| BridgeError::MalformedRequest(format!("invalid JSON body: {}", e)))?;

	let data = job
		.data
		.ok_or_else(|| BridgeError::MalformedRequest("missing field `Data`".to_string()))?;

	let topic_id = data.topic_id.ok_or_else(|| {
		BridgeError::MalformedRequest("missing field `Data.HederaTopicId`".to_string())
	})?;

	let result = data
		.result
		.ok_or_else(|| BridgeError::MalformedRequest("missing field `Data.Result`".to_string()))?;

	Ok(SubmissionRequest {
		job_id: job.id.unwrap_or_default(),
		topic_id,
		payload: payload_bytes(&result)?,
	})
}

/// Best-effort job id for correlating a body that failed to decode.
pub fn recover_job_id(raw: &[u8]) -> Option<String> {
	let value: serde_json::Value = serde_json::from_slice(raw).ok()?;
	value.get("Id")?.as_str().map(str::to_string)
}

/// A JSON string contributes its contents; any other value its JSON text exactly as sent.
fn payload_bytes(result: &RawValue) -> Result<Vec<u8>, BridgeError> {
	let text = result.get();
	if text.starts_with('"') {
		let s: String = serde_json::from_str(text)
			.map_err(|e| BridgeError::MalformedRequest(format!("invalid `Data.Result`: {}", e)))?;
		return Ok(s.into_bytes());
	}

	Ok(text.as_bytes().to_vec())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn assert_malformed(raw: &[u8], needle: &str) {
		match decode(raw) {
			Err(BridgeError::MalformedRequest(msg)) => {
				assert!(msg.contains(needle), "{:?} does not mention {:?}", msg, needle)
			}
			other => panic!("Expected MalformedRequest, got {:?}", other),
		}
	}

	#[test]
	fn test_decode_string_result() {
		let req = decode(
			br#"{"Id":"job-1","Data":{"Result":"68656c6c6f","HederaTopicId":"0.0.1234"}}"#,
		)
		.unwrap();
		assert_eq!(req.job_id, "job-1");
		assert_eq!(req.topic_id, "0.0.1234");
		assert_eq!(req.payload, b"68656c6c6f");
	}

	#[test]
	fn test_decode_structured_result_is_forwarded_verbatim() {
		let req = decode(
			br#"{"Id":"job-2","Data":{"Result":{"z":1,"a":123456789012345678901234,"f":1.10},"HederaTopicId":"0.0.1"}}"#,
		)
		.unwrap();
		assert_eq!(req.payload, br#"{"z":1,"a":123456789012345678901234,"f":1.10}"#);
	}

	#[test]
	fn test_decode_result_keeps_inner_whitespace() {
		let req = decode(
			br#"{"Id":"job-2","Data":{"Result":[ 1, {"b" : 2.50} ],"HederaTopicId":"0.0.1"}}"#,
		)
		.unwrap();
		assert_eq!(req.payload, br#"[ 1, {"b" : 2.50} ]"#);
	}

	#[test]
	fn test_decode_numeric_result() {
		let req = decode(br#"{"Id":"j","Data":{"Result":42,"HederaTopicId":"0.0.1"}}"#).unwrap();
		assert_eq!(req.payload, b"42");
	}

	#[test]
	fn test_topic_id_is_not_validated() {
		let req = decode(br#"{"Id":"j","Data":{"Result":"x","HederaTopicId":"garbage"}}"#).unwrap();
		assert_eq!(req.topic_id, "garbage");
	}

	#[test]
	fn test_missing_id_defaults_to_empty() {
		let req = decode(br#"{"Data":{"Result":"x","HederaTopicId":"0.0.1"}}"#).unwrap();
		assert_eq!(req.job_id, "");
	}

	#[test]
	fn test_malformed_bodies() {
		assert_malformed(b"", "empty");
		assert_malformed(b"  \n", "empty");
		assert_malformed(b"{not json", "invalid JSON");
		assert_malformed(br#"{"Id":"j"}"#, "`Data`");
		assert_malformed(br#"{"Id":"j","Data":{"Result":"x"}}"#, "HederaTopicId");
		assert_malformed(br#"{"Id":"j","Data":{"HederaTopicId":"0.0.1"}}"#, "Result");
		assert_malformed(
			br#"{"Id":"j","Data":{"Result":null,"HederaTopicId":"0.0.1"}}"#,
			"Result",
		);
		assert_malformed(br#"{"Id":7,"Data":{"Result":"x","HederaTopicId":"0.0.1"}}"#, "invalid JSON");
	}

	#[test]
	fn test_recover_job_id() {
		assert_eq!(recover_job_id(br#"{"Id":"job-9"}"#).as_deref(), Some("job-9"));
		assert_eq!(recover_job_id(br#"{"Id":9}"#), None);
		assert_eq!(recover_job_id(b""), None);
	}
}
