//! Scheduler job wire format and the per-request types derived from it.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Inbound job body as posted by the scheduler.
///
/// Every field is optional at this level so that missing fields can be
/// reported as a malformed request instead of a generic parse failure.
#[derive(Debug, Deserialize)]
pub struct JobRequest {
	#[serde(rename = "Id", default)]
	pub id: Option<String>,
	#[serde(rename = "Data", default)]
	pub data: Option<JobData>,
}

#[derive(Debug, Deserialize)]
pub struct JobData {
	/// Opaque job result, kept as raw JSON.
	#[serde(rename = "Result", default)]
	pub result: Option<Box<RawValue>>,
	#[serde(rename = "HederaTopicId", default)]
	pub topic_id: Option<String>,
}

/// A decoded submission, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
	pub job_id: String,
	/// Unvalidated topic identifier; parsing belongs to the ledger client.
	pub topic_id: String,
	pub payload: Vec<u8>,
}

/// Response returned to the scheduler.
///
/// Exactly one of `data` and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterResponse {
	#[serde(rename = "jobRunID")]
	pub job_run_id: String,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub data: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none", default)]
	pub error: Option<String>,
}

impl AdapterResponse {
	pub fn success(job_run_id: impl Into<String>, data: impl Into<String>) -> Self {
		Self {
			job_run_id: job_run_id.into(),
			data: Some(data.into()),
			error: None,
		}
	}

	pub fn failure(job_run_id: impl Into<String>, error: impl Into<String>) -> Self {
		Self {
			job_run_id: job_run_id.into(),
			data: None,
			error: Some(error.into()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_job_request_field_names() {
		let body = r#"{"Id":"job-1","Data":{"Result":{"a":1},"HederaTopicId":"0.0.5"}}"#;
		let job: JobRequest = serde_json::from_str(body).unwrap();
		assert_eq!(job.id.as_deref(), Some("job-1"));
		let data = job.data.unwrap();
		assert_eq!(data.result.unwrap().get(), r#"{"a":1}"#);
		assert_eq!(data.topic_id.as_deref(), Some("0.0.5"));
	}

	#[test]
	fn test_null_result_is_absent() {
		let body = r#"{"Id":"job-1","Data":{"Result":null,"HederaTopicId":"0.0.5"}}"#;
		let job: JobRequest = serde_json::from_str(body).unwrap();
		assert!(job.data.unwrap().result.is_none());
	}

	#[test]
	fn test_response_serialization() {
		let ok = AdapterResponse::success("job-1", "SUCCESS");
		assert_eq!(
			serde_json::to_string(&ok).unwrap(),
			r#"{"jobRunID":"job-1","data":"SUCCESS"}"#
		);

		let failed = AdapterResponse::failure("job-1", "boom");
		assert!(failed.data.is_none());
		assert_eq!(
			serde_json::to_string(&failed).unwrap(),
			r#"{"jobRunID":"job-1","error":"boom"}"#
		);
	}
}
