//! Per-request submission lifecycle.
//!
//! ```text
//! RECEIVED -> DECODED -> SUBMITTED -> CONFIRMED
//!     |                      |
//!     +----------------------+-----> FAILED
//! ```
//!
//! Each request gets its own `Submission`; nothing is shared between
//! requests except the ledger service. A request is submitted at most once:
//! retrying a ledger transaction can record the message twice, so retry
//! policy is left to the caller.

use crate::{decoder, encoder, BridgeError};
use bridge_ledger::LedgerService;
use bridge_types::{AdapterResponse, Receipt, SubmissionRequest};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
	Received,
	Decoded,
	Submitted,
	Confirmed,
	Failed,
}

impl SubmissionState {
	pub fn is_terminal(&self) -> bool {
		matches!(self, SubmissionState::Confirmed | SubmissionState::Failed)
	}
}

impl fmt::Display for SubmissionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			SubmissionState::Received => "RECEIVED",
			SubmissionState::Decoded => "DECODED",
			SubmissionState::Submitted => "SUBMITTED",
			SubmissionState::Confirmed => "CONFIRMED",
			SubmissionState::Failed => "FAILED",
		};
		f.write_str(name)
	}
}

/// Terminal result of one submission.
#[derive(Debug)]
pub enum Outcome {
	Confirmed(Receipt),
	Failed(BridgeError),
}

/// State of a single in-flight request.
#[derive(Debug)]
pub struct Submission {
	state: SubmissionState,
	job_id: String,
	request: Option<SubmissionRequest>,
}

impl Submission {
	pub fn new() -> Self {
		Self {
			state: SubmissionState::Received,
			job_id: String::new(),
			request: None,
		}
	}

	pub fn state(&self) -> SubmissionState {
		self.state
	}

	pub fn job_id(&self) -> &str {
		&self.job_id
	}

	fn transition(&mut self, next: SubmissionState) {
		debug_assert!(
			!self.state.is_terminal(),
			"submission already {}, cannot move to {}",
			self.state,
			next
		);
		debug!("Job {:?}: {} -> {}", self.job_id, self.state, next);
		self.state = next;
	}

	/// RECEIVED -> DECODED, or FAILED on a malformed body.
	pub fn decode(&mut self, raw: &[u8]) -> Result<(), BridgeError> {
		debug_assert_eq!(self.state, SubmissionState::Received);
		match decoder::decode(raw) {
			Ok(request) => {
				self.job_id = request.job_id.clone();
				self.request = Some(request);
				self.transition(SubmissionState::Decoded);
				Ok(())
			}
			Err(e) => {
				self.job_id = decoder::recover_job_id(raw).unwrap_or_default();
				self.transition(SubmissionState::Failed);
				Err(e)
			}
		}
	}

	/// DECODED -> SUBMITTED -> CONFIRMED | FAILED.
	pub async fn submit(&mut self, ledger: &LedgerService) -> Outcome {
		let Some(request) = self.request.take() else {
			if !self.state.is_terminal() {
				self.transition(SubmissionState::Failed);
			}
			return Outcome::Failed(BridgeError::MalformedRequest(
				"no decoded request to submit".to_string(),
			));
		};

		self.transition(SubmissionState::Submitted);
		match ledger.submit(&request.topic_id, &request.payload).await {
			Ok(receipt) => {
				self.transition(SubmissionState::Confirmed);
				Outcome::Confirmed(receipt)
			}
			Err(e) => {
				self.transition(SubmissionState::Failed);
				Outcome::Failed(e.into())
			}
		}
	}
}

impl Default for Submission {
	fn default() -> Self {
		Self::new()
	}
}

/// Drives requests from raw body to response.
#[derive(Clone)]
pub struct SubmissionOrchestrator {
	ledger: Arc<LedgerService>,
}

impl SubmissionOrchestrator {
	pub fn new(ledger: Arc<LedgerService>) -> Self {
		Self { ledger }
	}

	/// Runs one request through its lifecycle and returns the terminal outcome.
	pub async fn run(&self, raw: &[u8]) -> (String, Outcome) {
		let mut submission = Submission::new();

		let outcome = match submission.decode(raw) {
			Ok(()) => submission.submit(&self.ledger).await,
			Err(e) => Outcome::Failed(e),
		};

		(submission.job_id, outcome)
	}

	/// Runs one request and encodes its outcome. Business failures come back
	/// as a response with `error` set.
	#[instrument(skip(self, raw), fields(job_id = tracing::field::Empty))]
	pub async fn process(&self, raw: &[u8]) -> AdapterResponse {
		let (job_id, outcome) = self.run(raw).await;
		tracing::Span::current().record("job_id", job_id.as_str());

		match &outcome {
			Outcome::Confirmed(receipt) => {
				info!("Job {:?} confirmed with {}", job_id, receipt.raw_status)
			}
			Outcome::Failed(error) => warn!("Job {:?} failed: {}", job_id, error),
		}

		encoder::encode(&job_id, &outcome)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use bridge_ledger::{LedgerError, LedgerInterface};
	use bridge_types::{PendingTransaction, TopicId};
	use std::sync::atomic::{AtomicUsize, Ordering};

	const SCENARIO: &[u8] =
		br#"{"Id":"job-1","Data":{"Result":"68656c6c6f","HederaTopicId":"0.0.1234"}}"#;

	#[derive(Default)]
	struct Counters {
		parses: AtomicUsize,
		submits: AtomicUsize,
	}

	enum Behaviour {
		Succeed,
		RejectTopic,
		RejectSubmission,
	}

	struct StubLedger {
		counters: Arc<Counters>,
		behaviour: Behaviour,
	}

	#[async_trait]
	impl LedgerInterface for StubLedger {
		fn name(&self) -> &str {
			"stub"
		}

		fn parse_topic_id(&self, topic_id: &str) -> Result<TopicId, LedgerError> {
			self.counters.parses.fetch_add(1, Ordering::SeqCst);
			match self.behaviour {
				Behaviour::RejectTopic => Err(LedgerError::InvalidTopicId {
					topic_id: topic_id.to_string(),
					reason: "stub rejects every topic".to_string(),
				}),
				_ => topic_id.parse().map_err(|e: bridge_types::EntityIdParseError| {
					LedgerError::InvalidTopicId {
						topic_id: topic_id.to_string(),
						reason: e.to_string(),
					}
				}),
			}
		}

		async fn submit_message(
			&self,
			_topic_id: &TopicId,
			_message: &[u8],
		) -> Result<PendingTransaction, LedgerError> {
			let n = self.counters.submits.fetch_add(1, Ordering::SeqCst);
			match self.behaviour {
				Behaviour::RejectSubmission => {
					Err(LedgerError::SubmissionFailed("INSUFFICIENT_PAYER_BALANCE".to_string()))
				}
				_ => Ok(PendingTransaction::new(format!("tx-{}", n))),
			}
		}

		async fn await_receipt(
			&self,
			pending: &PendingTransaction,
		) -> Result<Receipt, LedgerError> {
			Ok(Receipt::from_raw_status("SUCCESS").with_transaction_id(pending.transaction_id.clone()))
		}
	}

	fn orchestrator(behaviour: Behaviour) -> (SubmissionOrchestrator, Arc<Counters>) {
		let counters = Arc::new(Counters::default());
		let ledger = StubLedger {
			counters: counters.clone(),
			behaviour,
		};
		let service = Arc::new(LedgerService::new(Box::new(ledger)));
		(SubmissionOrchestrator::new(service), counters)
	}

	#[tokio::test]
	async fn test_successful_submission() {
		let (orchestrator, counters) = orchestrator(Behaviour::Succeed);
		let response = orchestrator.process(SCENARIO).await;
		assert_eq!(response, AdapterResponse::success("job-1", "SUCCESS"));
		assert_eq!(counters.submits.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_rejected_topic_never_submits() {
		let (orchestrator, counters) = orchestrator(Behaviour::RejectTopic);
		let response = orchestrator.process(SCENARIO).await;
		assert_eq!(response.job_run_id, "job-1");
		assert!(response.data.is_none());
		assert!(response.error.unwrap().contains("stub rejects every topic"));
		assert_eq!(counters.parses.load(Ordering::SeqCst), 1);
		assert_eq!(counters.submits.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_unparseable_topic_never_submits() {
		let (orchestrator, counters) = orchestrator(Behaviour::Succeed);
		let response = orchestrator
			.process(br#"{"Id":"job-3","Data":{"Result":"x","HederaTopicId":"topic-1"}}"#)
			.await;
		assert_eq!(response.job_run_id, "job-3");
		assert!(response.error.unwrap().starts_with("Invalid topic ID"));
		assert_eq!(counters.submits.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_submission_failure_is_reported() {
		let (orchestrator, counters) = orchestrator(Behaviour::RejectSubmission);
		let response = orchestrator.process(SCENARIO).await;
		assert_eq!(
			response,
			AdapterResponse::failure("job-1", "Submission failed: INSUFFICIENT_PAYER_BALANCE")
		);
		assert_eq!(counters.submits.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_empty_body_skips_submission() {
		let (orchestrator, counters) = orchestrator(Behaviour::Succeed);
		let response = orchestrator.process(b"").await;
		assert_eq!(response.job_run_id, "");
		assert!(response.error.unwrap().starts_with("Malformed request"));
		assert_eq!(counters.parses.load(Ordering::SeqCst), 0);
		assert_eq!(counters.submits.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_malformed_body_keeps_job_id() {
		let (orchestrator, _) = orchestrator(Behaviour::Succeed);
		let response = orchestrator.process(br#"{"Id":"job-4","Data":{}}"#).await;
		assert_eq!(response.job_run_id, "job-4");
		assert!(response.error.is_some());
	}

	#[tokio::test]
	async fn test_identical_requests_submit_twice() {
		let (orchestrator, counters) = orchestrator(Behaviour::Succeed);
		let (_, first) = orchestrator.run(SCENARIO).await;
		let (_, second) = orchestrator.run(SCENARIO).await;
		assert_eq!(counters.submits.load(Ordering::SeqCst), 2);

		match (first, second) {
			(Outcome::Confirmed(a), Outcome::Confirmed(b)) => {
				assert_ne!(a.transaction_id, b.transaction_id)
			}
			other => panic!("Expected two confirmations, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_state_transitions() {
		let (orchestrator, _) = orchestrator(Behaviour::Succeed);

		let mut submission = Submission::new();
		assert_eq!(submission.state(), SubmissionState::Received);
		submission.decode(SCENARIO).unwrap();
		assert_eq!(submission.state(), SubmissionState::Decoded);
		assert_eq!(submission.job_id(), "job-1");
		let outcome = submission.submit(&orchestrator.ledger).await;
		assert!(matches!(outcome, Outcome::Confirmed(_)));
		assert_eq!(submission.state(), SubmissionState::Confirmed);
		assert!(submission.state().is_terminal());

		let mut rejected = Submission::new();
		assert!(rejected.decode(b"[]").is_err());
		assert_eq!(rejected.state(), SubmissionState::Failed);

		// A failed submission stays failed and never reaches the ledger.
		let outcome = rejected.submit(&orchestrator.ledger).await;
		assert!(matches!(outcome, Outcome::Failed(BridgeError::MalformedRequest(_))));
		assert_eq!(rejected.state(), SubmissionState::Failed);
	}
}
