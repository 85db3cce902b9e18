use bridge_ledger::LedgerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
	#[error("Malformed request: {0}")]
	MalformedRequest(String),

	#[error(transparent)]
	Ledger(#[from] LedgerError),

	#[error("Encoding failure: {0}")]
	EncodingFailure(String),
}
