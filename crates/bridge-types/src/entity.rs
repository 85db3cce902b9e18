//! Ledger entity identifiers.
//!
//! Topics and accounts are both addressed as `shard.realm.num`, optionally
//! followed by a `-abcde` checksum suffix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityIdParseError {
	#[error("expected `shard.realm.num`, got {0:?}")]
	Format(String),
	#[error("invalid {part} component in {input:?}")]
	Component { part: &'static str, input: String },
	#[error("invalid checksum {checksum:?} in {input:?}")]
	Checksum { checksum: String, input: String },
}

/// Three-part entity address shared by topics and accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
	pub shard: u64,
	pub realm: u64,
	pub num: u64,
}

impl EntityId {
	pub const fn new(shard: u64, realm: u64, num: u64) -> Self {
		Self { shard, realm, num }
	}
}

impl fmt::Display for EntityId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
	}
}

impl FromStr for EntityId {
	type Err = EntityIdParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (address, checksum) = match s.split_once('-') {
			Some((address, checksum)) => (address, Some(checksum)),
			None => (s, None),
		};

		if let Some(checksum) = checksum {
			if checksum.len() != 5 || !checksum.bytes().all(|b| b.is_ascii_lowercase()) {
				return Err(EntityIdParseError::Checksum {
					checksum: checksum.to_string(),
					input: s.to_string(),
				});
			}
		}

		let parts: Vec<&str> = address.split('.').collect();
		if parts.len() != 3 {
			return Err(EntityIdParseError::Format(s.to_string()));
		}

		let component = |value: &str, part: &'static str| {
			// `u64::from_str` accepts a leading `+`, which is not a valid entity component.
			if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
				return Err(EntityIdParseError::Component {
					part,
					input: s.to_string(),
				});
			}
			value.parse::<u64>().map_err(|_| EntityIdParseError::Component {
				part,
				input: s.to_string(),
			})
		};

		Ok(Self {
			shard: component(parts[0], "shard")?,
			realm: component(parts[1], "realm")?,
			num: component(parts[2], "num")?,
		})
	}
}

/// Consensus topic identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicId(pub EntityId);

impl fmt::Display for TopicId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

impl FromStr for TopicId {
	type Err = EntityIdParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(TopicId(s.parse()?))
	}
}

/// Operator (payer) account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub EntityId);

impl fmt::Display for AccountId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

impl FromStr for AccountId {
	type Err = EntityIdParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(AccountId(s.parse()?))
	}
}
