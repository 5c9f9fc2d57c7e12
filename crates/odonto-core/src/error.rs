//! Error types for `odonto-core`.

use thiserror::Error;

use crate::tooth::ToothNumber;

/// A chart state that must not be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("invalid tooth number: {0:?}")]
  InvalidTooth(String),

  #[error("tooth {tooth}: unknown condition {value:?}")]
  UnknownCondition { tooth: String, value: String },

  #[error("tooth {0}: \"none\" is recorded by omitting the tooth")]
  ExplicitSentinel(ToothNumber),

  #[error("tooth {0} appears more than once")]
  DuplicateTooth(ToothNumber),
}
