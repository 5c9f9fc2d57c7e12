//! The closed set of tooth conditions a chart can record.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// The recorded condition of one tooth.
///
/// [`Condition::None`] is the "no data" sentinel. It exists so editors can
/// express "clear this tooth", but it is never stored: a tooth without data is
/// simply absent from a chart map.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Condition {
  Healthy,
  Restored,
  Cavity,
  /// Root canal treatment.
  Canal,
  Missing,
  Implant,
  #[default]
  None,
}

impl Condition {
  /// Every condition that may appear as a stored value, in legend order.
  pub const ALL_RECORDED: [Condition; 6] = [
    Condition::Healthy,
    Condition::Restored,
    Condition::Cavity,
    Condition::Canal,
    Condition::Missing,
    Condition::Implant,
  ];

  pub fn is_sentinel(self) -> bool { matches!(self, Self::None) }

  /// Human-readable legend label.
  pub fn label(self) -> &'static str {
    match self {
      Self::Healthy => "Healthy",
      Self::Restored => "Restored",
      Self::Cavity => "Cavity",
      Self::Canal => "Root canal",
      Self::Missing => "Missing",
      Self::Implant => "Implant",
      Self::None => "No data",
    }
  }
}
