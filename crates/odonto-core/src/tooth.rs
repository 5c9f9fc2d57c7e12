//! FDI tooth numbering for the permanent dentition.
//!
//! A tooth number is two digits: the quadrant (1 upper right, 2 upper left,
//! 3 lower left, 4 lower right) followed by the position counted from the
//! midline (1 central incisor … 8 third molar).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A valid FDI permanent-dentition tooth number (11-18, 21-28, 31-38, 41-48).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct ToothNumber(u8);

impl ToothNumber {
  pub fn new(n: u8) -> Result<Self, ValidationError> {
    let quadrant = n / 10;
    let position = n % 10;
    if (1..=4).contains(&quadrant) && (1..=8).contains(&position) {
      Ok(Self(n))
    } else {
      Err(ValidationError::InvalidTooth(n.to_string()))
    }
  }

  pub fn get(self) -> u8 { self.0 }

  /// All 32 teeth in ascending numeric order.
  pub fn all() -> impl Iterator<Item = ToothNumber> {
    (1..=4u8).flat_map(|q| (1..=8u8).map(move |p| ToothNumber(q * 10 + p)))
  }
}

impl fmt::Display for ToothNumber {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl TryFrom<u8> for ToothNumber {
  type Error = ValidationError;

  fn try_from(n: u8) -> Result<Self, Self::Error> { Self::new(n) }
}

impl From<ToothNumber> for u8 {
  fn from(t: ToothNumber) -> Self { t.0 }
}

impl FromStr for ToothNumber {
  type Err = ValidationError;

  /// Only the canonical two-digit form is accepted, so every tooth has
  /// exactly one wire key.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || ValidationError::InvalidTooth(s.to_owned());
    if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
      return Err(invalid());
    }
    s.parse::<u8>().map_err(|_| invalid()).and_then(Self::new)
  }
}

// ─── Arch layout ─────────────────────────────────────────────────────────────

/// One row of the chart as seen from the dentist's chair: the patient's right
/// side on the left of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchRow {
  /// Teeth on the left half of the screen, outermost first.
  pub left:  [ToothNumber; 8],
  /// Teeth on the right half of the screen, innermost first.
  pub right: [ToothNumber; 8],
}

impl ArchRow {
  /// The row's 16 teeth left to right.
  pub fn teeth(&self) -> impl Iterator<Item = ToothNumber> + '_ {
    self.left.iter().chain(self.right.iter()).copied()
  }
}

const fn row(left_quadrant: u8, right_quadrant: u8) -> ArchRow {
  let mut left = [ToothNumber(0); 8];
  let mut right = [ToothNumber(0); 8];
  let mut i = 0;
  while i < 8 {
    left[i] = ToothNumber(left_quadrant * 10 + (8 - i as u8));
    right[i] = ToothNumber(right_quadrant * 10 + (i as u8 + 1));
    i += 1;
  }
  ArchRow { left, right }
}

/// Upper arch: 18..11 | 21..28.
pub const UPPER_ARCH: ArchRow = row(1, 2);

/// Lower arch: 48..41 | 31..38.
pub const LOWER_ARCH: ArchRow = row(4, 3);
