//! Whole-mouth chart maps and the rules for what may be stored in one.
//!
//! A chart maps tooth numbers to conditions. Teeth without data are absent;
//! the [`Condition::None`] sentinel is never a stored value.

use std::{collections::BTreeMap, fmt, str::FromStr as _};

use serde::{
  Deserialize, Deserializer,
  de::{MapAccess, Visitor},
};

use crate::{condition::Condition, error::ValidationError, tooth::ToothNumber};

/// Tooth → condition, ordered by tooth number.
pub type ChartMap = BTreeMap<ToothNumber, Condition>;

/// The condition shown for `tooth`: the mapped value, or the sentinel.
pub fn condition_of(chart: &ChartMap, tooth: ToothNumber) -> Condition {
  chart.get(&tooth).copied().unwrap_or(Condition::None)
}

/// Reject any explicit sentinel entry.
pub fn validate(chart: &ChartMap) -> Result<(), ValidationError> {
  match chart.iter().find(|(_, c)| c.is_sentinel()) {
    Some((tooth, _)) => Err(ValidationError::ExplicitSentinel(*tooth)),
    None => Ok(()),
  }
}

// ─── Wire form ───────────────────────────────────────────────────────────────

/// A chart exactly as received: string entries in wire order.
///
/// Repeated keys are kept so that [`parse_wire`] can reject them instead of
/// letting the last one win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireChart(pub Vec<(String, String)>);

impl<'de> Deserialize<'de> for WireChart {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
      type Value = WireChart;

      fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of tooth numbers to condition names")
      }

      fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<WireChart, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, String>()? {
          entries.push(entry);
        }
        Ok(WireChart(entries))
      }
    }

    deserializer.deserialize_map(EntriesVisitor)
  }
}

/// Parse a wire-format chart (`{"16": "restored"}`) into typed form.
///
/// Tooth keys and condition names are checked here, and a tooth may appear
/// only once. An explicit `"none"` parses successfully and is left for
/// [`validate`] to reject, so that the store remains the one place that
/// decides what is persisted.
pub fn parse_wire(raw: &WireChart) -> Result<ChartMap, ValidationError> {
  let mut chart = ChartMap::new();
  for (key, value) in &raw.0 {
    let tooth = ToothNumber::from_str(key)?;
    let condition = Condition::from_str(value).map_err(|_| {
      ValidationError::UnknownCondition {
        tooth: key.clone(),
        value: value.clone(),
      }
    })?;
    if chart.insert(tooth, condition).is_some() {
      return Err(ValidationError::DuplicateTooth(tooth));
    }
  }
  Ok(chart)
}

/// Number of teeth recorded with each stored condition, in legend order.
pub fn tally(chart: &ChartMap) -> Vec<(Condition, usize)> {
  Condition::ALL_RECORDED
    .iter()
    .map(|c| (*c, chart.values().filter(|v| *v == c).count()))
    .collect()
}

// ─── Comparison ──────────────────────────────────────────────────────────────

/// One tooth whose condition differs between two charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToothChange {
  pub tooth:  ToothNumber,
  pub before: Condition,
  pub after:  Condition,
}

/// Per-tooth differences from `before` to `after`, ordered by tooth number.
pub fn diff(before: &ChartMap, after: &ChartMap) -> Vec<ToothChange> {
  let mut teeth: Vec<ToothNumber> =
    before.keys().chain(after.keys()).copied().collect();
  teeth.sort_unstable();
  teeth.dedup();

  teeth
    .into_iter()
    .filter_map(|tooth| {
      let b = condition_of(before, tooth);
      let a = condition_of(after, tooth);
      (a != b).then_some(ToothChange { tooth, before: b, after: a })
    })
    .collect()
}
