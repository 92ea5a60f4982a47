//! Small numeric helpers shared by the evaluator and the sampler.

/// Fractional digits kept when snapping the scaled value before rounding.
/// `(1 - 0.3) * 0.75 * 100` comes out as `52.49999999999999`; snapping makes it `52.5`.
const SNAP_DIGITS: i32 = 6;

/// Round to `places` decimals, ties away from zero.
///
/// The scaled value is snapped to `SNAP_DIGITS` fractional digits first, so binary
/// noise from the preceding multiplication never decides which way a tie goes.
pub fn round_half_away(value: f64, places: i32) -> f64 {
  let factor = 10f64.powi(places);
  let snap = 10f64.powi(SNAP_DIGITS);
  let scaled = ((value * factor) * snap).round() / snap;
  scaled.round() / factor
}

/// `round_half_away(value, 0)` as a non-negative count.
pub fn round_count(value: f64) -> usize {
  let r = round_half_away(value, 0);
  if r <= 0.0 { 0 } else { r as usize }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ties_go_away_from_zero() {
    assert_eq!(round_half_away((1.0 - 0.3) * 0.75, 2), 0.53);
    assert_eq!(round_half_away((1.0 - 0.1) * 0.75, 2), 0.68);
    assert_eq!(round_half_away(0.5, 0), 1.0);
    assert_eq!(round_half_away(2.5, 0), 3.0);
    assert_eq!(round_half_away(0.285, 2), 0.29);
  }

  #[test]
  fn non_ties_round_to_nearest() {
    assert_eq!(round_half_away((1.0 - 0.49) * 0.75, 2), 0.38);
    assert_eq!(round_half_away((1.0 - 0.2) * 0.75, 2), 0.6);
  }

  #[test]
  fn counts_follow_the_same_rule() {
    assert_eq!(round_count(6.0 * 0.6), 4);
    assert_eq!(round_count(6.0 * 0.2), 1);
    assert_eq!(round_count(5.0 * 0.1), 1);
    assert_eq!(round_count(5.0 * 0.7), 4);
    assert_eq!(round_count(1.0 * 0.1), 0);
  }
}
