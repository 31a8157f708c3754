//! Raw scores and their 0-1000 normalized form

use std::cmp::Ordering;
use std::fmt;
use std::ops::Sub;

use serde::{Serialize, Serializer};

/// A raw total score.
///
/// Banned releases score `NegInfinity`. Variant order gives the total
/// ordering `NegInfinity < Finite(_) < PosInfinity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Score {
    NegInfinity,
    Finite(i64),
    PosInfinity,
}

impl Score {
    pub const ZERO: Score = Score::Finite(0);

    pub fn is_finite(&self) -> bool {
        matches!(self, Score::Finite(_))
    }

    pub fn finite(&self) -> Option<i64> {
        match self {
            Score::Finite(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for Score {
    fn from(value: i64) -> Self {
        Score::Finite(value)
    }
}

impl Default for Score {
    fn default() -> Self {
        Score::ZERO
    }
}

impl Sub for Score {
    type Output = Score;

    fn sub(self, rhs: Score) -> Score {
        match (self, rhs) {
            (Score::Finite(a), Score::Finite(b)) => Score::Finite(a.saturating_sub(b)),
            (Score::NegInfinity, _) => Score::NegInfinity,
            (_, Score::NegInfinity) => Score::PosInfinity,
            (Score::PosInfinity, Score::PosInfinity) => Score::ZERO,
            (Score::PosInfinity, _) => Score::PosInfinity,
            (Score::Finite(_), Score::PosInfinity) => Score::NegInfinity,
        }
    }
}

impl PartialEq<i64> for Score {
    fn eq(&self, other: &i64) -> bool {
        *self == Score::Finite(*other)
    }
}

impl PartialOrd<i64> for Score {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        Some(self.cmp(&Score::Finite(*other)))
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::NegInfinity => write!(f, "-Infinity"),
            Score::Finite(v) => write!(f, "{}", v),
            Score::PosInfinity => write!(f, "Infinity"),
        }
    }
}

impl Serialize for Score {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Score::Finite(v) => serializer.serialize_i64(*v),
            Score::NegInfinity => serializer.serialize_str("-Infinity"),
            Score::PosInfinity => serializer.serialize_str("Infinity"),
        }
    }
}

/// Upper end of the normalized scale
pub const NORMALIZED_MAX: u32 = 1000;

/// `(raw upper bound, normalized upper bound)` of each linear tier
const TIERS: [(i64, u32); 5] = [
    (2_000, 200),
    (5_000, 400),
    (10_000, 600),
    (15_000, 800),
    (25_000, 950),
];

/// Map a raw score onto `0..=1000`.
///
/// Five linear tiers, then a logarithmic taper above the last boundary. A
/// value exactly on a boundary takes the upper end of the lower tier.
pub fn normalize(raw: Score) -> u32 {
    let raw = match raw {
        Score::NegInfinity => return 0,
        Score::PosInfinity => return NORMALIZED_MAX,
        Score::Finite(v) if v <= 0 => return 0,
        Score::Finite(v) => v,
    };

    let mut lower = (0i64, 0u32);
    for (raw_bound, norm_bound) in TIERS {
        if raw <= raw_bound {
            let span = i128::from(raw_bound - lower.0);
            let band = i128::from(norm_bound - lower.1);
            let offset = i128::from(raw - lower.0) * band / span;
            return lower.1 + offset as u32;
        }
        lower = (raw_bound, norm_bound);
    }

    // Logarithmic taper: approaches the cap without reaching it
    let (top_raw, top_norm) = lower;
    let excess = (raw - top_raw) as f64;
    let log = (1.0 + excess / top_raw as f64).ln();
    let headroom = f64::from(NORMALIZED_MAX - top_norm);
    let tapered = top_norm + (headroom * log / (1.0 + log)).floor() as u32;
    tapered.min(NORMALIZED_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Score Tests
    // =========================================================================

    #[test]
    fn test_score_ordering() {
        assert!(Score::NegInfinity < Score::Finite(i64::MIN));
        assert!(Score::Finite(-5) < Score::Finite(3));
        assert!(Score::Finite(i64::MAX) < Score::PosInfinity);
        assert!(Score::Finite(10) > 5i64);
    }

    #[test]
    fn test_score_subtraction() {
        assert_eq!(Score::Finite(500) - Score::Finite(800), Score::Finite(-300));
        assert_eq!(Score::Finite(500) - Score::NegInfinity, Score::PosInfinity);
        assert_eq!(Score::NegInfinity - Score::Finite(500), Score::NegInfinity);
        assert_eq!(Score::NegInfinity - Score::NegInfinity, Score::NegInfinity);
    }

    #[test]
    fn test_score_subtraction_saturates() {
        assert_eq!(
            Score::Finite(i64::MIN) - Score::Finite(1),
            Score::Finite(i64::MIN)
        );
    }

    #[test]
    fn test_score_serializes_infinities_as_strings() {
        assert_eq!(serde_json::to_value(Score::Finite(42)).unwrap(), serde_json::json!(42));
        assert_eq!(
            serde_json::to_value(Score::NegInfinity).unwrap(),
            serde_json::json!("-Infinity")
        );
        assert_eq!(
            serde_json::to_value(Score::PosInfinity).unwrap(),
            serde_json::json!("Infinity")
        );
    }

    // =========================================================================
    // Normalizer Tests
    // =========================================================================

    #[test]
    fn test_normalize_sentinels() {
        assert_eq!(normalize(Score::ZERO), 0);
        assert_eq!(normalize(Score::Finite(-12_000)), 0);
        assert_eq!(normalize(Score::NegInfinity), 0);
        assert_eq!(normalize(Score::PosInfinity), 1000);
    }

    #[test]
    fn test_normalize_boundaries_take_lower_tier_upper_end() {
        assert_eq!(normalize(Score::Finite(2_000)), 200);
        assert_eq!(normalize(Score::Finite(5_000)), 400);
        assert_eq!(normalize(Score::Finite(10_000)), 600);
        assert_eq!(normalize(Score::Finite(15_000)), 800);
        assert_eq!(normalize(Score::Finite(25_000)), 950);
    }

    #[test]
    fn test_normalize_linear_within_tier() {
        assert_eq!(normalize(Score::Finite(1_000)), 100);
        assert_eq!(normalize(Score::Finite(3_500)), 300);
        assert_eq!(normalize(Score::Finite(12_500)), 700);
        assert_eq!(normalize(Score::Finite(20_000)), 875);
    }

    #[test]
    fn test_normalize_taper_above_top_tier() {
        let just_above = normalize(Score::Finite(25_001));
        assert!(just_above >= 950);

        let far = normalize(Score::Finite(1_000_000));
        assert!(far > 950 && far < 1000, "{}", far);

        assert!(normalize(Score::Finite(i64::MAX)) <= 1000);
    }

    #[test]
    fn test_normalize_is_monotonic() {
        let mut previous = 0;
        for raw in (-1_000..200_000).step_by(37) {
            let current = normalize(Score::Finite(raw));
            assert!(current >= previous, "normalize({}) = {} < {}", raw, current, previous);
            assert!(current <= 1000);
            previous = current;
        }
    }
}
