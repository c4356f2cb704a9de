//! First-match threshold tables shared by the scorers.
//!
//! Each table is an ordered list of inclusive value bands; the first band
//! containing the value decides both the points and the qualitative label.
//! Keeping the thresholds as data rather than nested conditionals makes them
//! testable row by row and easy to retune.

pub(crate) struct Band {
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
    pub points: i64,
    pub label: &'static str,
}

pub(crate) const fn band(min: f64, max: f64, points: i64, label: &'static str) -> Band {
    Band {
        min,
        max,
        points,
        label,
    }
}

/// Evaluate a table against an optional input. A missing value scores zero
/// with the `unknown` label; a value outside every band scores zero with the
/// `fallback` label.
pub(crate) fn grade(
    value: Option<f64>,
    table: &[Band],
    unknown: &'static str,
    fallback: &'static str,
) -> (i64, &'static str) {
    let Some(v) = value else {
        return (0, unknown);
    };

    for row in table {
        if v >= row.min && v <= row.max {
            return (row.points, row.label);
        }
    }

    (0, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: [Band; 2] = [
        band(5.0, 25.0, 8, "sweet spot"),
        band(f64::NEG_INFINITY, 35.0, 3, "acceptable"),
    ];

    #[test]
    fn first_match_wins() {
        assert_eq!(grade(Some(10.0), &TABLE, "unknown", "high"), (8, "sweet spot"));
        // 30 is skipped by the first band but caught by the wider second one.
        assert_eq!(grade(Some(30.0), &TABLE, "unknown", "high"), (3, "acceptable"));
        assert_eq!(grade(Some(2.0), &TABLE, "unknown", "high"), (3, "acceptable"));
    }

    #[test]
    fn out_of_range_falls_back() {
        assert_eq!(grade(Some(99.0), &TABLE, "unknown", "high"), (0, "high"));
    }

    #[test]
    fn missing_value_is_unknown_not_penalized() {
        assert_eq!(grade(None, &TABLE, "unknown", "high"), (0, "unknown"));
    }
}
