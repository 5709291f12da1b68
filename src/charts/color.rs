//! Color scale for bars colored by the secondary column's mean.

use crate::stats::GroupRow;

/// Bar color when no secondary column is charted.
pub const BAR_COLOR: (u8, u8, u8) = (52, 152, 219); // Blue

const SCALE_LOW: (u8, u8, u8) = (52, 152, 219); // Blue
const SCALE_HIGH: (u8, u8, u8) = (231, 76, 60); // Red
const MISSING_COLOR: (u8, u8, u8) = (160, 160, 160); // Gray

/// Observed (min, max) of the secondary means, if any.
pub fn secondary_range(rows: &[GroupRow]) -> Option<(f64, f64)> {
    rows.iter()
        .filter_map(|r| r.secondary)
        .filter(|v| v.is_finite())
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}

/// Linear blue→red scale over `[min, max]`. A degenerate range maps to the
/// low end.
pub fn color_for(value: f64, min: f64, max: f64) -> (u8, u8, u8) {
    let t = if max > min {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    (
        lerp(SCALE_LOW.0, SCALE_HIGH.0),
        lerp(SCALE_LOW.1, SCALE_HIGH.1),
        lerp(SCALE_LOW.2, SCALE_HIGH.2),
    )
}

/// Color of each bar, in row order.
pub fn bar_colors(rows: &[GroupRow], use_secondary: bool) -> Vec<(u8, u8, u8)> {
    let range = if use_secondary {
        secondary_range(rows)
    } else {
        None
    };

    rows.iter()
        .map(|row| match (use_secondary, range, row.secondary) {
            (false, _, _) => BAR_COLOR,
            (true, Some((lo, hi)), Some(v)) => color_for(v, lo, hi),
            (true, _, _) => MISSING_COLOR,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(secondary: Option<f64>) -> GroupRow {
        GroupRow {
            label: "A".into(),
            value: Some(1.0),
            secondary,
        }
    }

    #[test]
    fn scale_endpoints() {
        assert_eq!(color_for(1.0, 1.0, 6.0), SCALE_LOW);
        assert_eq!(color_for(6.0, 1.0, 6.0), SCALE_HIGH);
        assert_eq!(color_for(99.0, 1.0, 6.0), SCALE_HIGH);
        assert_eq!(color_for(3.0, 3.0, 3.0), SCALE_LOW);
    }

    #[test]
    fn range_ignores_missing() {
        let rows = [row(Some(4.0)), row(None), row(Some(2.0))];
        assert_eq!(secondary_range(&rows), Some((2.0, 4.0)));
        assert_eq!(secondary_range(&[row(None)]), None);
    }

    #[test]
    fn bars_without_secondary_share_one_color() {
        let rows = [row(Some(1.0)), row(Some(5.0))];
        assert_eq!(bar_colors(&rows, false), vec![BAR_COLOR, BAR_COLOR]);

        let colored = bar_colors(&rows, true);
        assert_eq!(colored, vec![SCALE_LOW, SCALE_HIGH]);
        assert_eq!(bar_colors(&[row(None)], true), vec![MISSING_COLOR]);
    }
}
