use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::TempBand;

/// Upper bound given to open-ended warm bands such as `28+`
pub const OPEN_HIGH: i32 = 99;
/// Lower bound given to open-ended cold bands such as `04-`
pub const OPEN_LOW: i32 = -20;

static AT_LEAST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)\+$").unwrap());
static AT_MOST: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)-$").unwrap());
static BETWEEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)-([0-9]+)$").unwrap());

/// Parses the compact temperature-band notation used by the catalog.
///
/// - `"28+"` → 28..=99
/// - `"04-"` → -20..=4
/// - `"27-23"` → 23..=27 (either order)
///
/// Anything else yields `None`, as do digit runs that overflow an `i32` and
/// `+` bands starting above [`OPEN_HIGH`].
pub fn parse_temp_range(s: &str) -> Option<TempBand> {
    let s = s.trim();

    if let Some(caps) = AT_LEAST.captures(s) {
        let low: i32 = caps[1].parse().ok()?;
        // the band would be empty
        if low > OPEN_HIGH {
            return None;
        }
        return Some(TempBand::new(low, OPEN_HIGH));
    }

    if let Some(caps) = AT_MOST.captures(s) {
        let high = caps[1].parse().ok()?;
        return Some(TempBand::new(OPEN_LOW, high));
    }

    if let Some(caps) = BETWEEN.captures(s) {
        let a = caps[1].parse().ok()?;
        let b = caps[2].parse().ok()?;
        return Some(TempBand::new(a, b));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_upper_band() {
        assert_eq!(parse_temp_range("28+"), Some(TempBand { low: 28, high: 99 }));
    }

    #[test]
    fn test_open_lower_band() {
        assert_eq!(parse_temp_range("04-"), Some(TempBand { low: -20, high: 4 }));
    }

    #[test]
    fn test_closed_band_is_sorted() {
        assert_eq!(parse_temp_range("27-23"), Some(TempBand { low: 23, high: 27 }));
        assert_eq!(parse_temp_range("5-9"), Some(TempBand { low: 5, high: 9 }));
        assert_eq!(parse_temp_range("12-12"), Some(TempBand { low: 12, high: 12 }));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(parse_temp_range("  20-25 \t"), Some(TempBand { low: 20, high: 25 }));
    }

    #[test]
    fn test_unrecognized_forms() {
        for input in [
            "abc", "", "+28", "-4", "20 - 25", "20-25-30", "2.5+", "-5-3", "20~25", "28++", "nan",
        ] {
            assert_eq!(parse_temp_range(input), None, "input {:?}", input);
        }
    }

    #[test]
    fn test_overflowing_digits_rejected() {
        assert_eq!(parse_temp_range("99999999999+"), None);
        assert_eq!(parse_temp_range("1-99999999999"), None);
    }

    #[test]
    fn test_open_band_above_sentinel_rejected() {
        assert_eq!(parse_temp_range("99+"), Some(TempBand { low: 99, high: 99 }));
        assert_eq!(parse_temp_range("100+"), None);
    }

    #[test]
    fn test_parsed_bands_are_ordered() {
        for input in ["0+", "0-", "35-0", "0-35", "10-", "45+", "7-3"] {
            let band = parse_temp_range(input).unwrap();
            assert!(band.low <= band.high, "input {:?} gave {:?}", input, band);
        }
    }
}
