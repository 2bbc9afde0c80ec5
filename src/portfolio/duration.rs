/// Converts a duration token into minutes.
///
/// Accepts `<h>h`, `<m>m` and both parts in either order (`1h40m`, `40m1h`),
/// each at most once. A bare number is a count of hours. Every other token,
/// including an empty one or one too large to represent, yields `0`.
pub fn parse_duration(token: &str) -> f64 {
    let token = token.trim().to_ascii_lowercase();
    if token.is_empty() {
        return 0.0;
    }

    let minutes = if token.bytes().all(|byte| byte.is_ascii_digit()) {
        digits_value(&token).map(|hours| hours * 60.0)
    } else {
        parse_units(&token)
    };

    minutes.filter(|minutes| minutes.is_finite()).unwrap_or(0.0)
}

fn parse_units(token: &str) -> Option<f64> {
    let mut hours = None;
    let mut minutes = None;
    let mut digits_start = 0;

    for (index, byte) in token.bytes().enumerate() {
        let slot = match byte {
            b'0'..=b'9' => continue,
            b'h' => &mut hours,
            b'm' => &mut minutes,
            _ => return None,
        };

        if slot.replace(digits_value(&token[digits_start..index])?).is_some() {
            return None;
        }
        digits_start = index + 1;
    }

    // trailing digits without a unit
    if digits_start != token.len() {
        return None;
    }

    Some(hours.unwrap_or(0.0) * 60.0 + minutes.unwrap_or(0.0))
}

fn digits_value(digits: &str) -> Option<f64> {
    if digits.is_empty() {
        return Some(0.0);
    }
    digits.parse::<f64>().ok().filter(|value| value.is_finite())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_unit_tokens() {
        assert_eq!(parse_duration("2h"), 120.0);
        assert_eq!(parse_duration("30m"), 30.0);
        assert_eq!(parse_duration("1h40m"), 100.0);
        assert_eq!(parse_duration("40m1h"), 100.0);
        assert_eq!(parse_duration("  1H05M "), 65.0);
    }

    #[test]
    fn bare_digits_are_hours() {
        assert_eq!(parse_duration("2"), 120.0);
        assert_eq!(parse_duration("0"), 0.0);
        assert_eq!(parse_duration("007"), 420.0);
    }

    #[test]
    fn malformed_tokens_are_zero() {
        for token in [
            "garbage", "", "   ", "1h2h", "5m5m", "1h30", "1.5h", "-2h", "1 h", "h1", "2x",
        ] {
            assert_eq!(parse_duration(token), 0.0, "token {token:?}");
        }
    }

    #[test]
    fn unit_without_number_counts_as_zero() {
        assert_eq!(parse_duration("h30m"), 30.0);
        assert_eq!(parse_duration("m"), 0.0);
    }

    #[test]
    fn overflowing_numbers_are_zero() {
        let nines = "9".repeat(400);
        assert_eq!(parse_duration(&nines), 0.0);
        assert_eq!(parse_duration(&format!("{nines}h")), 0.0);
        assert_eq!(parse_duration(&format!("{nines}m")), 0.0);
        assert_eq!(parse_duration(&format!("1h{nines}m")), 0.0);
    }

    #[test]
    fn overflow_from_hour_conversion_is_zero() {
        // parses as a finite f64, but not once multiplied by 60
        let hours = "9".repeat(308);
        assert_eq!(parse_duration(&hours), 0.0);
        assert_eq!(parse_duration(&format!("{hours}h")), 0.0);
        assert_eq!(parse_duration(&format!("{hours}m")), hours.parse::<f64>().unwrap());
    }

    proptest! {
        #[test]
        fn never_negative(token in "\\PC{0,12}") {
            let minutes = parse_duration(&token);
            prop_assert!(minutes >= 0.0);
            prop_assert!(minutes.is_finite());
        }

        #[test]
        fn hours_and_minutes_combine(hours in 0u32..200, minutes in 0u32..600) {
            let expected = f64::from(hours) * 60.0 + f64::from(minutes);
            prop_assert_eq!(parse_duration(&format!("{hours}h{minutes}m")), expected);
            prop_assert_eq!(parse_duration(&format!("{minutes}m{hours}h")), expected);
        }
    }
}
