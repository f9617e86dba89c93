use std::sync::LazyLock;

use regex::Regex;

use crate::field::format::TimeComponents;

static HMS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{1,3}):([0-9]{1,2}):([0-9]{1,2})$").expect("static pattern")
});
static MS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,2}):([0-9]{1,2})$").expect("static pattern"));
static LOOSE_MS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2}):([0-9]{1,2})").expect("static pattern"));

pub fn parse_smart_duration(text: &str) -> Option<TimeComponents> {
    let input = text.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(caps) = HMS_PATTERN.captures(input) {
        let total =
            digits_value(&caps[1]) * 3600 + digits_value(&caps[2]) * 60 + digits_value(&caps[3]);
        return Some(TimeComponents::from_total_seconds(total));
    }

    if let Some(caps) = MS_PATTERN.captures(input) {
        let total = digits_value(&caps[1]) * 60 + digits_value(&caps[2]);
        return Some(TimeComponents::from_total_seconds(total));
    }

    if input.bytes().all(|b| b.is_ascii_digit()) {
        let len = input.len();
        let total = if len <= 2 {
            digits_value(input)
        } else if len <= 4 {
            let (minutes, seconds) = input.split_at(len - 2);
            digits_value(minutes)
                .saturating_mul(60)
                .saturating_add(digits_value(seconds))
        } else {
            let (rest, seconds) = input.split_at(len - 2);
            let (hours, minutes) = rest.split_at(rest.len() - 2);
            digits_value(hours)
                .saturating_mul(3600)
                .saturating_add(digits_value(minutes) * 60)
                .saturating_add(digits_value(seconds))
        };
        return Some(TimeComponents::from_total_seconds(total));
    }

    None
}

pub fn find_loose_ms(text: &str) -> Option<TimeComponents> {
    let caps = LOOSE_MS_PATTERN.captures(text)?;
    Some(TimeComponents {
        h: 0,
        m: digits_value(&caps[1]) as u32,
        s: digits_value(&caps[2]) as u32,
    })
}

fn digits_value(digits: &str) -> u64 {
    digits.bytes().fold(0_u64, |acc, digit| {
        acc.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hms(h: u32, m: u32, s: u32) -> Option<TimeComponents> {
        Some(TimeComponents::new(h, m, s))
    }

    #[test]
    fn digit_runs_are_split_from_the_right() {
        assert_eq!(parse_smart_duration("30"), hms(0, 0, 30));
        assert_eq!(parse_smart_duration("530"), hms(0, 5, 30));
        assert_eq!(parse_smart_duration("1230"), hms(0, 12, 30));
        assert_eq!(parse_smart_duration("13000"), hms(1, 30, 0));
        assert_eq!(parse_smart_duration("123456"), hms(12, 34, 56));
    }

    #[test]
    fn out_of_range_units_carry_upward() {
        assert_eq!(parse_smart_duration("90"), hms(0, 1, 30));
        assert_eq!(parse_smart_duration("199"), hms(0, 2, 39));
        assert_eq!(parse_smart_duration("1:99:99"), hms(2, 40, 39));
        assert_eq!(parse_smart_duration("99:99"), hms(1, 40, 39));
    }

    #[test]
    fn colon_forms_and_whitespace() {
        assert_eq!(parse_smart_duration(" 5:30 "), hms(0, 5, 30));
        assert_eq!(parse_smart_duration("1:30:00"), hms(1, 30, 0));
        assert_eq!(parse_smart_duration("100:00:00"), hms(100, 0, 0));
    }

    #[test]
    fn huge_values_cap_at_maximum() {
        assert_eq!(parse_smart_duration("999:59:60"), hms(999, 59, 59));
        assert_eq!(
            parse_smart_duration("99999999999999999999999999"),
            hms(999, 59, 59)
        );
    }

    #[test]
    fn unrecognized_text_is_no_match() {
        assert_eq!(parse_smart_duration(""), None);
        assert_eq!(parse_smart_duration("   "), None);
        assert_eq!(parse_smart_duration("ten minutes"), None);
        assert_eq!(parse_smart_duration("1:2:3:4"), None);
        assert_eq!(parse_smart_duration("1000:00:00"), None);
        assert_eq!(parse_smart_duration("5m"), None);
        assert_eq!(parse_smart_duration("-30"), None);
    }

    #[test]
    fn loose_ms_matches_anywhere() {
        assert_eq!(find_loose_ms("at 7:05 sharp"), Some(TimeComponents::new(0, 7, 5)));
        assert_eq!(find_loose_ms("123:45"), Some(TimeComponents::new(0, 23, 45)));
        assert_eq!(find_loose_ms("745"), None);
    }
}
