pub const MAX_DURATION_SECONDS: u64 = 999 * 3600 + 59 * 60 + 59;

pub const MAX_HOURS: u32 = 999;
pub const MAX_MS_MINUTES: u32 = 99;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TimeComponents {
    pub h: u32,
    pub m: u32,
    pub s: u32,
}

impl TimeComponents {
    pub fn new(h: u32, m: u32, s: u32) -> Self {
        Self { h, m, s }
    }

    pub fn from_total_seconds(total_seconds: u64) -> Self {
        let total = total_seconds.min(MAX_DURATION_SECONDS);
        Self::new(
            (total / 3600) as u32,
            ((total % 3600) / 60) as u32,
            (total % 60) as u32,
        )
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.h) * 3600 + u64::from(self.m) * 60 + u64::from(self.s)
    }
}

pub fn format_time_value(h: u32, m: u32, s: u32) -> String {
    let hours = h.min(MAX_HOURS);
    let minutes = m.min(59);
    let seconds = s.min(59);
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

pub fn format_components(time: TimeComponents) -> String {
    format_time_value(time.h, time.m, time.s)
}

pub fn format_ms_value(m: u32, s: u32) -> String {
    let minutes = m.min(MAX_MS_MINUTES);
    let seconds = s.min(59);
    format!("{minutes:02}:{seconds:02}")
}

pub fn parse_time_value(value: &str) -> TimeComponents {
    let mut parts = value.split(':');
    let h = parts.next().map(leading_int).unwrap_or(0);
    let m = parts.next().map(leading_int).unwrap_or(0);
    let s = parts.next().map(leading_int).unwrap_or(0);
    TimeComponents::new(h, m, s)
}

pub fn parse_ms_value(value: &str) -> TimeComponents {
    let mut parts = value.split(':');
    let m = parts.next().map(leading_int).unwrap_or(0);
    let s = parts.next().map(leading_int).unwrap_or(0);
    TimeComponents::new(0, m, s)
}

pub fn time_value_to_seconds(value: &str) -> u64 {
    parse_time_value(value).total_seconds()
}

pub fn seconds_to_time_value(total_seconds: u64) -> String {
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;
    format_time_value(saturate_u32(h), m as u32, s as u32)
}

pub fn ms_value_to_seconds(value: &str) -> u64 {
    let time = parse_ms_value(value);
    u64::from(time.m) * 60 + u64::from(time.s)
}

pub fn seconds_to_ms_value(total_seconds: u64) -> String {
    let m = total_seconds / 60;
    let s = total_seconds % 60;
    format_ms_value(saturate_u32(m), s as u32)
}

fn leading_int(part: &str) -> u32 {
    let trimmed = part.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0_u64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(u64::from(digit - b'0'))
        });
    if negative { 0 } else { saturate_u32(value) }
}

fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
