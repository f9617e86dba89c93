use serde_json::Value;
use tracing::debug;

use crate::config::model::{
    DEFAULT_DURATION_SEC, MAX_DURATION_SEC, Preset, Sound, Style, TimeFormat, TimerConfig,
    TimerMode, Warning,
};

pub const UNNAMED_PRESET: &str = "Unnamed Preset";

pub fn validate_config(raw: &Value) -> Option<TimerConfig> {
    if !is_record(raw) {
        return None;
    }

    Some(TimerConfig {
        mode: validate_mode(raw.get("mode")),
        duration_sec: validate_duration(raw.get("durationSec")),
        format: validate_format(raw.get("format")),
        style: validate_style(raw.get("style")),
        warn: validate_warning(raw.get("warn")),
        sound: validate_sound(raw.get("sound")),
    })
}

pub fn validate_mode(value: Option<&Value>) -> TimerMode {
    value
        .and_then(Value::as_str)
        .and_then(TimerMode::from_token)
        .unwrap_or_default()
}

/// Negative or non-numeric input falls back to 1200; the rest is capped at
/// 359999. Fractional seconds are floored rather than kept.
pub fn validate_duration(value: Option<&Value>) -> u32 {
    let num = coerce_number(value);
    if num.is_nan() || num < 0.0 {
        return DEFAULT_DURATION_SEC;
    }
    num.min(f64::from(MAX_DURATION_SEC)).floor() as u32
}

pub fn validate_format(value: Option<&Value>) -> TimeFormat {
    value
        .and_then(Value::as_str)
        .and_then(TimeFormat::from_token)
        .unwrap_or_default()
}

pub fn validate_style(value: Option<&Value>) -> Style {
    let Some(style) = value.filter(|v| is_record(v)) else {
        return Style::default();
    };
    let defaults = Style::default();

    Style {
        color: validate_hex_color(style.get("color"), &defaults.color),
        stroke_width: validate_number(style.get("strokeWidth"), defaults.stroke_width, 0.0, 20.0),
        stroke_color: validate_hex_color(style.get("strokeColor"), &defaults.stroke_color),
        shadow_size: validate_number(style.get("shadowSize"), defaults.shadow_size, 0.0, 50.0),
        bg_color: validate_hex_color(style.get("bgColor"), &defaults.bg_color),
    }
}

pub fn validate_warning(value: Option<&Value>) -> Warning {
    let Some(warn) = value.filter(|v| is_record(v)) else {
        return Warning::default();
    };
    let defaults = Warning::default();

    Warning {
        enabled: is_truthy(warn.get("enabled")),
        seconds: validate_whole(warn.get("seconds"), defaults.seconds, 0, MAX_DURATION_SEC),
        color_enabled: is_truthy(warn.get("colorEnabled")),
        color: validate_hex_color(warn.get("color"), &defaults.color),
        flash_enabled: is_truthy(warn.get("flashEnabled")),
        flash_rate_ms: validate_whole(warn.get("flashRateMs"), defaults.flash_rate_ms, 100, 2000),
        sound_enabled: is_truthy(warn.get("soundEnabled")),
    }
}

pub fn validate_sound(value: Option<&Value>) -> Sound {
    let Some(sound) = value.filter(|v| is_record(v)) else {
        return Sound::default();
    };

    Sound {
        end_enabled: is_truthy(sound.get("endEnabled")),
        volume: validate_number(sound.get("volume"), Sound::default().volume, 0.0, 1.0),
    }
}

pub fn validate_hex_color(value: Option<&Value>, default: &str) -> String {
    let Some(text) = value.and_then(Value::as_str) else {
        return default.to_string();
    };
    let hex = text.trim();
    let Some(digits) = hex.strip_prefix('#') else {
        return default.to_string();
    };
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return default.to_string();
    }

    match digits.len() {
        6 => hex.to_string(),
        3 => {
            let mut expanded = String::with_capacity(7);
            expanded.push('#');
            for channel in digits.chars() {
                expanded.push(channel);
                expanded.push(channel);
            }
            expanded
        }
        _ => default.to_string(),
    }
}

pub fn validate_number(value: Option<&Value>, default: f64, min: f64, max: f64) -> f64 {
    let num = coerce_number(value);
    if num.is_nan() {
        return default;
    }
    num.clamp(min, max)
}

fn validate_whole(value: Option<&Value>, default: u32, min: u32, max: u32) -> u32 {
    validate_number(value, f64::from(default), f64::from(min), f64::from(max)).floor() as u32
}

fn validate_string(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(default)
        .to_string()
}

pub fn validate_preset(raw: &Value) -> Option<Preset> {
    if !is_record(raw) {
        return None;
    }
    let config = validate_config(raw.get("config")?)?;

    Some(Preset {
        name: validate_string(raw.get("name"), UNNAMED_PRESET),
        config,
        linked_to_next: is_truthy(raw.get("linkedToNext")),
    })
}

pub fn validate_presets(raw: &Value) -> Vec<Preset> {
    let Some(records) = raw.as_array() else {
        return Vec::new();
    };

    let presets: Vec<Preset> = records.iter().filter_map(validate_preset).collect();
    let dropped = records.len() - presets.len();
    if dropped > 0 {
        debug!(dropped, kept = presets.len(), "dropped invalid preset records");
    }
    presets
}

pub fn safe_json_parse(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

pub fn safe_json_parse_with<T>(
    text: &str,
    validator: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    safe_json_parse(text).as_ref().and_then(validator)
}

// Arrays are containers too: they pass the object check but carry no named fields.
fn is_record(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(num)) => num.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(flag)) => f64::from(u8::from(*flag)),
        Some(Value::Number(num)) => num.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(text)) => parse_numeric_text(text),
        Some(Value::Array(items)) => match items.as_slice() {
            [] => 0.0,
            [Value::Null] => 0.0,
            [Value::Bool(_) | Value::Object(_)] => f64::NAN,
            [single] => coerce_number(Some(single)),
            _ => f64::NAN,
        },
        Some(Value::Object(_)) => f64::NAN,
    }
}

fn parse_numeric_text(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|n| n as f64)
                .unwrap_or(f64::NAN);
        }
    }

    let lowered = trimmed.to_ascii_lowercase();
    if lowered.contains("inf") || lowered.contains("nan") {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}
