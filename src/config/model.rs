use serde::{Deserialize, Serialize};

pub const DEFAULT_DURATION_SEC: u32 = 1200;
pub const MAX_DURATION_SEC: u32 = 359_999;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerMode {
    #[default]
    Countdown,
    Countup,
    Tod,
    CountdownTod,
    CountupTod,
    Hidden,
}

impl TimerMode {
    pub const ALL: [TimerMode; 6] = [
        TimerMode::Countdown,
        TimerMode::Countup,
        TimerMode::Tod,
        TimerMode::CountdownTod,
        TimerMode::CountupTod,
        TimerMode::Hidden,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Countdown => "countdown",
            TimerMode::Countup => "countup",
            TimerMode::Tod => "tod",
            TimerMode::CountdownTod => "countdown-tod",
            TimerMode::CountupTod => "countup-tod",
            TimerMode::Hidden => "hidden",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == token)
    }
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum TimeFormat {
    #[serde(rename = "H:MM:SS")]
    HMmSs,
    #[default]
    #[serde(rename = "MM:SS")]
    MmSs,
    #[serde(rename = "SS")]
    Ss,
}

impl TimeFormat {
    pub const ALL: [TimeFormat; 3] = [TimeFormat::HMmSs, TimeFormat::MmSs, TimeFormat::Ss];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeFormat::HMmSs => "H:MM:SS",
            TimeFormat::MmSs => "MM:SS",
            TimeFormat::Ss => "SS",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.as_str() == token)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub color: String,
    pub stroke_width: f64,
    pub stroke_color: String,
    pub shadow_size: f64,
    pub bg_color: String,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: "#ffffff".to_string(),
            stroke_width: 2.0,
            stroke_color: "#000000".to_string(),
            shadow_size: 10.0,
            bg_color: "#000000".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub enabled: bool,
    pub seconds: u32,
    pub color_enabled: bool,
    pub color: String,
    pub flash_enabled: bool,
    pub flash_rate_ms: u32,
    pub sound_enabled: bool,
}

impl Default for Warning {
    fn default() -> Self {
        Self {
            enabled: true,
            seconds: 120,
            color_enabled: true,
            color: "#E64A19".to_string(),
            flash_enabled: false,
            flash_rate_ms: 500,
            sound_enabled: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sound {
    pub end_enabled: bool,
    pub volume: f64,
}

impl Default for Sound {
    fn default() -> Self {
        Self {
            end_enabled: false,
            volume: 0.7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    pub mode: TimerMode,
    pub duration_sec: u32,
    pub format: TimeFormat,
    pub style: Style,
    pub warn: Warning,
    pub sound: Sound,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            mode: TimerMode::default(),
            duration_sec: DEFAULT_DURATION_SEC,
            format: TimeFormat::default(),
            style: Style::default(),
            warn: Warning::default(),
            sound: Sound::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub name: String,
    pub config: TimerConfig,
    pub linked_to_next: bool,
}
