use std::sync::mpsc::Sender;

use chrono::NaiveTime;
use serde_json::json;
use tracing::info;

use crate::config::model::{Sound, Style, TimeFormat, TimerConfig, TimerMode, Warning};
use crate::config::preset::{PresetError, PresetList, PresetStore};
use crate::config::validate::validate_config;
use crate::field::editor::{EditableField, FieldEditor};
use crate::field::format::{seconds_to_ms_value, seconds_to_time_value};
use crate::field::section::FieldShape;
use crate::preview::preview_text;
use crate::sync::{Command, Delivery, SyncError, SyncSender};

#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error(transparent)]
    Preset(#[from] PresetError),
    #[error(transparent)]
    Sync(#[from] SyncError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormState {
    pub mode: TimerMode,
    pub format: TimeFormat,
    pub style: Style,
    pub warn_enabled: bool,
    pub warn_color_enabled: bool,
    pub warn_color: String,
    pub flash_enabled: bool,
    pub flash_rate_ms: u32,
    pub warn_sound_enabled: bool,
    pub sound: Sound,
}

impl Default for FormState {
    fn default() -> Self {
        let warn = Warning::default();
        Self {
            mode: TimerMode::default(),
            format: TimeFormat::default(),
            style: Style::default(),
            warn_enabled: warn.enabled,
            warn_color_enabled: warn.color_enabled,
            warn_color: warn.color,
            flash_enabled: warn.flash_enabled,
            flash_rate_ms: warn.flash_rate_ms,
            warn_sound_enabled: warn.sound_enabled,
            sound: Sound::default(),
        }
    }
}

#[derive(Debug)]
pub struct TimerController<S: PresetStore> {
    duration: FieldEditor,
    warn_time: FieldEditor,
    pub form: FormState,
    presets: PresetList<S>,
    sender: SyncSender,
}

impl<S: PresetStore> TimerController<S> {
    pub fn new(presets: PresetList<S>, sender: SyncSender) -> Self {
        let defaults = TimerConfig::default();
        let mut controller = Self {
            duration: FieldEditor::new(FieldShape::Hms, EditableField::new("")),
            warn_time: FieldEditor::new(FieldShape::Ms, EditableField::new("")),
            form: FormState::default(),
            presets,
            sender,
        };
        controller.load_config(&defaults);
        controller
    }

    pub fn presets(&self) -> &PresetList<S> {
        &self.presets
    }

    pub fn current_config(&self) -> TimerConfig {
        let form = &self.form;
        let raw = json!({
            "mode": form.mode.as_str(),
            "durationSec": self.duration.total_seconds(),
            "format": form.format.as_str(),
            "style": form.style,
            "warn": {
                "enabled": form.warn_enabled,
                "seconds": self.warn_time.total_seconds(),
                "colorEnabled": form.warn_color_enabled,
                "color": form.warn_color,
                "flashEnabled": form.flash_enabled,
                "flashRateMs": form.flash_rate_ms,
                "soundEnabled": form.warn_sound_enabled,
            },
            "sound": form.sound,
        });
        validate_config(&raw).unwrap_or_default()
    }

    pub fn send(&mut self, command: Command) -> Result<Delivery, ControllerError> {
        let config = self.current_config();
        Ok(self.sender.send(command, &config)?)
    }

    pub fn apply_preset(&mut self, index: usize) -> Result<(), ControllerError> {
        let config = self.presets.get(index)?.config.clone();
        self.load_config(&config);
        Ok(())
    }

    pub fn start_preset(&mut self, index: usize) -> Result<Delivery, ControllerError> {
        self.apply_preset(index)?;
        info!(index, "starting preset");
        self.send(Command::Start)
    }

    pub fn save_preset(&mut self, name: &str) -> Result<(), ControllerError> {
        let config = self.current_config();
        self.presets.save_current(name, config)?;
        Ok(())
    }

    /// Points the direct channel at a newly opened surface and resets it to the
    /// current form.
    pub fn open_output(&mut self, target: Sender<String>) -> Result<Delivery, ControllerError> {
        self.sender.attach_direct(target);
        self.send(Command::Reset)
    }

    pub fn preview(&self, now: NaiveTime) -> String {
        preview_text(&self.current_config(), now)
    }

    pub fn load_config(&mut self, config: &TimerConfig) {
        self.duration
            .set_text(&seconds_to_time_value(u64::from(config.duration_sec)));
        self.warn_time
            .set_text(&seconds_to_ms_value(u64::from(config.warn.seconds)));
        let warn = &config.warn;
        self.form = FormState {
            mode: config.mode,
            format: config.format,
            style: config.style.clone(),
            warn_enabled: warn.enabled,
            warn_color_enabled: warn.color_enabled,
            warn_color: warn.color.clone(),
            flash_enabled: warn.flash_enabled,
            flash_rate_ms: warn.flash_rate_ms,
            warn_sound_enabled: warn.sound_enabled,
            sound: config.sound.clone(),
        };
    }
}
