use chrono::NaiveTime;

use crate::config::model::{TimeFormat, TimerConfig, TimerMode};

pub fn format_duration(total_secs: u64, format: TimeFormat) -> String {
    match format {
        TimeFormat::HMmSs => {
            let hours = total_secs / 3600;
            let minutes = (total_secs % 3600) / 60;
            let seconds = total_secs % 60;
            format!("{hours}:{minutes:02}:{seconds:02}")
        }
        TimeFormat::MmSs => {
            let minutes = total_secs / 60;
            let seconds = total_secs % 60;
            format!("{minutes:02}:{seconds:02}")
        }
        TimeFormat::Ss => total_secs.to_string(),
    }
}

pub fn format_time_of_day(now: NaiveTime) -> String {
    now.format("%H:%M:%S").to_string()
}

pub fn preview_text(config: &TimerConfig, now: NaiveTime) -> String {
    let duration = u64::from(config.duration_sec);
    match config.mode {
        TimerMode::Countdown => format_duration(duration, config.format),
        TimerMode::Countup => format_duration(0, config.format),
        TimerMode::Tod => format_time_of_day(now),
        TimerMode::CountdownTod => format!(
            "{} | {}",
            format_duration(duration, config.format),
            format_time_of_day(now)
        ),
        TimerMode::CountupTod => format!(
            "{} | {}",
            format_duration(0, config.format),
            format_time_of_day(now)
        ),
        TimerMode::Hidden => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 5, 9).expect("valid time")
    }

    fn config(mode: TimerMode, format: TimeFormat, duration_sec: u32) -> TimerConfig {
        TimerConfig {
            mode,
            format,
            duration_sec,
            ..TimerConfig::default()
        }
    }

    #[test]
    fn duration_formats() {
        assert_eq!(format_duration(3725, TimeFormat::HMmSs), "1:02:05");
        assert_eq!(format_duration(3725, TimeFormat::MmSs), "62:05");
        assert_eq!(format_duration(65, TimeFormat::MmSs), "01:05");
        assert_eq!(format_duration(3725, TimeFormat::Ss), "3725");
        assert_eq!(format_duration(359_999, TimeFormat::HMmSs), "99:59:59");
    }

    #[test]
    fn modes() {
        let now = noon();
        assert_eq!(
            preview_text(&config(TimerMode::Countdown, TimeFormat::MmSs, 1200), now),
            "20:00"
        );
        assert_eq!(
            preview_text(&config(TimerMode::Countup, TimeFormat::HMmSs, 1200), now),
            "0:00:00"
        );
        assert_eq!(
            preview_text(&config(TimerMode::Tod, TimeFormat::Ss, 1200), now),
            "12:05:09"
        );
        assert_eq!(
            preview_text(&config(TimerMode::CountdownTod, TimeFormat::Ss, 90), now),
            "90 | 12:05:09"
        );
        assert_eq!(
            preview_text(&config(TimerMode::CountupTod, TimeFormat::MmSs, 90), now),
            "00:00 | 12:05:09"
        );
        assert_eq!(
            preview_text(&config(TimerMode::Hidden, TimeFormat::MmSs, 90), now),
            ""
        );
    }
}
