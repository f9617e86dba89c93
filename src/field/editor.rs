use tracing::trace;

use crate::field::format::{
    TimeComponents, format_components, format_ms_value, ms_value_to_seconds, parse_ms_value,
    parse_time_value, time_value_to_seconds,
};
use crate::field::section::FieldShape;
use crate::field::smart::{find_loose_ms, parse_smart_duration};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldEvent {
    Click { at: usize },
    DoubleClick { at: usize },
    ArrowLeft,
    ArrowRight,
    Tab,
    Backspace,
    Delete,
    Key { ch: char, modifier: bool },
    Paste(String),
    Blur,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Disposition {
    Consumed,
    PassThrough,
}

pub trait TextField {
    fn value(&self) -> &str;
    fn set_value(&mut self, value: String);
    fn selection(&self) -> (usize, usize);
    fn set_selection(&mut self, start: usize, end: usize);
    fn notify_changed(&mut self);

    fn native_default(&mut self, _event: &FieldEvent) {}
}

pub type ChangeObserver = Box<dyn FnMut(&str)>;

pub struct EditableField {
    value: String,
    selection_start: usize,
    selection_end: usize,
    observers: Vec<ChangeObserver>,
}

impl EditableField {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            selection_start: 0,
            selection_end: 0,
            observers: Vec::new(),
        }
    }

    pub fn with_selection(mut self, start: usize, end: usize) -> Self {
        self.set_selection(start, end);
        self
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&str) + 'static) {
        self.observers.push(Box::new(observer));
    }
}

impl std::fmt::Debug for EditableField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditableField")
            .field("value", &self.value)
            .field("selection_start", &self.selection_start)
            .field("selection_end", &self.selection_end)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl TextField for EditableField {
    fn value(&self) -> &str {
        &self.value
    }

    fn set_value(&mut self, value: String) {
        if value != self.value {
            self.value = value;
            let len = self.value.chars().count();
            self.selection_start = len;
            self.selection_end = len;
        }
    }

    fn selection(&self) -> (usize, usize) {
        (self.selection_start, self.selection_end)
    }

    fn set_selection(&mut self, start: usize, end: usize) {
        let len = self.value.chars().count();
        let start = start.min(len);
        self.selection_start = start;
        self.selection_end = end.clamp(start, len);
    }

    fn notify_changed(&mut self) {
        for observer in &mut self.observers {
            observer(&self.value);
        }
    }

    fn native_default(&mut self, event: &FieldEvent) {
        let (start, end) = self.selection();
        match event {
            FieldEvent::ArrowLeft => {
                let caret = if start != end { start } else { start.saturating_sub(1) };
                self.set_selection(caret, caret);
            }
            FieldEvent::ArrowRight => {
                let caret = if start != end { end } else { end + 1 };
                self.set_selection(caret, caret);
            }
            _ => {}
        }
    }
}

/// Digit entry reparses and clamps the whole field. Backspace and Delete only zero
/// a single digit and do not reparse.
#[derive(Debug)]
pub struct FieldEditor<F: TextField = EditableField> {
    shape: FieldShape,
    field: F,
}

impl<F: TextField> FieldEditor<F> {
    pub fn new(shape: FieldShape, field: F) -> Self {
        Self { shape, field }
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    pub fn value(&self) -> &str {
        self.field.value()
    }

    pub fn set_text(&mut self, text: &str) {
        let canonical = self.reformat(text);
        self.field.set_value(canonical);
    }

    pub fn total_seconds(&self) -> u64 {
        match self.shape {
            FieldShape::Hms => time_value_to_seconds(self.field.value()),
            FieldShape::Ms => ms_value_to_seconds(self.field.value()),
        }
    }

    pub fn dispatch(&mut self, event: &FieldEvent) -> Disposition {
        let disposition = self.handle(event);
        if disposition == Disposition::PassThrough {
            self.field.native_default(event);
        }
        disposition
    }

    pub fn handle(&mut self, event: &FieldEvent) -> Disposition {
        match event {
            FieldEvent::Click { at } => {
                let caret = if self.shape.is_colon(*at) { at + 1 } else { *at };
                self.field.set_selection(caret, caret);
                Disposition::Consumed
            }
            FieldEvent::DoubleClick { at } => {
                let (start, end) = self.shape.range_at(*at);
                self.field.set_selection(start, end);
                Disposition::Consumed
            }
            FieldEvent::ArrowLeft => self.arrow_left(),
            FieldEvent::ArrowRight => self.arrow_right(),
            FieldEvent::Tab => Disposition::PassThrough,
            FieldEvent::Key { ch: 'a', modifier: true } => {
                let (caret, _) = self.field.selection();
                let (start, end) = self.shape.range_at(caret);
                self.field.set_selection(start, end);
                Disposition::Consumed
            }
            FieldEvent::Key { modifier: true, .. } => Disposition::PassThrough,
            FieldEvent::Key { ch, modifier: false } => {
                if ch.is_ascii_digit() {
                    self.type_digit(*ch);
                }
                Disposition::Consumed
            }
            FieldEvent::Backspace => {
                self.backspace();
                Disposition::Consumed
            }
            FieldEvent::Delete => {
                self.delete();
                Disposition::Consumed
            }
            FieldEvent::Paste(text) => {
                self.paste(text);
                Disposition::Consumed
            }
            FieldEvent::Blur => {
                self.blur();
                Disposition::PassThrough
            }
        }
    }

    fn arrow_left(&mut self) -> Disposition {
        let (caret, _) = self.field.selection();
        let section = self.shape.section_at(caret);
        let (start, _) = self.shape.range(section);
        if caret > start {
            return Disposition::PassThrough;
        }
        if let Some(target) = self.shape.prev_section_end(section) {
            self.field.set_selection(target, target);
        }
        Disposition::Consumed
    }

    fn arrow_right(&mut self) -> Disposition {
        let (caret, _) = self.field.selection();
        let section = self.shape.section_at(caret);
        let (_, end) = self.shape.range(section);
        if caret < end {
            return Disposition::PassThrough;
        }
        if let Some(target) = self.shape.next_section_start(section) {
            self.field.set_selection(target, target);
        }
        Disposition::Consumed
    }

    fn type_digit(&mut self, digit: char) {
        let (caret, selection_end) = self.field.selection();
        let (start, end) = self.shape.range_at(caret);

        if selection_end > caret {
            let mut chars = self.editable_chars(end);
            chars[start..end].fill('0');
            chars[start] = digit;
            self.commit_reformatted(&chars, start + 1);
            return;
        }

        if caret < end {
            let mut chars = self.editable_chars(caret + 1);
            chars[caret] = digit;
            let mut next = caret + 1;
            if self.shape.is_colon(next) {
                next += 1;
            }
            self.commit_reformatted(&chars, next.min(self.shape.last_position()));
        }
    }

    fn backspace(&mut self) {
        let (caret, _) = self.field.selection();
        let (start, _) = self.shape.range_at(caret);
        if caret > start {
            let target = caret - 1;
            let mut chars = self.editable_chars(caret);
            chars[target] = '0';
            self.field.set_value(chars.into_iter().collect());
            self.field.set_selection(target, target);
            self.field.notify_changed();
        }
    }

    fn delete(&mut self) {
        let (caret, _) = self.field.selection();
        let (_, end) = self.shape.range_at(caret);
        if caret < end {
            let mut chars = self.editable_chars(caret + 1);
            chars[caret] = '0';
            self.field.set_value(chars.into_iter().collect());
            self.field.set_selection(caret, caret);
            self.field.notify_changed();
        }
    }

    fn paste(&mut self, text: &str) {
        let formatted = match self.shape {
            FieldShape::Hms => parse_smart_duration(text).map(format_components),
            FieldShape::Ms => find_loose_ms(text).map(|time| format_ms_value(time.m, time.s)),
        };
        match formatted {
            Some(value) => {
                self.field.set_value(value);
                self.field.notify_changed();
            }
            None => trace!(text, "ignored unparseable paste"),
        }
    }

    fn blur(&mut self) {
        let current = self.field.value().to_string();
        let canonical = match self.shape {
            FieldShape::Hms => parse_smart_duration(&current)
                .map(format_components)
                .unwrap_or_else(|| self.reformat(&current)),
            FieldShape::Ms => self.reformat(&current),
        };
        self.field.set_value(canonical);
    }

    fn commit_reformatted(&mut self, chars: &[char], caret: usize) {
        let edited: String = chars.iter().collect();
        let canonical = self.reformat(&edited);
        self.field.set_value(canonical);
        self.field.set_selection(caret, caret);
        self.field.notify_changed();
    }

    fn strict_parse(&self, text: &str) -> TimeComponents {
        match self.shape {
            FieldShape::Hms => parse_time_value(text),
            FieldShape::Ms => parse_ms_value(text),
        }
    }

    fn reformat(&self, text: &str) -> String {
        let time = self.strict_parse(text);
        match self.shape {
            FieldShape::Hms => format_components(time),
            FieldShape::Ms => format_ms_value(time.m, time.s),
        }
    }

    fn editable_chars(&self, min_len: usize) -> Vec<char> {
        let mut chars: Vec<char> = self.field.value().chars().collect();
        while chars.len() < min_len {
            let next = if self.shape.is_colon(chars.len()) { ':' } else { '0' };
            chars.push(next);
        }
        chars
    }
}
