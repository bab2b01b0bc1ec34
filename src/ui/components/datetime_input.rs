use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
    Hour,
    Minute,
}

pub struct DateTimeInputState {
    pub value: NaiveDateTime,
    pub editing: bool,
    pub date_part: DatePart,
    pub current_input: String,
    /// All-day values only edit the date
    pub date_only: bool,
}

impl DateTimeInputState {
    pub fn new(value: NaiveDateTime) -> Self {
        Self {
            value,
            editing: false,
            date_part: DatePart::Year,
            current_input: String::new(),
            date_only: false,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            self.date_part = DatePart::Year;
            self.current_input.clear();
        }
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day if self.date_only => DatePart::Year,
            DatePart::Day => DatePart::Hour,
            DatePart::Hour => DatePart::Minute,
            DatePart::Minute => DatePart::Year,
        };
        self.current_input.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year if self.date_only => DatePart::Day,
            DatePart::Year => DatePart::Minute,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
            DatePart::Hour => DatePart::Day,
            DatePart::Minute => DatePart::Hour,
        };
        self.current_input.clear();
    }

    pub fn set_time(&mut self, time: NaiveTime) {
        self.value = self.value.date().and_time(time);
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.current_input.push(c);
                let width = if self.date_part == DatePart::Year { 4 } else { 2 };
                if self.current_input.len() < width {
                    return;
                }
                if let Ok(n) = self.current_input.parse::<u32>() {
                    if let Some(value) = self.with_part(n) {
                        self.value = value;
                    }
                }
                self.current_input.clear();
            }
            KeyCode::Backspace => {
                self.current_input.pop();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    fn with_part(&self, n: u32) -> Option<NaiveDateTime> {
        let date = self.value.date();
        let time = self.value.time();
        match self.date_part {
            DatePart::Year => {
                if !(1900..=2100).contains(&n) {
                    return None;
                }
                NaiveDate::from_ymd_opt(n as i32, date.month(), date.day()).map(|d| d.and_time(time))
            }
            DatePart::Month => NaiveDate::from_ymd_opt(date.year(), n, date.day()).map(|d| d.and_time(time)),
            DatePart::Day => NaiveDate::from_ymd_opt(date.year(), date.month(), n).map(|d| d.and_time(time)),
            DatePart::Hour => time.with_hour(n).map(|t| date.and_time(t)),
            DatePart::Minute => time.with_minute(n).map(|t| date.and_time(t)),
        }
    }

    pub fn get_display_string(&self) -> String {
        let year = format!("{:04}", self.value.year());
        let month = format!("{:02}", self.value.month());
        let day = format!("{:02}", self.value.day());
        let hour = format!("{:02}", self.value.hour());
        let minute = format!("{:02}", self.value.minute());

        if !self.editing {
            return if self.date_only {
                format!("{}-{}-{}", year, month, day)
            } else {
                format!("{}-{}-{} {}:{}", year, month, day, hour, minute)
            };
        }

        let marker = if !self.current_input.is_empty() {
            format!("[{}]", self.current_input)
        } else {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
                DatePart::Hour => "[hh]".to_string(),
                DatePart::Minute => "[mm]".to_string(),
            }
        };

        let mut parts = [year, month, day, hour, minute];
        let idx = self.date_part as usize;
        parts[idx] = format!("{}{}", parts[idx], marker);
        let [year, month, day, hour, minute] = parts;

        if self.date_only {
            format!("{}-{}-{}", year, month, day)
        } else {
            format!("{}-{}-{} {}:{}", year, month, day, hour, minute)
        }
    }
}
