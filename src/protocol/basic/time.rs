//! Text forms of the time types, ITU-T X.680, 46 to 48 and 38.4
//!
//! UTCTime and GeneralizedTime accept the local time form (no zone suffix), `Z` and a numeric
//! offset. Two digit UTCTime years 69 to 99 are in the 20th century, all others in the 21st.

use crate::protocol::basic::err::{Error, ErrorKind};
use crate::value::{Date, DateTime, TimeOfDay};

const UTC_TIME: &str = "UTCTime";
const GENERALIZED_TIME: &str = "GeneralizedTime";
const DATE: &str = "DATE";
const TIME_OF_DAY: &str = "TIME-OF-DAY";
const DATE_TIME: &str = "DATE-TIME";

const UTC_TIME_CENTURY_PIVOT: u16 = 69;

struct Cursor<'a> {
    text: &'a str,
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, position: 0 }
    }

    fn digits(&mut self, count: usize) -> Option<u32> {
        let part = self.text.get(self.position..self.position + count)?;
        if !part.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        self.position += count;
        part.parse().ok()
    }

    fn has_digits(&self) -> bool {
        self.peek().map(|byte| byte.is_ascii_digit()).unwrap_or(false)
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn is_done(&self) -> bool {
        self.position >= self.text.len()
    }

    /// `Z`, `+hh[mm]`, `-hh[mm]` or nothing, which must end the text
    fn zone(&mut self, minutes_required: bool) -> Option<Option<i16>> {
        let sign = match self.peek() {
            None => return Some(None),
            Some(b'Z') => {
                self.advance();
                return if self.is_done() { Some(Some(0)) } else { None };
            }
            Some(b'+') => 1,
            Some(b'-') => -1,
            Some(_) => return None,
        };
        self.advance();
        let hours = self.digits(2)?;
        let minutes = if minutes_required || self.has_digits() {
            self.digits(2)?
        } else {
            0
        };
        if hours > 23 || minutes > 59 || !self.is_done() {
            return None;
        }
        Some(Some(sign * (hours * 60 + minutes) as i16))
    }
}

fn invalid(type_label: &'static str, text: &str) -> Error {
    Error::from(ErrorKind::InvalidTime {
        type_label,
        text: text.to_string(),
    })
}

fn checked(type_label: &'static str, text: &str, value: DateTime) -> Result<DateTime, Error> {
    if value.date.is_valid() && value.time.is_valid() {
        Ok(value)
    } else {
        Err(invalid(type_label, text))
    }
}

fn format_zone(out: &mut String, utc_offset: Option<i16>) {
    match utc_offset {
        None => {}
        Some(0) => out.push('Z'),
        Some(minutes) => {
            let sign = if minutes < 0 { '-' } else { '+' };
            let minutes = minutes.unsigned_abs();
            out.push_str(&format!("{}{:02}{:02}", sign, minutes / 60, minutes % 60));
        }
    }
}

fn check_encodable(type_label: &'static str, value: &DateTime) -> Result<(), Error> {
    let offset_valid = value
        .utc_offset
        .map(|minutes| minutes.unsigned_abs() < 24 * 60)
        .unwrap_or(true);
    if value.date.is_valid() && value.time.is_valid() && offset_valid {
        Ok(())
    } else {
        Err(invalid(type_label, &format!("{:?}", value)))
    }
}

pub fn encode_utc_time(value: &DateTime) -> Result<String, Error> {
    check_encodable(UTC_TIME, value)?;
    let year = value.date.year;
    if year < 1900 + UTC_TIME_CENTURY_PIVOT || year >= 2000 + UTC_TIME_CENTURY_PIVOT {
        return Err(invalid(UTC_TIME, &value.date.to_string()));
    }
    let mut text = format!(
        "{:02}{:02}{:02}{:02}{:02}",
        year % 100,
        value.date.month,
        value.date.day,
        value.time.hour,
        value.time.minute
    );
    if value.time.second != 0 {
        text.push_str(&format!("{:02}", value.time.second));
    }
    format_zone(&mut text, value.utc_offset);
    Ok(text)
}

pub fn decode_utc_time(text: &str) -> Result<DateTime, Error> {
    let mut cursor = Cursor::new(text);
    let parsed = (|| {
        let year = cursor.digits(2)? as u16;
        let year = if year >= UTC_TIME_CENTURY_PIVOT {
            1900 + year
        } else {
            2000 + year
        };
        let month = cursor.digits(2)? as u8;
        let day = cursor.digits(2)? as u8;
        let hour = cursor.digits(2)? as u8;
        let minute = cursor.digits(2)? as u8;
        let second = if cursor.has_digits() {
            cursor.digits(2)? as u8
        } else {
            0
        };
        let utc_offset = cursor.zone(true)?;
        Some(DateTime {
            date: Date::new(year, month, day),
            time: TimeOfDay::new(hour, minute, second),
            microsecond: 0,
            utc_offset,
        })
    })();
    parsed
        .ok_or_else(|| invalid(UTC_TIME, text))
        .and_then(|value| checked(UTC_TIME, text, value))
}

pub fn encode_generalized_time(value: &DateTime) -> Result<String, Error> {
    check_encodable(GENERALIZED_TIME, value)?;
    let mut text = format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}",
        value.date.year,
        value.date.month,
        value.date.day,
        value.time.hour,
        value.time.minute,
        value.time.second
    );
    if value.microsecond != 0 {
        let fraction = format!("{:06}", value.microsecond.min(999_999));
        text.push('.');
        text.push_str(fraction.trim_end_matches('0'));
    }
    format_zone(&mut text, value.utc_offset);
    Ok(text)
}

pub fn decode_generalized_time(text: &str) -> Result<DateTime, Error> {
    let mut cursor = Cursor::new(text);
    let parsed = (|| {
        let year = cursor.digits(4)? as u16;
        let month = cursor.digits(2)? as u8;
        let day = cursor.digits(2)? as u8;
        let hour = cursor.digits(2)?;

        // the fraction applies to the last given component
        let mut components = vec![hour];
        while components.len() < 3 && cursor.has_digits() {
            components.push(cursor.digits(2)?);
        }
        let mut microseconds_total = 0u64;
        if let Some(b'.') | Some(b',') = cursor.peek() {
            cursor.advance();
            let start = cursor.position;
            while cursor.has_digits() {
                cursor.advance();
            }
            let digits = &cursor.text[start..cursor.position];
            if digits.is_empty() {
                return None;
            }
            let unit_seconds = match components.len() {
                1 => 3600,
                2 => 60,
                _ => 1,
            };
            let mut scale = unit_seconds * 1_000_000u64;
            for digit in digits.bytes().take(12) {
                scale /= 10;
                microseconds_total += u64::from(digit - b'0') * scale;
            }
        }
        let utc_offset = cursor.zone(false)?;

        let mut minute = u64::from(components.get(1).copied().unwrap_or(0));
        let mut second = u64::from(components.get(2).copied().unwrap_or(0));
        second += microseconds_total / 1_000_000;
        let microsecond = (microseconds_total % 1_000_000) as u32;
        minute += second / 60;
        second %= 60;

        Some(DateTime {
            date: Date::new(year, month, day),
            time: TimeOfDay::new(hour as u8, minute as u8, second as u8),
            microsecond,
            utc_offset,
        })
    })();
    parsed
        .ok_or_else(|| invalid(GENERALIZED_TIME, text))
        .and_then(|value| checked(GENERALIZED_TIME, text, value))
}

pub fn encode_date(value: &Date) -> Result<String, Error> {
    if value.is_valid() {
        Ok(format!("{:04}{:02}{:02}", value.year, value.month, value.day))
    } else {
        Err(invalid(DATE, &value.to_string()))
    }
}

pub fn decode_date(text: &str) -> Result<Date, Error> {
    let mut cursor = Cursor::new(text);
    let date = (|| {
        let date = Date::new(
            cursor.digits(4)? as u16,
            cursor.digits(2)? as u8,
            cursor.digits(2)? as u8,
        );
        Some(date).filter(|date| cursor.is_done() && date.is_valid())
    })();
    date.ok_or_else(|| invalid(DATE, text))
}

pub fn encode_time_of_day(value: &TimeOfDay) -> Result<String, Error> {
    if value.is_valid() {
        Ok(format!(
            "{:02}{:02}{:02}",
            value.hour, value.minute, value.second
        ))
    } else {
        Err(invalid(TIME_OF_DAY, &value.to_string()))
    }
}

pub fn decode_time_of_day(text: &str) -> Result<TimeOfDay, Error> {
    let mut cursor = Cursor::new(text);
    let time = (|| {
        let time = TimeOfDay::new(
            cursor.digits(2)? as u8,
            cursor.digits(2)? as u8,
            cursor.digits(2)? as u8,
        );
        Some(time).filter(|time| cursor.is_done() && time.is_valid())
    })();
    time.ok_or_else(|| invalid(TIME_OF_DAY, text))
}

pub fn encode_date_time(value: &DateTime) -> Result<String, Error> {
    let date = encode_date(&value.date).map_err(|_| invalid(DATE_TIME, &value.date.to_string()))?;
    let time =
        encode_time_of_day(&value.time).map_err(|_| invalid(DATE_TIME, &value.time.to_string()))?;
    Ok(date + &time)
}

pub fn decode_date_time(text: &str) -> Result<DateTime, Error> {
    let (date, time) = match (text.get(..8), text.get(8..)) {
        (Some(date), Some(time)) => (date, time),
        _ => return Err(invalid(DATE_TIME, text)),
    };
    let date = decode_date(date).map_err(|_| invalid(DATE_TIME, text))?;
    let time = decode_time_of_day(time).map_err(|_| invalid(DATE_TIME, text))?;
    Ok(DateTime::new(date, time))
}
