//! Native representation of ASN.1 values as produced by decoding and consumed by encoding.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt::{Display, Formatter};
use std::iter::FromIterator;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i128),
    Real(f64),
    Enumerated(String),
    Null,
    BitString(BitString),
    OctetString(Vec<u8>),
    ObjectIdentifier(String),
    String(String),
    UtcTime(DateTime),
    GeneralizedTime(DateTime),
    Date(Date),
    TimeOfDay(TimeOfDay),
    DateTime(DateTime),
    Sequence(Fields),
    SequenceOf(Vec<Value>),
    /// The selected alternative, or `None` for an unknown alternative of an extensible choice
    Choice(Option<(String, Box<Value>)>),
    /// A complete, uninterpreted encoding (tag, length and contents)
    Any(Vec<u8>),
}

impl Value {
    pub fn sequence<S: Into<String>, I: IntoIterator<Item = (S, Value)>>(fields: I) -> Self {
        Value::Sequence(fields.into_iter().collect())
    }

    pub fn choice<S: Into<String>>(name: S, value: Value) -> Self {
        Value::Choice(Some((name.into(), Box::new(value))))
    }

    pub fn enumerated<S: Into<String>>(label: S) -> Self {
        Value::Enumerated(label.into())
    }

    pub fn string<S: Into<String>>(text: S) -> Self {
        Value::String(text.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Real(_) => "Real",
            Value::Enumerated(_) => "Enumerated",
            Value::Null => "Null",
            Value::BitString(_) => "BitString",
            Value::OctetString(_) => "OctetString",
            Value::ObjectIdentifier(_) => "ObjectIdentifier",
            Value::String(_) => "String",
            Value::UtcTime(_) => "UtcTime",
            Value::GeneralizedTime(_) => "GeneralizedTime",
            Value::Date(_) => "Date",
            Value::TimeOfDay(_) => "TimeOfDay",
            Value::DateTime(_) => "DateTime",
            Value::Sequence(_) => "Sequence",
            Value::SequenceOf(_) => "SequenceOf",
            Value::Choice(_) => "Choice",
            Value::Any(_) => "Any",
        }
    }

    /// The text used to select an `ANY DEFINED BY` alternative when this value is the governing
    /// member
    pub(crate) fn selector(&self) -> Option<String> {
        match self {
            Value::Integer(value) => Some(value.to_string()),
            Value::Enumerated(text) | Value::ObjectIdentifier(text) | Value::String(text) => {
                Some(text.clone())
            }
            _ => None,
        }
    }
}

/// The member values of a SEQUENCE or SET, in the order they were inserted.
///
/// Equality does not depend on that order:
/// ```rust
/// use asn1ber::value::{Fields, Value};
/// let a: Fields = vec![("a", Value::Integer(1)), ("b", Value::Null)].into_iter().collect();
/// let b: Fields = vec![("b", Value::Null), ("a", Value::Integer(1))].into_iter().collect();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Fields(Vec<(String, Value)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replaces the value of an already present member in place
    pub fn insert<S: Into<String>>(&mut self, name: S, value: Value) {
        let name = name.into();
        match self.0.iter_mut().find(|(field, _)| *field == name) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|(name, _)| name.clone()).collect()
    }
}

impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.get(name) == Some(value))
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// ITU-T X.680 | ISO/IEC 8824-1, 22
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BitString {
    pub data: Vec<u8>,
    pub bits: usize,
}

impl BitString {
    pub fn new(data: Vec<u8>, bits: usize) -> Self {
        Self { data, bits }
    }

    /// Parses a string of binary digits, most significant bit first
    ///
    /// ```rust
    /// use asn1ber::value::BitString;
    /// assert_eq!(Some(BitString::new(vec![0b0101_1000], 5)), BitString::from_binary("01011"));
    /// assert_eq!(None, BitString::from_binary("012"));
    /// ```
    pub fn from_binary(digits: &str) -> Option<Self> {
        let mut data = vec![0u8; (digits.len() + 7) / 8];
        for (index, digit) in digits.chars().enumerate() {
            match digit {
                '0' => {}
                '1' => data[index / 8] |= 0x80 >> (index % 8),
                _ => return None,
            }
        }
        Some(Self::new(data, digits.len()))
    }

    /// The bytes actually covered by `bits`, with the unused trailing bits of the last byte
    /// cleared. `None` if `data` is too short for `bits`.
    pub fn masked(&self) -> Option<Vec<u8>> {
        let (full_bytes, rest_bits) = (self.bits / 8, self.bits % 8);
        let byte_len = full_bytes + usize::from(rest_bits != 0);
        let mut data = self.data.get(..byte_len)?.to_vec();
        if rest_bits != 0 {
            data[full_bytes] &= !(0xff >> rest_bits);
        }
        Some(data)
    }

    /// Normalizes the value for comparison. With named bits, trailing zero bits carry no
    /// meaning (ITU-T X.680, 22.7) and are stripped as well.
    pub fn clean(&self, has_named_bits: bool) -> Self {
        let mut data = self.masked().unwrap_or_else(|| self.data.clone());
        let mut bits = self.bits.min(data.len() * 8);
        if has_named_bits {
            while let Some(0) = data.last() {
                data.pop();
            }
            bits = match data.last() {
                Some(last) => (data.len() - 1) * 8 + (8 - last.trailing_zeros() as usize),
                None => 0,
            };
        }
        Self { data, bits }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl Date {
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    pub(crate) fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month) && self.day >= 1 && self.day <= self.days_in_month()
    }

    fn days_in_month(&self) -> u8 {
        match self.month {
            4 | 6 | 9 | 11 => 30,
            2 if self.is_leap_year() => 29,
            2 => 28,
            _ => 31,
        }
    }

    fn is_leap_year(&self) -> bool {
        let year = self.year;
        (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
    }
}

impl Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.hour < 24 && self.minute < 60 && self.second < 60
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateTime {
    pub date: Date,
    pub time: TimeOfDay,
    pub microsecond: u32,
    /// Minutes east of UTC, `None` for local time
    pub utc_offset: Option<i16>,
}

impl DateTime {
    pub fn new(date: Date, time: TimeOfDay) -> Self {
        Self {
            date,
            time,
            microsecond: 0,
            utc_offset: None,
        }
    }

    pub fn utc(date: Date, time: TimeOfDay) -> Self {
        Self::new(date, time).with_utc_offset(0)
    }

    pub fn with_utc_offset(mut self, minutes: i16) -> Self {
        self.utc_offset = Some(minutes);
        self
    }

    pub fn with_microsecond(mut self, microsecond: u32) -> Self {
        self.microsecond = microsecond;
        self
    }
}
