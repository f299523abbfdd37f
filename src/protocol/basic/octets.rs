//! Encoding and decoding of the primitive building blocks of ITU-T X.690: identifier octets,
//! length octets and the contents octets of INTEGER, REAL and OBJECT IDENTIFIER.
//!
//! All functions operate on a complete in-memory buffer and an offset into it, returning the
//! offset of the first byte after what was read.
#![allow(clippy::unusual_byte_groupings)]

use crate::protocol::basic::err::{Error, ErrorKind};
use asn1ber_model::{Class, Tag};
use byteorder::{BigEndian, ByteOrder};

const CLASS_BITS_UNIVERSAL: u8 = 0b_00_000000;
const CLASS_BITS_APPLICATION: u8 = 0b_01_000000;
const CLASS_BITS_CONTEXT_SPECIFIC: u8 = 0b_10_000000;
const CLASS_BITS_PRIVATE: u8 = 0b_11_000000;

pub const FLAG_PRIMITIVE: u8 = 0b_00_0_00000;
pub const FLAG_CONSTRUCTED: u8 = 0b_00_1_00000;

const TAG_NUMBER_MASK: u8 = 0b_00_0_11111;
const TAG_NUMBER_SHORT_MAX_VALUE: usize = 30;
const SUBSEQUENT_BIT_MORE: u8 = 0b1_0000000;
const SUBSEQUENT_VALUE_MASK: u8 = 0b0_1111111;

const LENGTH_SHORT_MAX_VALUE: usize = 127;
const LENGTH_BIT_MASK: u8 = 0b1_0000000;
const LENGTH_BIT_LONG_FORM: u8 = 0b1_0000000;
const LENGTH_INDEFINITE: u8 = 0b1_0000000;

pub const END_OF_CONTENTS: [u8; 2] = [0x00, 0x00];

/// The deepest nesting of elements, or of type nodes while decoding, before decoding fails
pub const MAX_NESTING_DEPTH: usize = 256;

const REAL_BINARY: u8 = 0b1_0_00_00_00;
const REAL_SPECIAL: u8 = 0b0_1_00_00_00;
const REAL_NEGATIVE: u8 = 0b0_1_00_00_00;
const REAL_BASE_MASK: u8 = 0b0_0_11_00_00;
const REAL_SCALE_MASK: u8 = 0b0_0_00_11_00;
const REAL_EXPONENT_FORMAT_MASK: u8 = 0b0_0_00_00_11;
const REAL_PLUS_INFINITY: u8 = 0x40;
const REAL_MINUS_INFINITY: u8 = 0x41;
const REAL_NOT_A_NUMBER: u8 = 0x42;
const REAL_MINUS_ZERO: u8 = 0x43;

fn class_bits(class: Class) -> u8 {
    match class {
        Class::Universal => CLASS_BITS_UNIVERSAL,
        Class::Application => CLASS_BITS_APPLICATION,
        Class::ContextSpecific => CLASS_BITS_CONTEXT_SPECIFIC,
        Class::Private => CLASS_BITS_PRIVATE,
    }
}

/// ITU-T X.690, 8.1.2: the number is stored in the low five bits of the first identifier octet if
/// it is lower than 31, otherwise in base 128 in the subsequent octets (8.1.2.4)
///
/// ```rust
/// use asn1ber::protocol::basic::octets::{encode_tag, FLAG_CONSTRUCTED};
/// assert_eq!(vec![0x30], encode_tag(16, FLAG_CONSTRUCTED));
/// assert_eq!(vec![0x1f, 0x81, 0x00], encode_tag(128, 0));
/// ```
pub fn encode_tag(number: usize, flags: u8) -> Vec<u8> {
    if number <= TAG_NUMBER_SHORT_MAX_VALUE {
        vec![flags | number as u8]
    } else {
        let mut encoded = vec![flags | TAG_NUMBER_MASK];
        write_base128(&mut encoded, number as u128);
        encoded
    }
}

/// The identifier octets of `tag`, including the class bits and the primitive/constructed bit
pub fn encode_identifier(tag: Tag, constructed: bool) -> Vec<u8> {
    let mut flags = class_bits(tag.class());
    if constructed {
        flags |= FLAG_CONSTRUCTED;
    }
    encode_tag(tag.number(), flags)
}

/// Whether the first identifier octet has the constructed bit set
#[inline]
pub fn is_constructed(identifier: &[u8]) -> bool {
    identifier
        .first()
        .map(|byte| byte & FLAG_CONSTRUCTED != 0)
        .unwrap_or(false)
}

/// Returns the identifier octets at `offset` and the offset after them
pub fn read_tag(data: &[u8], offset: usize) -> Result<(&[u8], usize), Error> {
    let first = *data
        .get(offset)
        .ok_or_else(|| Error::out_of_data("tag", offset))?;
    let mut end = offset + 1;
    if first & TAG_NUMBER_MASK == TAG_NUMBER_MASK {
        loop {
            let byte = *data
                .get(end)
                .ok_or_else(|| Error::out_of_data("tag", offset))?;
            end += 1;
            if byte & SUBSEQUENT_BIT_MORE == 0 {
                break;
            }
        }
    }
    Ok((&data[offset..end], end))
}

/// Like [`read_tag`], but also fails if there is no length octet after the tag
pub fn skip_tag(data: &[u8], offset: usize) -> Result<usize, Error> {
    let (_, end) = read_tag(data, offset)?;
    if end >= data.len() {
        Err(Error::out_of_data("tag", offset))
    } else {
        Ok(end)
    }
}

/// Upper case hex of the given bytes, as used in tag error messages
pub fn format_bytes(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{:02X}", byte)).collect()
}

/// ITU-T X.690, 8.1.3: short form (8.1.3.4) up to 127, long form (8.1.3.5) otherwise
pub fn write_length(out: &mut Vec<u8>, length: usize) {
    if length <= LENGTH_SHORT_MAX_VALUE {
        out.push(length as u8);
    } else {
        let length = length as u64;
        let leading_zero_bytes = length.leading_zeros() / 8;
        let len_bytes = 8 - leading_zero_bytes as usize;
        let mut bytes = [0u8; 8];
        BigEndian::write_u64(&mut bytes, length);
        out.push(LENGTH_BIT_LONG_FORM | len_bytes as u8);
        out.extend_from_slice(&bytes[8 - len_bytes..]);
    }
}

pub fn encode_length_definite(length: usize) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(9);
    write_length(&mut encoded, length);
    encoded
}

/// Writes a complete definite length TLV
pub fn write_tlv(out: &mut Vec<u8>, tag: &[u8], contents: &[u8]) {
    out.extend_from_slice(tag);
    write_length(out, contents.len());
    out.extend_from_slice(contents);
}

/// Reads the length octets at `offset`. `None` is an indefinite length (8.1.3.6), only accepted
/// if `enforce_definite` is not set. For a definite length, the data is checked to hold at least
/// that many contents octets.
pub fn decode_length(
    data: &[u8],
    offset: usize,
    enforce_definite: bool,
) -> Result<(Option<usize>, usize), Error> {
    let first = *data
        .get(offset)
        .ok_or_else(|| Error::out_of_data("length", offset))?;
    let mut offset = offset + 1;

    let length = if first == LENGTH_INDEFINITE {
        if enforce_definite {
            return Err(Error::expected_definite_length(offset - 1));
        }
        return Ok((None, offset));
    } else if first & LENGTH_BIT_MASK == LENGTH_BIT_LONG_FORM {
        let byte_count = usize::from(first & !LENGTH_BIT_MASK);
        if byte_count > std::mem::size_of::<u64>() {
            return Err(Error::unsupported_length_size(byte_count, offset - 1));
        }
        let available = data.len().saturating_sub(offset);
        if available < byte_count {
            return Err(Error::length_out_of_data(byte_count, available, offset));
        }
        let length = BigEndian::read_uint(&data[offset..offset + byte_count], byte_count);
        offset += byte_count;
        length as usize
    } else {
        usize::from(first)
    };

    let available = data.len() - offset;
    if available < length {
        Err(Error::missing_contents(length, available, offset))
    } else {
        Ok((Some(length), offset))
    }
}

#[inline]
pub fn is_end_of_contents(data: &[u8], offset: usize) -> bool {
    data.get(offset..offset + END_OF_CONTENTS.len()) == Some(&END_OF_CONTENTS[..])
}

/// Returns the offset after the complete element at `offset`, walking nested indefinite length
/// encodings until their end-of-contents octets
pub fn skip_element(data: &[u8], mut offset: usize) -> Result<usize, Error> {
    // indefinite length elements still waiting for their end-of-contents octets
    let mut open = 0_usize;
    loop {
        if open > 0 && is_end_of_contents(data, offset) {
            offset += END_OF_CONTENTS.len();
            open -= 1;
        } else if open > 0 && offset >= data.len() {
            return Err(Error::no_end_of_contents(offset));
        } else {
            let length_offset = skip_tag(data, offset)?;
            match decode_length(data, length_offset, false)? {
                (Some(length), start) => offset = start + length,
                (None, start) => {
                    if open == MAX_NESTING_DEPTH {
                        return Err(Error::nesting_too_deep(MAX_NESTING_DEPTH, offset));
                    }
                    open += 1;
                    offset = start;
                }
            }
        }
        if open == 0 {
            return Ok(offset);
        }
    }
}

/// ITU-T X.690, 8.3: minimal two's complement, big endian
///
/// ```rust
/// use asn1ber::protocol::basic::octets::encode_signed_integer;
/// assert_eq!(vec![0xff, 0x7f], encode_signed_integer(-129));
/// assert_eq!(vec![0x00, 0x80], encode_signed_integer(128));
/// assert_eq!(vec![0x00], encode_signed_integer(0));
/// ```
pub fn encode_signed_integer(value: i128) -> Vec<u8> {
    let magnitude = if value < 0 { !value } else { value };
    let significant_bits = 128 - magnitude.leading_zeros() as usize;
    let byte_len = significant_bits / 8 + 1;
    let bytes = value.to_be_bytes();
    bytes[bytes.len() - byte_len..].to_vec()
}

pub fn decode_signed_integer(contents: &[u8], offset: usize) -> Result<i128, Error> {
    match contents.len() {
        0 => Ok(0),
        len if len > 16 => Err(Error::malformed(ErrorKind::IntegerTooLarge(len), offset)),
        len => Ok(BigEndian::read_int128(contents, len)),
    }
}

/// ITU-T X.690, 8.5: binary encoding with base 2 and a scale factor of 0, the mantissa being odd
/// unless zero. The special values use the single octets of 8.5.9.
pub fn encode_real(value: f64) -> Result<Vec<u8>, Error> {
    if value.is_nan() {
        return Ok(vec![REAL_NOT_A_NUMBER]);
    } else if value.is_infinite() {
        return Ok(vec![if value > 0.0 {
            REAL_PLUS_INFINITY
        } else {
            REAL_MINUS_INFINITY
        }]);
    } else if value == 0.0 {
        return Ok(Vec::new());
    }

    let bits = value.to_bits();
    let negative = bits >> 63 != 0;
    let biased_exponent = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & 0x000f_ffff_ffff_ffff;

    let (mut mantissa, mut exponent) = if biased_exponent == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased_exponent - 1075)
    };
    let lowest_set_bit = mantissa.trailing_zeros();
    mantissa >>= lowest_set_bit;
    exponent += i64::from(lowest_set_bit);

    let sign = if negative { REAL_NEGATIVE } else { 0 };
    let mut encoded = Vec::with_capacity(11);
    if exponent >= i64::from(i8::MIN) && exponent <= i64::from(i8::MAX) {
        encoded.push(REAL_BINARY | sign);
        encoded.push(exponent as i8 as u8);
    } else if exponent >= i64::from(i16::MIN) && exponent <= i64::from(i16::MAX) {
        encoded.push(REAL_BINARY | sign | 0b01);
        encoded.extend_from_slice(&(exponent as i16).to_be_bytes());
    } else {
        return Err(ErrorKind::RealExponentOutOfRange(exponent).into());
    }

    let mantissa_bits = 64 - mantissa.leading_zeros() as usize;
    let mantissa_bytes = mantissa_bits / 8 + 1;
    encoded.extend_from_slice(&mantissa.to_be_bytes()[8 - mantissa_bytes..]);
    Ok(encoded)
}

pub fn decode_real(contents: &[u8], offset: usize) -> Result<f64, Error> {
    let control = match contents.first() {
        None => return Ok(0.0),
        Some(control) => *control,
    };
    if control & REAL_BINARY != 0 {
        decode_real_binary(control, contents, offset)
    } else if control & REAL_SPECIAL != 0 {
        match control {
            REAL_PLUS_INFINITY => Ok(f64::INFINITY),
            REAL_MINUS_INFINITY => Ok(f64::NEG_INFINITY),
            REAL_NOT_A_NUMBER => Ok(f64::NAN),
            REAL_MINUS_ZERO => Ok(-0.0),
            control => Err(Error::malformed(
                ErrorKind::UnsupportedRealControl {
                    form: "special",
                    control,
                },
                offset,
            )),
        }
    } else {
        // ISO 6093 NR1, NR2 or NR3 with either decimal mark
        let text = String::from_utf8_lossy(&contents[1..]).replace(',', ".");
        text.trim()
            .parse::<f64>()
            .map_err(|_| Error::malformed(ErrorKind::InvalidDecimalReal(text.clone()), offset))
    }
}

fn decode_real_binary(control: u8, contents: &[u8], offset: usize) -> Result<f64, Error> {
    let unsupported = || {
        Error::malformed(
            ErrorKind::UnsupportedRealControl {
                form: "binary",
                control,
            },
            offset,
        )
    };
    let base_bits = match (control & REAL_BASE_MASK) >> 4 {
        0 => 1,
        1 => 3,
        2 => 4,
        _ => return Err(unsupported()),
    };
    let scale = i64::from((control & REAL_SCALE_MASK) >> 2);
    let (exponent_start, exponent_len) = match control & REAL_EXPONENT_FORMAT_MASK {
        0 => (1, 1),
        1 => (1, 2),
        2 => (1, 3),
        _ => (2, usize::from(*contents.get(1).ok_or_else(unsupported)?)),
    };
    if exponent_len == 0 || exponent_len > 8 || contents.len() < exponent_start + exponent_len {
        return Err(unsupported());
    }
    let exponent = BigEndian::read_int(
        &contents[exponent_start..exponent_start + exponent_len],
        exponent_len,
    );

    let mantissa = contents[exponent_start + exponent_len..]
        .iter()
        .fold(0.0f64, |mantissa, byte| mantissa * 256.0 + f64::from(*byte));

    let power = exponent
        .checked_mul(base_bits)
        .and_then(|power| power.checked_add(scale))
        .ok_or_else(unsupported)?;
    let decoded = scale_by_power_of_two(mantissa, power);
    Ok(if control & REAL_NEGATIVE != 0 {
        -decoded
    } else {
        decoded
    })
}

/// `value * 2^power` without the intermediate power overflowing or underflowing on its own
fn scale_by_power_of_two(value: f64, power: i64) -> f64 {
    let power = power.max(-4000).min(4000) as i32;
    let half = power / 2;
    value * 2f64.powi(half) * 2f64.powi(power - half)
}

/// ITU-T X.690, 8.19
///
/// ```rust
/// use asn1ber::protocol::basic::octets::encode_object_identifier;
/// assert_eq!(
///     vec![0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d],
///     encode_object_identifier("1.2.840.113549").unwrap()
/// );
/// ```
pub fn encode_object_identifier(text: &str) -> Result<Vec<u8>, Error> {
    let invalid = || Error::from(ErrorKind::InvalidObjectIdentifier(text.to_string()));
    let arcs = text
        .split('.')
        .map(|arc| arc.trim().parse::<u128>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    if arcs.len() < 2 {
        return Err(invalid());
    }

    let first = arcs[0]
        .checked_mul(40)
        .and_then(|first| first.checked_add(arcs[1]))
        .ok_or_else(invalid)?;
    let mut encoded = Vec::with_capacity(arcs.len() * 2);
    write_base128(&mut encoded, first);
    for arc in &arcs[2..] {
        write_base128(&mut encoded, *arc);
    }
    Ok(encoded)
}

pub fn decode_object_identifier(contents: &[u8], offset: usize) -> Result<String, Error> {
    let invalid = || Error::malformed(ErrorKind::InvalidObjectIdentifierContents, offset);
    let mut subidentifiers = Vec::new();
    let mut position = 0;
    while position < contents.len() {
        let (value, next) = read_base128(contents, position).ok_or_else(invalid)?;
        subidentifiers.push(value);
        position = next;
    }

    let first = *subidentifiers.first().ok_or_else(invalid)?;
    let head = (first / 40).min(2);
    let mut arcs = vec![head, first - head * 40];
    arcs.extend_from_slice(&subidentifiers[1..]);
    Ok(arcs
        .iter()
        .map(u128::to_string)
        .collect::<Vec<_>>()
        .join("."))
}

fn write_base128(out: &mut Vec<u8>, value: u128) {
    let mut septets = vec![(value as u8) & SUBSEQUENT_VALUE_MASK];
    let mut value = value >> 7;
    while value > 0 {
        septets.push(SUBSEQUENT_BIT_MORE | ((value as u8) & SUBSEQUENT_VALUE_MASK));
        value >>= 7;
    }
    out.extend(septets.iter().rev());
}

fn read_base128(data: &[u8], mut offset: usize) -> Option<(u128, usize)> {
    let mut value = 0u128;
    loop {
        let byte = *data.get(offset)?;
        offset += 1;
        value = value.checked_mul(128)? | u128::from(byte & SUBSEQUENT_VALUE_MASK);
        if byte & SUBSEQUENT_BIT_MORE == 0 {
            return Some((value, offset));
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    fn write_read_length_check(len: usize) {
        let mut buffer = Vec::new();
        write_length(&mut buffer, len);
        let header = buffer.len();
        // the contents octets must be present for the length to decode
        let padded = if len <= 1024 {
            buffer.resize(header + len, 0);
            buffer
        } else {
            buffer
        };
        match decode_length(&padded, 0, true) {
            Ok((Some(decoded), offset)) => {
                assert_eq!(len, decoded);
                assert_eq!(header, offset);
            }
            Err(e) => match e.kind() {
                ErrorKind::MissingContents { expected, .. } => assert_eq!(len, *expected),
                _ => panic!("Unexpected error {}", e),
            },
            Ok((None, _)) => panic!("Unexpected indefinite length"),
        }
    }

    #[test]
    pub fn test_length_bounds() {
        write_read_length_check(0);
        write_read_length_check(LENGTH_SHORT_MAX_VALUE - 1);
        write_read_length_check(LENGTH_SHORT_MAX_VALUE);
        write_read_length_check(LENGTH_SHORT_MAX_VALUE + 1);
        write_read_length_check(u8::MAX as usize - 1);
        write_read_length_check(u8::MAX as usize);
        write_read_length_check(u8::MAX as usize + 1);
        write_read_length_check(u16::MAX as usize - 1);
        write_read_length_check(u16::MAX as usize);
        write_read_length_check(u16::MAX as usize + 1);
        write_read_length_check(u32::MAX as usize - 1);
        write_read_length_check(u32::MAX as usize);
    }

    #[test]
    pub fn test_length_forms() {
        assert_eq!(vec![0x7f], encode_length_definite(127));
        assert_eq!(vec![0x81, 0x80], encode_length_definite(128));
        assert_eq!(vec![0x82, 0x01, 0x00], encode_length_definite(256));
    }

    #[test]
    pub fn test_indefinite_length() {
        assert_eq!((None, 1), decode_length(&[0x80], 0, false).unwrap());
        let e = decode_length(&[0x80], 0, true).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::ExpectedDefiniteLength));
    }

    #[test]
    pub fn test_length_out_of_data() {
        let e = decode_length(&[0x82, 0x01], 0, true).unwrap_err();
        match e.kind() {
            ErrorKind::LengthOutOfData { expected, got } => {
                assert_eq!(2, *expected);
                assert_eq!(1, *got);
            }
            _ => panic!("Unexpected error {}", e),
        }

        let e = decode_length(&[0x05, 0x01, 0x02], 0, true).unwrap_err();
        assert_eq!(Some(1), e.offset());
        match e.kind() {
            ErrorKind::MissingContents { expected, got } => {
                assert_eq!(5, *expected);
                assert_eq!(2, *got);
            }
            _ => panic!("Unexpected error {}", e),
        }
        assert!(e.is_out_of_data());
    }

    #[test]
    pub fn test_tag_long_form() {
        let encoded = encode_tag(31, CLASS_BITS_CONTEXT_SPECIFIC | FLAG_CONSTRUCTED);
        assert_eq!(vec![0xbf, 0x1f], encoded);
        let encoded = encode_identifier(Tag::Application(16_383), false);
        assert_eq!(vec![0x5f, 0xff, 0x7f], encoded);
        let (tag, offset) = read_tag(&[0x5f, 0xff, 0x7f, 0x00], 0).unwrap();
        assert_eq!(&[0x5f, 0xff, 0x7f][..], tag);
        assert_eq!(3, offset);
        assert!(read_tag(&[0x5f, 0xff], 0).is_err());
        assert!(skip_tag(&[0x02], 0).is_err());
    }

    #[test]
    pub fn test_identifier_classes() {
        assert_eq!(vec![0x02], encode_identifier(Tag::DEFAULT_INTEGER, false));
        assert_eq!(vec![0x30], encode_identifier(Tag::DEFAULT_SEQUENCE, true));
        assert_eq!(vec![0x80], encode_identifier(Tag::ContextSpecific(0), false));
        assert_eq!(vec![0x61], encode_identifier(Tag::Application(1), true));
        assert_eq!(vec![0xc2], encode_identifier(Tag::Private(2), false));
        assert!(is_constructed(&[0xa0]));
        assert!(!is_constructed(&[0x80]));
    }

    #[test]
    pub fn test_signed_integer() {
        for value in &[
            0,
            1,
            -1,
            127,
            128,
            -128,
            -129,
            255,
            256,
            i64::MAX as i128,
            i64::MIN as i128,
            i128::MAX,
            i128::MIN,
        ] {
            let encoded = encode_signed_integer(*value);
            assert_eq!(*value, decode_signed_integer(&encoded, 0).unwrap());
        }
        assert_eq!(16, encode_signed_integer(i128::MIN).len());
        assert_eq!(0, decode_signed_integer(&[], 0).unwrap());
        assert!(decode_signed_integer(&[0x01; 17], 0).is_err());
    }

    #[test]
    pub fn test_real_encoding() {
        assert_eq!(Vec::<u8>::new(), encode_real(0.0).unwrap());
        assert_eq!(vec![0x40], encode_real(f64::INFINITY).unwrap());
        assert_eq!(vec![0x41], encode_real(f64::NEG_INFINITY).unwrap());
        assert_eq!(vec![0x42], encode_real(f64::NAN).unwrap());
        assert_eq!(vec![0x80, 0x00, 0x01], encode_real(1.0).unwrap());
        assert_eq!(vec![0xc0, 0x00, 0x01], encode_real(-1.0).unwrap());
        assert_eq!(vec![0x80, 0xff, 0x03], encode_real(1.5).unwrap());
        assert_eq!(vec![0x81, 0xfb, 0xce, 0x01], encode_real(f64::from_bits(1)).unwrap());
    }

    #[test]
    pub fn test_real_decoding() {
        for value in &[
            1.0,
            -1.0,
            0.1,
            -1.5e300,
            3.141_592_653_589_793,
            f64::MAX,
            f64::MIN_POSITIVE,
            f64::from_bits(1),
        ] {
            let encoded = encode_real(*value).unwrap();
            assert_eq!(*value, decode_real(&encoded, 0).unwrap());
        }
        assert!(decode_real(&[0x42], 0).unwrap().is_nan());
        let minus_zero = decode_real(&[0x43], 0).unwrap();
        assert_eq!(0.0, minus_zero);
        assert!(minus_zero.is_sign_negative());
        assert!(decode_real(&[0x44], 0).is_err());
    }

    #[test]
    pub fn test_real_other_bases_and_decimal() {
        // base 8, exponent 1, mantissa 3 -> 24
        assert_eq!(24.0, decode_real(&[0x90, 0x01, 0x03], 0).unwrap());
        // base 16, scale factor 1, exponent -1, mantissa 8 -> 1
        assert_eq!(1.0, decode_real(&[0xa4, 0xff, 0x08], 0).unwrap());
        // long exponent form with one exponent octet
        assert_eq!(4.0, decode_real(&[0x83, 0x01, 0x02, 0x01], 0).unwrap());
        assert!(decode_real(&[0xb0, 0x01, 0x01], 0).is_err());

        assert_eq!(1.5, decode_real(b"\x02 1,5", 0).unwrap());
        assert_eq!(-12.0, decode_real(b"\x01-12", 0).unwrap());
        assert_eq!(150.0, decode_real(b"\x031.5E2", 0).unwrap());
        assert!(decode_real(b"\x03abc", 0).is_err());
    }

    #[test]
    pub fn test_object_identifier() {
        for text in &["1.2.840.113549", "2.5.4.3", "0.0", "2.999.1", "1.3.6.1.4.1.311.21.20"] {
            let encoded = encode_object_identifier(text).unwrap();
            assert_eq!(*text, decode_object_identifier(&encoded, 0).unwrap());
        }
        assert_eq!(vec![0x88, 0x37, 0x01], encode_object_identifier("2.999.1").unwrap());
        assert!(encode_object_identifier("1").is_err());
        assert!(encode_object_identifier("1.a.3").is_err());
        assert!(decode_object_identifier(&[], 0).is_err());
        assert!(decode_object_identifier(&[0x2a, 0x86], 0).is_err());
    }

    #[test]
    pub fn test_skip_element() {
        let data = [0x02, 0x01, 0x05, 0xff];
        assert_eq!(3, skip_element(&data, 0).unwrap());

        // indefinite, containing an indefinite element
        let data = [0x30, 0x80, 0xa0, 0x80, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01];
        assert_eq!(10, skip_element(&data, 0).unwrap());

        let data = [0x30, 0x80, 0x05, 0x00];
        assert!(skip_element(&data, 0).is_err());
    }

    #[test]
    pub fn test_skip_element_nesting_limit() {
        let nested = |depth: usize| {
            let mut data = [0x30, 0x80].repeat(depth);
            data.extend(END_OF_CONTENTS.repeat(depth));
            data
        };
        let data = nested(MAX_NESTING_DEPTH);
        assert_eq!(data.len(), skip_element(&data, 0).unwrap());

        let e = skip_element(&nested(MAX_NESTING_DEPTH + 1), 0).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::NestingTooDeep(MAX_NESTING_DEPTH)));
        assert_eq!(Some(2 * MAX_NESTING_DEPTH), e.offset());
    }

    #[test]
    pub fn test_format_bytes() {
        assert_eq!("A0", format_bytes(&[0xa0]));
        assert_eq!("1F8100", format_bytes(&[0x1f, 0x81, 0x00]));
    }
}
