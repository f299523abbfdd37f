//! The compiled type tree and the codecs of the scalar types, ITU-T X.690, 8.2 to 8.23

use crate::protocol::basic::err::{Error, ErrorKind};
use crate::protocol::basic::octets::{
    decode_length, decode_object_identifier, decode_real, decode_signed_integer,
    encode_identifier, encode_object_identifier, encode_real, encode_signed_integer, format_bytes,
    is_end_of_contents, read_tag, skip_element, write_tlv, END_OF_CONTENTS, MAX_NESTING_DEPTH,
};
use crate::protocol::basic::structure::{
    AnyDefinedBy, ArrayType, Choice, ExplicitTag, MembersType, Recursive,
};
use crate::protocol::basic::time;
use crate::value::{BitString, Fields, Value};
use asn1ber_model::Tag;
use byteorder::{BigEndian, ByteOrder};

/// Result of decoding one node at an offset
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The decoded value and the offset after its encoding
    Matched(Value, usize),
    /// The identifier octets at the offset belong to another type
    TagMismatch,
}

/// The encoded tags of all nodes that stand in for recursive type references, indexed by slot
pub(crate) type SlotTags = [Option<Vec<Vec<u8>>>];

/// Holds the resolved nodes of recursive type references. Filled once by the compiler, read-only
/// afterwards.
#[derive(Debug, Default)]
pub struct Registry {
    pub(crate) slots: Vec<Option<TypeNode>>,
    pub(crate) slot_names: Vec<String>,
    pub(crate) slot_tags: Vec<Option<Vec<Vec<u8>>>>,
}

impl Registry {
    pub(crate) fn resolve(&self, slot: usize) -> Result<&TypeNode, Error> {
        self.slots
            .get(slot)
            .and_then(Option::as_ref)
            .ok_or_else(|| {
                let name = self.slot_names.get(slot).cloned().unwrap_or_default();
                Error::from(ErrorKind::UnresolvedRecursion(name))
            })
    }
}

/// A member of a SEQUENCE, SET or CHOICE
#[derive(Debug, Clone)]
pub struct Member {
    pub name: String,
    pub node: TypeNode,
    pub optional: bool,
    pub default: Option<Value>,
}

impl Member {
    pub fn new<S: Into<String>>(name: S, node: TypeNode) -> Self {
        Self {
            name: name.into(),
            node,
            optional: false,
            default: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Whether `value` equals the default of this member and can be left out of the encoding
    pub fn is_default(&self, value: &Value) -> bool {
        match &self.default {
            None => false,
            Some(default) => self.node.equals_as_default(default, value),
        }
    }
}

#[derive(Debug, Clone)]
pub enum TypeNode {
    Boolean(Primitive),
    Integer(Primitive),
    Real(Primitive),
    Enumerated(Enumerated),
    Null(Primitive),
    BitString(BitStringNode),
    OctetString(SegmentTags),
    ObjectIdentifier(Primitive),
    String(StringNode),
    Time(TimeNode),
    Any,
    AnyDefinedBy(AnyDefinedBy),
    Sequence(MembersType),
    SequenceOf(ArrayType),
    Set(MembersType),
    SetOf(ArrayType),
    Choice(Choice),
    ExplicitTag(ExplicitTag),
    Recursive(Recursive),
}

impl TypeNode {
    pub fn decode(
        &self,
        registry: &Registry,
        data: &[u8],
        offset: usize,
        values: Option<&Fields>,
    ) -> Result<Decoded, Error> {
        self.decode_nested(registry, data, offset, values, 0)
    }

    /// Decodes a node that is `depth` nodes below the node decoding started with
    pub(crate) fn decode_nested(
        &self,
        registry: &Registry,
        data: &[u8],
        offset: usize,
        values: Option<&Fields>,
        depth: usize,
    ) -> Result<Decoded, Error> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(Error::nesting_too_deep(MAX_NESTING_DEPTH, offset));
        }
        let depth = depth + 1;
        match self {
            TypeNode::Boolean(node) => node.decode_with(data, offset, |contents, offset| {
                if contents.len() != 1 {
                    Err(Error::malformed(
                        ErrorKind::InvalidBooleanLength(contents.len()),
                        offset,
                    ))
                } else {
                    Ok(Value::Boolean(contents[0] != 0x00))
                }
            }),
            TypeNode::Integer(node) => node.decode_with(data, offset, |contents, offset| {
                decode_signed_integer(contents, offset).map(Value::Integer)
            }),
            TypeNode::Real(node) => node.decode_with(data, offset, |contents, offset| {
                decode_real(contents, offset).map(Value::Real)
            }),
            TypeNode::Null(node) => node.decode_with(data, offset, |_, _| Ok(Value::Null)),
            TypeNode::ObjectIdentifier(node) => {
                node.decode_with(data, offset, |contents, offset| {
                    decode_object_identifier(contents, offset).map(Value::ObjectIdentifier)
                })
            }
            TypeNode::Enumerated(node) => node.decode(data, offset),
            TypeNode::BitString(node) => node.decode(data, offset),
            TypeNode::OctetString(tags) => Ok(match tags.decode(data, offset)? {
                Some((segments, end)) => {
                    Decoded::Matched(Value::OctetString(segments.concat()), end)
                }
                None => Decoded::TagMismatch,
            }),
            TypeNode::String(node) => node.decode(data, offset),
            TypeNode::Time(node) => node.decode(data, offset),
            TypeNode::Any => decode_any(data, offset),
            TypeNode::AnyDefinedBy(node) => node.decode(registry, data, offset, values, depth),
            TypeNode::Sequence(node) | TypeNode::Set(node) => {
                node.decode(registry, data, offset, depth)
            }
            TypeNode::SequenceOf(node) | TypeNode::SetOf(node) => {
                node.decode(registry, data, offset, depth)
            }
            TypeNode::Choice(node) => node.decode(registry, data, offset, values, depth),
            TypeNode::ExplicitTag(node) => node.decode(registry, data, offset, values, depth),
            TypeNode::Recursive(node) => node.decode(registry, data, offset, values, depth),
        }
    }

    pub fn encode(
        &self,
        registry: &Registry,
        value: &Value,
        out: &mut Vec<u8>,
        values: Option<&Fields>,
    ) -> Result<(), Error> {
        match (self, value) {
            (TypeNode::Boolean(node), Value::Boolean(value)) => {
                write_tlv(out, &node.tag, &[if *value { 0xff } else { 0x00 }]);
                Ok(())
            }
            (TypeNode::Integer(node), Value::Integer(value)) => {
                write_tlv(out, &node.tag, &encode_signed_integer(*value));
                Ok(())
            }
            (TypeNode::Real(node), Value::Real(value)) => {
                write_tlv(out, &node.tag, &encode_real(*value)?);
                Ok(())
            }
            (TypeNode::Null(node), Value::Null) => {
                write_tlv(out, &node.tag, &[]);
                Ok(())
            }
            (TypeNode::ObjectIdentifier(node), Value::ObjectIdentifier(text)) => {
                write_tlv(out, &node.tag, &encode_object_identifier(text)?);
                Ok(())
            }
            (TypeNode::Enumerated(node), value) => node.encode(value, out),
            (TypeNode::BitString(node), Value::BitString(value)) => node.encode(value, out),
            (TypeNode::OctetString(tags), Value::OctetString(octets)) => {
                write_tlv(out, &tags.primitive, octets);
                Ok(())
            }
            (TypeNode::String(node), Value::String(text)) => node.encode(text, out),
            (TypeNode::Time(node), value) => node.encode(value, out),
            (TypeNode::Any, Value::Any(encoded)) => {
                out.extend_from_slice(encoded);
                Ok(())
            }
            (TypeNode::AnyDefinedBy(node), value) => node.encode(registry, value, out, values),
            (TypeNode::Sequence(node), value) | (TypeNode::Set(node), value) => {
                node.encode(registry, value, out)
            }
            (TypeNode::SequenceOf(node), value) | (TypeNode::SetOf(node), value) => {
                node.encode(registry, value, out)
            }
            (TypeNode::Choice(node), value) => node.encode(registry, value, out, values),
            (TypeNode::ExplicitTag(node), value) => node.encode(registry, value, out, values),
            (TypeNode::Recursive(node), value) => node.encode(registry, value, out, values),
            (node, value) => Err(Error::unexpected_value(node.type_label(), value.kind())),
        }
    }

    /// Replaces the tag of this node (implicit tagging). Untagged nodes are never tagged
    /// implicitly, they get wrapped in an [`ExplicitTag`] instead.
    pub fn set_tag(&mut self, tag: Tag) {
        match self {
            TypeNode::Boolean(node)
            | TypeNode::Integer(node)
            | TypeNode::Real(node)
            | TypeNode::Null(node)
            | TypeNode::ObjectIdentifier(node) => node.tag = encode_identifier(tag, false),
            TypeNode::Enumerated(node) => node.tag = encode_identifier(tag, false),
            TypeNode::BitString(node) => node.tags.set_tag(tag),
            TypeNode::OctetString(tags) => tags.set_tag(tag),
            TypeNode::String(node) => node.tags.set_tag(tag),
            TypeNode::Time(node) => node.tag = encode_identifier(tag, false),
            TypeNode::Sequence(node) | TypeNode::Set(node) => node.set_tag(tag),
            TypeNode::SequenceOf(node) | TypeNode::SetOf(node) => node.set_tag(tag),
            TypeNode::ExplicitTag(node) => node.set_tag(tag),
            TypeNode::Any
            | TypeNode::AnyDefinedBy(_)
            | TypeNode::Choice(_)
            | TypeNode::Recursive(_) => {}
        }
    }

    /// Whether this node has no identifier octets of its own
    pub fn is_untagged(&self) -> bool {
        matches!(
            self,
            TypeNode::Any | TypeNode::AnyDefinedBy(_) | TypeNode::Choice(_)
        )
    }

    /// All identifier octets an encoding of this node may start with, `None` if they depend on a
    /// recursive reference whose tags are not known (yet)
    pub(crate) fn tags(&self, slot_tags: &SlotTags) -> Option<Vec<Vec<u8>>> {
        match self {
            TypeNode::Boolean(node)
            | TypeNode::Integer(node)
            | TypeNode::Real(node)
            | TypeNode::Null(node)
            | TypeNode::ObjectIdentifier(node) => Some(vec![node.tag.clone()]),
            TypeNode::Enumerated(node) => Some(vec![node.tag.clone()]),
            TypeNode::BitString(node) => Some(node.tags.both()),
            TypeNode::OctetString(tags) => Some(tags.both()),
            TypeNode::String(node) => Some(node.tags.both()),
            TypeNode::Time(node) => Some(vec![node.tag.clone()]),
            TypeNode::Any | TypeNode::AnyDefinedBy(_) => Some(Vec::new()),
            TypeNode::Sequence(node) | TypeNode::Set(node) => Some(vec![node.tag().to_vec()]),
            TypeNode::SequenceOf(node) | TypeNode::SetOf(node) => Some(vec![node.tag().to_vec()]),
            TypeNode::Choice(node) => node.tags(slot_tags),
            TypeNode::ExplicitTag(node) => Some(vec![node.tag().to_vec()]),
            TypeNode::Recursive(node) => slot_tags.get(node.slot()).cloned().flatten(),
        }
    }

    /// The expected tags for error messages
    pub(crate) fn expected_tags(&self, registry: &Registry) -> Vec<String> {
        self.tags(&registry.slot_tags)
            .unwrap_or_default()
            .iter()
            .map(|tag| format_bytes(tag))
            .collect()
    }

    pub fn type_label(&self) -> &'static str {
        match self {
            TypeNode::Boolean(_) => "BOOLEAN",
            TypeNode::Integer(_) => "INTEGER",
            TypeNode::Real(_) => "REAL",
            TypeNode::Enumerated(_) => "ENUMERATED",
            TypeNode::Null(_) => "NULL",
            TypeNode::BitString(_) => "BIT STRING",
            TypeNode::OctetString(_) => "OCTET STRING",
            TypeNode::ObjectIdentifier(_) => "OBJECT IDENTIFIER",
            TypeNode::String(node) => node.type_label,
            TypeNode::Time(node) => node.kind.label(),
            TypeNode::Any => "ANY",
            TypeNode::AnyDefinedBy(_) => "ANY DEFINED BY",
            TypeNode::Sequence(_) => "SEQUENCE",
            TypeNode::SequenceOf(_) => "SEQUENCE OF",
            TypeNode::Set(_) => "SET",
            TypeNode::SetOf(_) => "SET OF",
            TypeNode::Choice(_) => "CHOICE",
            TypeNode::ExplicitTag(_) => "ExplicitTag",
            TypeNode::Recursive(_) => "Recursive",
        }
    }

    fn equals_as_default(&self, default: &Value, value: &Value) -> bool {
        match (self, default, value) {
            (TypeNode::BitString(node), Value::BitString(default), Value::BitString(value)) => {
                default.clean(node.has_named_bits) == value.clean(node.has_named_bits)
            }
            _ => default == value,
        }
    }

    /// Calls `f` for every node in this tree, innermost first. Recursive references are not
    /// followed.
    pub(crate) fn for_each_node_mut(&mut self, f: &mut dyn FnMut(&mut TypeNode)) {
        match self {
            TypeNode::Sequence(node) | TypeNode::Set(node) => {
                for member in node.members_mut() {
                    member.node.for_each_node_mut(f);
                }
            }
            TypeNode::SequenceOf(node) | TypeNode::SetOf(node) => {
                node.element_mut().for_each_node_mut(f)
            }
            TypeNode::Choice(node) => {
                for member in node.members_mut() {
                    member.node.for_each_node_mut(f);
                }
            }
            TypeNode::ExplicitTag(node) => node.inner_mut().for_each_node_mut(f),
            TypeNode::AnyDefinedBy(node) => {
                for choice in node.choices_mut() {
                    choice.for_each_node_mut(f);
                }
            }
            _ => {}
        }
        f(self);
    }
}

#[inline]
pub(crate) fn tag_matches(data: &[u8], offset: usize, tag: &[u8]) -> bool {
    data.get(offset..offset + tag.len()) == Some(tag)
}

/// The identifier octets at `offset` for error messages
pub(crate) fn found_tag(data: &[u8], offset: usize) -> String {
    read_tag(data, offset)
        .map(|(tag, _)| format_bytes(tag))
        .unwrap_or_default()
}

/// Reads the definite length contents of a primitive encoding with the given tag
fn primitive_contents<'a>(
    data: &'a [u8],
    offset: usize,
    tag: &[u8],
) -> Result<Option<(&'a [u8], usize, usize)>, Error> {
    if !tag_matches(data, offset, tag) {
        return Ok(None);
    }
    match decode_length(data, offset + tag.len(), true)? {
        (Some(length), start) => Ok(Some((&data[start..start + length], start, start + length))),
        (None, start) => Err(Error::expected_definite_length(start - 1)),
    }
}

fn decode_any(data: &[u8], offset: usize) -> Result<Decoded, Error> {
    let end = skip_element(data, offset)?;
    Ok(Decoded::Matched(Value::Any(data[offset..end].to_vec()), end))
}

#[derive(Debug, Clone)]
pub struct Primitive {
    tag: Vec<u8>,
}

impl Primitive {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag: encode_identifier(tag, false),
        }
    }

    fn decode_with(
        &self,
        data: &[u8],
        offset: usize,
        decode: impl FnOnce(&[u8], usize) -> Result<Value, Error>,
    ) -> Result<Decoded, Error> {
        match primitive_contents(data, offset, &self.tag)? {
            Some((contents, start, end)) => Ok(Decoded::Matched(decode(contents, start)?, end)),
            None => Ok(Decoded::TagMismatch),
        }
    }
}

/// ITU-T X.690, 8.4
#[derive(Debug, Clone)]
pub struct Enumerated {
    tag: Vec<u8>,
    values: Vec<(String, i128)>,
    extensible: bool,
    numeric: bool,
}

impl Enumerated {
    pub fn new(values: Vec<(String, i128)>, extensible: bool, numeric: bool) -> Self {
        Self {
            tag: encode_identifier(Tag::DEFAULT_ENUMERATED, false),
            values,
            extensible,
            numeric,
        }
    }

    fn expected(&self) -> String {
        self.values
            .iter()
            .map(|(label, _)| label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The value a default given as label or number stands for
    pub(crate) fn value_of(&self, label: &str) -> Option<Value> {
        let (label, number) = self.values.iter().find(|(name, _)| name == label)?;
        Some(if self.numeric {
            Value::Integer(*number)
        } else {
            Value::Enumerated(label.clone())
        })
    }

    fn decode(&self, data: &[u8], offset: usize) -> Result<Decoded, Error> {
        let (contents, start, end) = match primitive_contents(data, offset, &self.tag)? {
            Some(contents) => contents,
            None => return Ok(Decoded::TagMismatch),
        };
        let number = decode_signed_integer(contents, start)?;
        let value = match self.values.iter().find(|(_, value)| *value == number) {
            Some((_, number)) if self.numeric => Value::Integer(*number),
            Some((label, _)) => Value::Enumerated(label.clone()),
            None if self.extensible => Value::Null,
            None => {
                return Err(Error::malformed(
                    ErrorKind::UnknownEnumerationValue {
                        expected: self.expected(),
                        got: number,
                    },
                    start,
                ))
            }
        };
        Ok(Decoded::Matched(value, end))
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), Error> {
        let number = match value {
            Value::Enumerated(label) if !self.numeric => self
                .values
                .iter()
                .find(|(name, _)| name == label)
                .map(|(_, number)| *number)
                .ok_or_else(|| {
                    Error::from(ErrorKind::UnknownEnumerationLabel {
                        expected: self.expected(),
                        got: label.clone(),
                    })
                })?,
            Value::Integer(number) if self.numeric => {
                if !self.values.iter().any(|(_, value)| value == number) {
                    return Err(ErrorKind::UnknownEnumerationLabel {
                        expected: self.expected(),
                        got: number.to_string(),
                    }
                    .into());
                }
                *number
            }
            other => return Err(Error::unexpected_value("ENUMERATED", other.kind())),
        };
        write_tlv(out, &self.tag, &encode_signed_integer(number));
        Ok(())
    }
}

/// The identifier octets of a string type that may be encoded primitive or constructed,
/// ITU-T X.690, 8.6.4, 8.7.3 and 8.23.6
#[derive(Debug, Clone)]
pub struct SegmentTags {
    primitive: Vec<u8>,
    constructed: Vec<u8>,
    segment_primitive: Vec<u8>,
    segment_constructed: Vec<u8>,
}

impl SegmentTags {
    /// `segment` is the universal tag the segments of a constructed encoding carry
    pub fn new(tag: Tag, segment: Tag) -> Self {
        Self {
            primitive: encode_identifier(tag, false),
            constructed: encode_identifier(tag, true),
            segment_primitive: encode_identifier(segment, false),
            segment_constructed: encode_identifier(segment, true),
        }
    }

    fn set_tag(&mut self, tag: Tag) {
        self.primitive = encode_identifier(tag, false);
        self.constructed = encode_identifier(tag, true);
    }

    fn both(&self) -> Vec<Vec<u8>> {
        vec![self.primitive.clone(), self.constructed.clone()]
    }

    /// The contents of all primitive segments in order and the offset after the encoding
    fn decode<'a>(
        &self,
        data: &'a [u8],
        offset: usize,
    ) -> Result<Option<(Vec<&'a [u8]>, usize)>, Error> {
        let mut segments = Vec::new();
        Ok(self
            .collect(data, offset, 0, &mut segments)?
            .map(|end| (segments, end)))
    }

    fn collect<'a>(
        &self,
        data: &'a [u8],
        offset: usize,
        depth: usize,
        segments: &mut Vec<&'a [u8]>,
    ) -> Result<Option<usize>, Error> {
        if depth >= MAX_NESTING_DEPTH {
            return Err(Error::nesting_too_deep(MAX_NESTING_DEPTH, offset));
        }
        let segment_tags = [
            (&self.segment_primitive, &self.segment_constructed),
            (&self.primitive, &self.constructed),
        ];
        let candidates = if depth > 0 {
            &segment_tags[..]
        } else {
            &segment_tags[1..]
        };

        for (primitive, constructed) in candidates {
            if let Some((contents, _, end)) = primitive_contents(data, offset, primitive)? {
                segments.push(contents);
                return Ok(Some(end));
            } else if tag_matches(data, offset, constructed) {
                let (length, mut offset) = decode_length(data, offset + constructed.len(), false)?;
                let end = match length {
                    Some(length) => {
                        let end = offset + length;
                        while offset < end {
                            offset = self.collect_segment(data, offset, depth, segments)?;
                        }
                        end
                    }
                    None => {
                        while !is_end_of_contents(data, offset) {
                            if offset >= data.len() {
                                return Err(Error::no_end_of_contents(offset));
                            }
                            offset = self.collect_segment(data, offset, depth, segments)?;
                        }
                        offset + END_OF_CONTENTS.len()
                    }
                };
                return Ok(Some(end));
            }
        }
        Ok(None)
    }

    fn collect_segment<'a>(
        &self,
        data: &'a [u8],
        offset: usize,
        depth: usize,
        segments: &mut Vec<&'a [u8]>,
    ) -> Result<usize, Error> {
        match self.collect(data, offset, depth + 1, segments)? {
            Some(end) => Ok(end),
            None => Err(Error::unexpected_tag(
                "segment",
                vec![
                    format_bytes(&self.segment_primitive),
                    format_bytes(&self.segment_constructed),
                ],
                found_tag(data, offset),
                offset,
            )),
        }
    }
}

/// ITU-T X.690, 8.6
#[derive(Debug, Clone)]
pub struct BitStringNode {
    tags: SegmentTags,
    pub(crate) has_named_bits: bool,
}

impl BitStringNode {
    pub fn new(has_named_bits: bool) -> Self {
        Self {
            tags: SegmentTags::new(Tag::DEFAULT_BIT_STRING, Tag::DEFAULT_BIT_STRING),
            has_named_bits,
        }
    }

    fn decode(&self, data: &[u8], offset: usize) -> Result<Decoded, Error> {
        let (segments, end) = match self.tags.decode(data, offset)? {
            Some(decoded) => decoded,
            None => return Ok(Decoded::TagMismatch),
        };
        let invalid = || Error::malformed(ErrorKind::InvalidBitStringContents, offset);

        let mut bytes = Vec::new();
        let mut unused_bits = 0;
        for (index, segment) in segments.iter().enumerate() {
            let (&unused, contents) = segment.split_first().ok_or_else(invalid)?;
            let last = index + 1 == segments.len();
            if unused > 7 || (unused != 0 && (!last || contents.is_empty())) {
                return Err(invalid());
            }
            bytes.extend_from_slice(contents);
            unused_bits = usize::from(unused);
        }
        let bits = bytes.len() * 8 - unused_bits;
        Ok(Decoded::Matched(
            Value::BitString(BitString::new(bytes, bits)),
            end,
        ))
    }

    fn encode(&self, value: &BitString, out: &mut Vec<u8>) -> Result<(), Error> {
        let masked = value.masked().ok_or_else(|| {
            Error::from(ErrorKind::InvalidBitString {
                bits: value.bits,
                bytes: value.data.len(),
            })
        })?;
        let mut contents = Vec::with_capacity(masked.len() + 1);
        contents.push(((8 - value.bits % 8) % 8) as u8);
        contents.extend_from_slice(&masked);
        write_tlv(out, &self.tags.primitive, &contents);
        Ok(())
    }
}

/// The character encoding of a restricted character string type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Ascii,
    Latin1,
    Utf16Be,
    Utf32Be,
}

impl TextEncoding {
    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Ascii => "ascii",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Utf16Be => "utf-16-be",
            TextEncoding::Utf32Be => "utf-32-be",
        }
    }

    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            TextEncoding::Ascii => {
                if bytes.is_ascii() {
                    Some(bytes.iter().map(|byte| char::from(*byte)).collect())
                } else {
                    None
                }
            }
            TextEncoding::Latin1 => Some(bytes.iter().map(|byte| char::from(*byte)).collect()),
            TextEncoding::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return None;
                }
                let units = bytes.chunks(2).map(BigEndian::read_u16);
                std::char::decode_utf16(units)
                    .collect::<Result<String, _>>()
                    .ok()
            }
            TextEncoding::Utf32Be => {
                if bytes.len() % 4 != 0 {
                    return None;
                }
                bytes
                    .chunks(4)
                    .map(|chunk| std::char::from_u32(BigEndian::read_u32(chunk)))
                    .collect()
            }
        }
    }

    /// Fails with the first character that cannot be represented
    pub fn encode(self, text: &str) -> Result<Vec<u8>, char> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { Ok(c as u8) } else { Err(c) })
                .collect(),
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| if (c as u32) <= 0xff { Ok(c as u8) } else { Err(c) })
                .collect(),
            TextEncoding::Utf16Be => {
                let mut bytes = Vec::with_capacity(text.len() * 2);
                for unit in text.encode_utf16() {
                    bytes.extend_from_slice(&unit.to_be_bytes());
                }
                Ok(bytes)
            }
            TextEncoding::Utf32Be => {
                let mut bytes = Vec::with_capacity(text.len() * 4);
                for c in text.chars() {
                    bytes.extend_from_slice(&(c as u32).to_be_bytes());
                }
                Ok(bytes)
            }
        }
    }
}

/// ITU-T X.690, 8.23
#[derive(Debug, Clone)]
pub struct StringNode {
    tags: SegmentTags,
    encoding: TextEncoding,
    type_label: &'static str,
}

impl StringNode {
    pub fn new(type_label: &'static str, tag: Tag, encoding: TextEncoding) -> Self {
        Self {
            tags: SegmentTags::new(tag, Tag::DEFAULT_OCTET_STRING),
            encoding,
            type_label,
        }
    }

    fn decode(&self, data: &[u8], offset: usize) -> Result<Decoded, Error> {
        let (segments, end) = match self.tags.decode(data, offset)? {
            Some(decoded) => decoded,
            None => return Ok(Decoded::TagMismatch),
        };
        let text = self.encoding.decode(&segments.concat()).ok_or_else(|| {
            Error::malformed(
                ErrorKind::InvalidStringContents {
                    encoding: self.encoding.label(),
                },
                offset,
            )
        })?;
        Ok(Decoded::Matched(Value::String(text), end))
    }

    fn encode(&self, text: &str, out: &mut Vec<u8>) -> Result<(), Error> {
        let contents = self.encoding.encode(text).map_err(|character| {
            Error::from(ErrorKind::UnencodableCharacter {
                encoding: self.encoding.label(),
                character,
            })
        })?;
        write_tlv(out, &self.tags.primitive, &contents);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeKind {
    UtcTime,
    GeneralizedTime,
    Date,
    TimeOfDay,
    DateTime,
}

impl TimeKind {
    pub fn label(self) -> &'static str {
        match self {
            TimeKind::UtcTime => "UTCTime",
            TimeKind::GeneralizedTime => "GeneralizedTime",
            TimeKind::Date => "DATE",
            TimeKind::TimeOfDay => "TIME-OF-DAY",
            TimeKind::DateTime => "DATE-TIME",
        }
    }

    fn default_tag(self) -> Tag {
        match self {
            TimeKind::UtcTime => Tag::DEFAULT_UTC_TIME,
            TimeKind::GeneralizedTime => Tag::DEFAULT_GENERALIZED_TIME,
            TimeKind::Date => Tag::DEFAULT_DATE,
            TimeKind::TimeOfDay => Tag::DEFAULT_TIME_OF_DAY,
            TimeKind::DateTime => Tag::DEFAULT_DATE_TIME,
        }
    }
}

/// The time types, encoded as their text in VisibleString characters
#[derive(Debug, Clone)]
pub struct TimeNode {
    tag: Vec<u8>,
    kind: TimeKind,
}

impl TimeNode {
    pub fn new(kind: TimeKind) -> Self {
        Self {
            tag: encode_identifier(kind.default_tag(), false),
            kind,
        }
    }

    pub fn kind(&self) -> TimeKind {
        self.kind
    }

    fn decode(&self, data: &[u8], offset: usize) -> Result<Decoded, Error> {
        let (contents, start, end) = match primitive_contents(data, offset, &self.tag)? {
            Some(contents) => contents,
            None => return Ok(Decoded::TagMismatch),
        };
        let text = TextEncoding::Ascii.decode(contents).ok_or_else(|| {
            Error::malformed(
                ErrorKind::InvalidStringContents {
                    encoding: TextEncoding::Ascii.label(),
                },
                start,
            )
        })?;
        let value = match self.kind {
            TimeKind::UtcTime => time::decode_utc_time(&text).map(Value::UtcTime),
            TimeKind::GeneralizedTime => {
                time::decode_generalized_time(&text).map(Value::GeneralizedTime)
            }
            TimeKind::Date => time::decode_date(&text).map(Value::Date),
            TimeKind::TimeOfDay => time::decode_time_of_day(&text).map(Value::TimeOfDay),
            TimeKind::DateTime => time::decode_date_time(&text).map(Value::DateTime),
        }
        .map_err(|e| e.at(start))?;
        Ok(Decoded::Matched(value, end))
    }

    fn encode(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), Error> {
        let text = match (self.kind, value) {
            (TimeKind::UtcTime, Value::UtcTime(value)) => time::encode_utc_time(value)?,
            (TimeKind::GeneralizedTime, Value::GeneralizedTime(value)) => {
                time::encode_generalized_time(value)?
            }
            (TimeKind::Date, Value::Date(value)) => time::encode_date(value)?,
            (TimeKind::TimeOfDay, Value::TimeOfDay(value)) => time::encode_time_of_day(value)?,
            (TimeKind::DateTime, Value::DateTime(value)) => time::encode_date_time(value)?,
            (kind, value) => return Err(Error::unexpected_value(kind.label(), value.kind())),
        };
        write_tlv(out, &self.tag, text.as_bytes());
        Ok(())
    }
}
