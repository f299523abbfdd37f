//! The constructed types and the nodes without identifier octets of their own
//!
//! Decoding a member that does not start with the expected identifier octets yields
//! [`Decoded::TagMismatch`] instead of an error, so that SEQUENCE and SET can probe their members
//! in any order and CHOICE can look for its alternatives.

use crate::protocol::basic::err::{Error, ErrorKind};
use crate::protocol::basic::node::{
    found_tag, tag_matches, Decoded, Member, Registry, SlotTags, TypeNode,
};
use crate::protocol::basic::octets::{
    decode_length, encode_identifier, is_end_of_contents, read_tag, skip_element, write_tlv,
    END_OF_CONTENTS,
};
use crate::value::{Fields, Value};
use asn1ber_model::Tag;
use log::{debug, trace};
use std::collections::{BTreeMap, HashMap};

/// Whether the contents octets starting at `offset` are exhausted, either by reaching the end of
/// a definite length or the end-of-contents octets of an indefinite length
fn is_exhausted(data: &[u8], offset: usize, end: Option<usize>) -> bool {
    match end {
        Some(end) => offset >= end,
        None => offset >= data.len() || is_end_of_contents(data, offset),
    }
}

/// Skips elements up to and including the end-of-contents octets
fn skip_to_end_of_contents(data: &[u8], mut offset: usize) -> Result<usize, Error> {
    while !is_end_of_contents(data, offset) {
        if offset >= data.len() {
            return Err(Error::no_end_of_contents(offset));
        }
        trace!("Ignoring unknown element at offset {}", offset);
        offset = skip_element(data, offset)?;
    }
    Ok(offset + END_OF_CONTENTS.len())
}

/// One extension addition: a single member or a version bracket `[[ ... ]]`, ITU-T X.680, 25
#[derive(Debug, Clone)]
pub enum Addition {
    Member(Member),
    Group(Vec<Member>),
}

impl Addition {
    pub fn members(&self) -> &[Member] {
        match self {
            Addition::Member(member) => std::slice::from_ref(member),
            Addition::Group(members) => members,
        }
    }

    fn members_mut(&mut self) -> &mut [Member] {
        match self {
            Addition::Member(member) => std::slice::from_mut(member),
            Addition::Group(members) => members,
        }
    }
}

/// SEQUENCE and SET, ITU-T X.690, 8.9 and 8.11
#[derive(Debug, Clone)]
pub struct MembersType {
    tag: Vec<u8>,
    type_label: &'static str,
    root_members: Vec<Member>,
    /// `None` if the type has no extension marker
    additions: Option<Vec<Addition>>,
}

impl MembersType {
    pub fn sequence(root_members: Vec<Member>, additions: Option<Vec<Addition>>) -> Self {
        Self::new(Tag::DEFAULT_SEQUENCE, "SEQUENCE", root_members, additions)
    }

    pub fn set(root_members: Vec<Member>, additions: Option<Vec<Addition>>) -> Self {
        Self::new(Tag::DEFAULT_SET, "SET", root_members, additions)
    }

    fn new(
        tag: Tag,
        type_label: &'static str,
        root_members: Vec<Member>,
        additions: Option<Vec<Addition>>,
    ) -> Self {
        Self {
            tag: encode_identifier(tag, true),
            type_label,
            root_members,
            additions,
        }
    }

    pub(crate) fn tag(&self) -> &[u8] {
        &self.tag
    }

    pub(crate) fn set_tag(&mut self, tag: Tag) {
        self.tag = encode_identifier(tag, true);
    }

    pub fn root_members(&self) -> &[Member] {
        &self.root_members
    }

    pub(crate) fn root_members_mut(&mut self) -> &mut [Member] {
        &mut self.root_members
    }

    pub(crate) fn members_mut(&mut self) -> impl Iterator<Item = &mut Member> {
        self.root_members.iter_mut().chain(
            self.additions
                .iter_mut()
                .flat_map(|additions| additions.iter_mut())
                .flat_map(Addition::members_mut),
        )
    }

    fn addition_members(&self) -> Vec<&Member> {
        self.additions
            .iter()
            .flat_map(|additions| additions.iter())
            .flat_map(Addition::members)
            .collect()
    }

    pub(crate) fn decode(
        &self,
        registry: &Registry,
        data: &[u8],
        offset: usize,
        depth: usize,
    ) -> Result<Decoded, Error> {
        if !tag_matches(data, offset, &self.tag) {
            return Ok(Decoded::TagMismatch);
        }
        let (length, mut offset) = decode_length(data, offset + self.tag.len(), false)?;
        let end = length.map(|length| offset + length);
        let mut values = Fields::new();

        let root_members = self.root_members.iter().collect::<Vec<_>>();
        offset = decode_members(
            registry,
            data,
            offset,
            end,
            &root_members,
            &mut values,
            depth,
        )?;

        let addition_members = self.addition_members();
        if !addition_members.is_empty() && !is_exhausted(data, offset, end) {
            offset = decode_members(
                registry,
                data,
                offset,
                end,
                &addition_members,
                &mut values,
                depth,
            )?;
        }
        for member in addition_members {
            if let (false, Some(default)) = (values.contains(&member.name), &member.default) {
                values.insert(member.name.clone(), default.clone());
            }
        }

        for member in &self.root_members {
            if values.contains(&member.name) || member.optional {
                continue;
            } else if let Some(default) = &member.default {
                values.insert(member.name.clone(), default.clone());
            } else if is_exhausted(data, offset, end) {
                return Err(Error::missing_mandatory_field(&member.name, offset));
            } else {
                return Err(Error::unexpected_tag(
                    member.node.type_label(),
                    member.node.expected_tags(registry),
                    found_tag(data, offset),
                    offset,
                )
                .add_location(&member.name));
            }
        }

        let offset = match end {
            Some(end) => {
                if offset < end {
                    trace!(
                        "Ignoring {} byte(s) of unknown extension data in {}",
                        end - offset,
                        self.type_label
                    );
                }
                end
            }
            None => skip_to_end_of_contents(data, offset)?,
        };
        Ok(Decoded::Matched(Value::Sequence(values), offset))
    }

    pub(crate) fn encode(
        &self,
        registry: &Registry,
        value: &Value,
        out: &mut Vec<u8>,
    ) -> Result<(), Error> {
        let fields = match value {
            Value::Sequence(fields) => fields,
            other => return Err(Error::unexpected_value(self.type_label, other.kind())),
        };

        let mut contents = Vec::new();
        for member in &self.root_members {
            self.encode_member(registry, member, fields, &mut contents)?;
        }

        for addition in self.additions.iter().flat_map(|additions| additions.iter()) {
            let mut encoded = Vec::new();
            let result = addition
                .members()
                .iter()
                .try_for_each(|member| self.encode_member(registry, member, fields, &mut encoded));
            match result {
                Ok(()) => contents.extend_from_slice(&encoded),
                Err(e) if e.is_encode_error() => {
                    debug!("Leaving out extension addition of {}: {}", self.type_label, e)
                }
                Err(e) => return Err(e),
            }
        }

        write_tlv(out, &self.tag, &contents);
        Ok(())
    }

    fn encode_member(
        &self,
        registry: &Registry,
        member: &Member,
        fields: &Fields,
        out: &mut Vec<u8>,
    ) -> Result<(), Error> {
        match fields.get(&member.name) {
            None if member.optional || member.default.is_some() => Ok(()),
            None => Err(Error::missing_member(
                self.type_label,
                &member.name,
                fields.names(),
            )),
            Some(value) if member.is_default(value) => Ok(()),
            Some(value) => member
                .node
                .encode(registry, value, out, Some(fields))
                .map_err(|e| e.add_location(&member.name)),
        }
    }
}

/// Decodes the given members in any order. Stops once the contents are exhausted or a complete
/// pass over the remaining members decoded none of them.
fn decode_members(
    registry: &Registry,
    data: &[u8],
    mut offset: usize,
    end: Option<usize>,
    members: &[&Member],
    values: &mut Fields,
    depth: usize,
) -> Result<usize, Error> {
    let mut pending = members.to_vec();
    while !pending.is_empty() && !is_exhausted(data, offset, end) {
        let before = pending.len();
        let mut remaining = Vec::with_capacity(before);
        for member in pending {
            if is_exhausted(data, offset, end) {
                remaining.push(member);
                continue;
            }
            let decoded = member
                .node
                .decode_nested(registry, data, offset, Some(&*values), depth)
                .map_err(|e| e.add_location(&member.name))?;
            match decoded {
                Decoded::Matched(value, next) => {
                    values.insert(member.name.clone(), value);
                    offset = next;
                }
                Decoded::TagMismatch => remaining.push(member),
            }
        }
        if remaining.len() == before {
            break;
        }
        pending = remaining;
    }
    Ok(offset)
}

/// SEQUENCE OF and SET OF, ITU-T X.690, 8.10 and 8.12
#[derive(Debug, Clone)]
pub struct ArrayType {
    tag: Vec<u8>,
    element: Box<TypeNode>,
}

impl ArrayType {
    pub fn sequence_of(element: TypeNode) -> Self {
        Self::new(Tag::DEFAULT_SEQUENCE_OF, element)
    }

    pub fn set_of(element: TypeNode) -> Self {
        Self::new(Tag::DEFAULT_SET_OF, element)
    }

    fn new(tag: Tag, element: TypeNode) -> Self {
        Self {
            tag: encode_identifier(tag, true),
            element: Box::new(element),
        }
    }

    pub(crate) fn tag(&self) -> &[u8] {
        &self.tag
    }

    pub(crate) fn set_tag(&mut self, tag: Tag) {
        self.tag = encode_identifier(tag, true);
    }

    pub(crate) fn element(&self) -> &TypeNode {
        &self.element
    }

    pub(crate) fn element_mut(&mut self) -> &mut TypeNode {
        &mut self.element
    }

    pub(crate) fn decode(
        &self,
        registry: &Registry,
        data: &[u8],
        offset: usize,
        depth: usize,
    ) -> Result<Decoded, Error> {
        if !tag_matches(data, offset, &self.tag) {
            return Ok(Decoded::TagMismatch);
        }
        let (length, mut offset) = decode_length(data, offset + self.tag.len(), false)?;
        let end = length.map(|length| offset + length);
        let mut elements = Vec::new();

        loop {
            match end {
                Some(end) if offset >= end => break,
                None if is_end_of_contents(data, offset) => break,
                None if offset >= data.len() => return Err(Error::no_end_of_contents(offset)),
                _ => {}
            }
            match self.element.decode_nested(registry, data, offset, None, depth)? {
                Decoded::Matched(value, next) => {
                    elements.push(value);
                    offset = next;
                }
                Decoded::TagMismatch => {
                    return Err(Error::unexpected_tag(
                        self.element.type_label(),
                        self.element.expected_tags(registry),
                        found_tag(data, offset),
                        offset,
                    ))
                }
            }
        }

        let offset = match end {
            Some(end) => end,
            None => offset + END_OF_CONTENTS.len(),
        };
        Ok(Decoded::Matched(Value::SequenceOf(elements), offset))
    }

    pub(crate) fn encode(
        &self,
        registry: &Registry,
        value: &Value,
        out: &mut Vec<u8>,
    ) -> Result<(), Error> {
        let elements = match value {
            Value::SequenceOf(elements) => elements,
            other => return Err(Error::unexpected_value("SEQUENCE OF", other.kind())),
        };
        let mut contents = Vec::new();
        for element in elements {
            self.element.encode(registry, element, &mut contents, None)?;
        }
        write_tlv(out, &self.tag, &contents);
        Ok(())
    }
}

/// CHOICE, ITU-T X.690, 8.13: the encoding is the encoding of the chosen alternative
#[derive(Debug, Clone)]
pub struct Choice {
    members: Vec<Member>,
    tag_to_member: HashMap<Vec<u8>, usize>,
    name_to_member: HashMap<String, usize>,
    extensible: bool,
    /// Members whose tags depend on recursive references
    deferred: Vec<usize>,
}

impl Choice {
    pub fn new(members: Vec<Member>, extensible: bool) -> Self {
        let mut choice = Self {
            tag_to_member: HashMap::new(),
            name_to_member: members
                .iter()
                .enumerate()
                .map(|(index, member)| (member.name.clone(), index))
                .collect(),
            members,
            extensible,
            deferred: Vec::new(),
        };
        for index in 0..choice.members.len() {
            match choice.members[index].node.tags(&[]) {
                Some(tags) => choice.register(index, tags),
                None => choice.deferred.push(index),
            }
        }
        choice
    }

    /// The first member to claim a tag keeps it
    fn register(&mut self, index: usize, tags: Vec<Vec<u8>>) {
        for tag in tags {
            self.tag_to_member.entry(tag).or_insert(index);
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub(crate) fn members_mut(&mut self) -> impl Iterator<Item = &mut Member> {
        self.members.iter_mut()
    }

    pub(crate) fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Registers the tags of members that became known once recursive references were resolved
    pub(crate) fn backpatch(&mut self, slot_tags: &SlotTags) {
        for index in std::mem::take(&mut self.deferred) {
            match self.members[index].node.tags(slot_tags) {
                Some(tags) => {
                    trace!(
                        "Registering {} tag(s) of choice member {}",
                        tags.len(),
                        self.members[index].name
                    );
                    self.register(index, tags)
                }
                None => self.deferred.push(index),
            }
        }
    }

    pub(crate) fn tags(&self, slot_tags: &SlotTags) -> Option<Vec<Vec<u8>>> {
        let mut tags = Vec::new();
        for member in &self.members {
            tags.extend(member.node.tags(slot_tags)?);
        }
        Some(tags)
    }

    fn names(&self) -> String {
        self.members
            .iter()
            .map(|member| member.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn decode(
        &self,
        registry: &Registry,
        data: &[u8],
        offset: usize,
        values: Option<&Fields>,
        depth: usize,
    ) -> Result<Decoded, Error> {
        let tag = match read_tag(data, offset) {
            Ok((tag, _)) => tag,
            Err(_) => return Ok(Decoded::TagMismatch),
        };
        match self.tag_to_member.get(tag) {
            Some(index) => {
                let member = &self.members[*index];
                let decoded = member
                    .node
                    .decode_nested(registry, data, offset, values, depth)
                    .map_err(|e| e.add_location(&member.name))?;
                Ok(match decoded {
                    Decoded::Matched(value, end) => {
                        Decoded::Matched(Value::choice(member.name.clone(), value), end)
                    }
                    Decoded::TagMismatch => Decoded::TagMismatch,
                })
            }
            None if self.extensible => {
                trace!("Skipping unknown choice alternative at offset {}", offset);
                let end = skip_element(data, offset)?;
                Ok(Decoded::Matched(Value::Choice(None), end))
            }
            None => Ok(Decoded::TagMismatch),
        }
    }

    pub(crate) fn encode(
        &self,
        registry: &Registry,
        value: &Value,
        out: &mut Vec<u8>,
        values: Option<&Fields>,
    ) -> Result<(), Error> {
        let (name, value) = match value {
            Value::Choice(Some((name, value))) => (name, value),
            Value::Choice(None) => {
                return Err(ErrorKind::UnknownChoiceMember {
                    expected: self.names(),
                    got: String::new(),
                }
                .into())
            }
            other => return Err(Error::unexpected_value("CHOICE", other.kind())),
        };
        let member = self
            .name_to_member
            .get(name)
            .map(|index| &self.members[*index])
            .ok_or_else(|| {
                Error::from(ErrorKind::UnknownChoiceMember {
                    expected: self.names(),
                    got: name.clone(),
                })
            })?;
        member
            .node
            .encode(registry, value, out, values)
            .map_err(|e| e.add_location(&member.name))
    }
}

/// Explicit tagging, ITU-T X.690, 8.14: an additional constructed encoding around the encoding of
/// the tagged type
#[derive(Debug, Clone)]
pub struct ExplicitTag {
    tag: Vec<u8>,
    inner: Box<TypeNode>,
}

impl ExplicitTag {
    pub fn new(tag: Tag, inner: TypeNode) -> Self {
        Self {
            tag: encode_identifier(tag, true),
            inner: Box::new(inner),
        }
    }

    pub(crate) fn tag(&self) -> &[u8] {
        &self.tag
    }

    pub(crate) fn set_tag(&mut self, tag: Tag) {
        self.tag = encode_identifier(tag, true);
    }

    pub(crate) fn inner(&self) -> &TypeNode {
        &self.inner
    }

    pub(crate) fn inner_mut(&mut self) -> &mut TypeNode {
        &mut self.inner
    }

    pub(crate) fn decode(
        &self,
        registry: &Registry,
        data: &[u8],
        offset: usize,
        values: Option<&Fields>,
        depth: usize,
    ) -> Result<Decoded, Error> {
        if !tag_matches(data, offset, &self.tag) {
            return Ok(Decoded::TagMismatch);
        }
        let (length, start) = decode_length(data, offset + self.tag.len(), false)?;
        let decoded = self
            .inner
            .decode_nested(registry, data, start, values, depth)?;
        let (value, next) = match decoded {
            Decoded::Matched(value, next) => (value, next),
            Decoded::TagMismatch => {
                return Err(Error::unexpected_tag(
                    self.inner.type_label(),
                    self.inner.expected_tags(registry),
                    found_tag(data, start),
                    start,
                ))
            }
        };
        let end = match length {
            Some(length) => start + length,
            None if is_end_of_contents(data, next) => next + END_OF_CONTENTS.len(),
            None => return Err(Error::no_end_of_contents(next)),
        };
        Ok(Decoded::Matched(value, end))
    }

    pub(crate) fn encode(
        &self,
        registry: &Registry,
        value: &Value,
        out: &mut Vec<u8>,
        values: Option<&Fields>,
    ) -> Result<(), Error> {
        let mut contents = Vec::new();
        self.inner.encode(registry, value, &mut contents, values)?;
        write_tlv(out, &self.tag, &contents);
        Ok(())
    }
}

/// An open type whose actual type is selected by the value of another member of the enclosing
/// SEQUENCE or SET, ITU-T X.680 (1994) ANY DEFINED BY
#[derive(Debug, Clone)]
pub struct AnyDefinedBy {
    type_member: String,
    choices: BTreeMap<String, TypeNode>,
}

impl AnyDefinedBy {
    pub fn new<S: Into<String>>(type_member: S, choices: BTreeMap<String, TypeNode>) -> Self {
        Self {
            type_member: type_member.into(),
            choices,
        }
    }

    pub(crate) fn choices_mut(&mut self) -> impl Iterator<Item = &mut TypeNode> {
        self.choices.values_mut()
    }

    fn select(&self, values: Option<&Fields>) -> Result<&TypeNode, Error> {
        let selector = values
            .and_then(|values| values.get(&self.type_member))
            .and_then(Value::selector);
        selector
            .as_ref()
            .and_then(|selector| self.choices.get(selector))
            .ok_or_else(|| {
                ErrorKind::BadAnyDefinedByChoice(
                    selector.unwrap_or_else(|| format!("for missing {}", self.type_member)),
                )
                .into()
            })
    }

    pub(crate) fn decode(
        &self,
        registry: &Registry,
        data: &[u8],
        offset: usize,
        values: Option<&Fields>,
        depth: usize,
    ) -> Result<Decoded, Error> {
        if self.choices.is_empty() {
            return TypeNode::Any.decode_nested(registry, data, offset, values, depth);
        }
        let node = self.select(values).map_err(|e| e.at(offset))?;
        node.decode_nested(registry, data, offset, values, depth)
    }

    pub(crate) fn encode(
        &self,
        registry: &Registry,
        value: &Value,
        out: &mut Vec<u8>,
        values: Option<&Fields>,
    ) -> Result<(), Error> {
        if self.choices.is_empty() {
            return TypeNode::Any.encode(registry, value, out, values);
        }
        self.select(values)?.encode(registry, value, out, values)
    }
}

/// Stands in for a reference to a type that was still being compiled. Forwards to the node the
/// compiler placed in the registry slot.
#[derive(Debug, Clone)]
pub struct Recursive {
    slot: usize,
}

impl Recursive {
    pub(crate) fn new(slot: usize) -> Self {
        Self { slot }
    }

    pub(crate) fn slot(&self) -> usize {
        self.slot
    }

    pub(crate) fn decode(
        &self,
        registry: &Registry,
        data: &[u8],
        offset: usize,
        values: Option<&Fields>,
        depth: usize,
    ) -> Result<Decoded, Error> {
        registry
            .resolve(self.slot)
            .map_err(|e| e.at(offset))?
            .decode_nested(registry, data, offset, values, depth)
    }

    pub(crate) fn encode(
        &self,
        registry: &Registry,
        value: &Value,
        out: &mut Vec<u8>,
        values: Option<&Fields>,
    ) -> Result<(), Error> {
        registry
            .resolve(self.slot)?
            .encode(registry, value, out, values)
    }
}
