//! Turns the module descriptions of a [`Specification`] into trees of [`TypeNode`]s.
//!
//! References to types that are still being compiled become [`Recursive`] nodes. Each of them
//! owns a slot in the [`Registry`] that is filled once all types are compiled, after which the
//! tag tables of choices with such members are completed.

use crate::compiled::{CompiledModules, CompiledType};
use crate::protocol::basic::err::{Error, ErrorKind};
use crate::protocol::basic::node::{
    BitStringNode, Enumerated, Member, Primitive, Registry, SegmentTags, SlotTags, StringNode,
    TextEncoding, TimeKind, TimeNode, TypeNode,
};
use crate::protocol::basic::octets::FLAG_CONSTRUCTED;
use crate::protocol::basic::structure::{
    Addition, AnyDefinedBy, ArrayType, Choice, ExplicitTag, MembersType, Recursive,
};
use crate::protocol::basic::time;
use crate::value::{BitString, Value};
use asn1ber_model::{
    DefaultValue, EnumEntry, MemberEntry, Specification, Tag, TagDescriptor, TypeDescriptor,
    TypeName,
};
use log::{debug, trace};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Compiles all types of all modules with the default options
pub fn compile(specification: &Specification) -> Result<CompiledModules, Error> {
    Compiler::default().compile(specification)
}

/// Like [`compile`], for a specification given as JSON text
#[cfg(feature = "json")]
pub fn compile_json_str(specification: &str) -> Result<CompiledModules, Error> {
    let specification: Specification = serde_json::from_str(specification)?;
    compile(&specification)
}

#[derive(Debug, Clone, Default)]
pub struct Compiler {
    numeric_enums: bool,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Represent ENUMERATED values by their number instead of their label
    pub fn with_numeric_enums(mut self, numeric_enums: bool) -> Self {
        self.numeric_enums = numeric_enums;
        self
    }

    pub fn compile(&self, specification: &Specification) -> Result<CompiledModules, Error> {
        let mut state = State {
            specification,
            numeric_enums: self.numeric_enums,
            stack: Vec::new(),
            compiled: HashMap::new(),
            placeholders: Vec::new(),
        };

        let mut roots = Vec::new();
        for (module_name, module) in specification {
            for type_name in module.types.keys() {
                let node = state.compile_named(module_name, type_name)?;
                roots.push((module_name.clone(), type_name.clone(), node));
            }
        }

        let registry = Arc::new(state.resolve_recursion(&mut roots)?);
        let mut modules: BTreeMap<String, BTreeMap<String, CompiledType>> = BTreeMap::new();
        for module_name in specification.keys() {
            modules.entry(module_name.clone()).or_default();
        }
        for (module_name, type_name, node) in roots {
            let compiled = CompiledType::new(
                module_name.clone(),
                type_name.clone(),
                node,
                Arc::clone(&registry),
            );
            modules
                .entry(module_name)
                .or_default()
                .insert(type_name, compiled);
        }
        Ok(CompiledModules::new(modules))
    }
}

/// A reference to a type that was on the compile stack when it was referenced
struct Placeholder {
    module: String,
    type_name: String,
    /// An implicit tag applied to the reference
    tag: Option<Tag>,
}

struct State<'a> {
    specification: &'a Specification,
    numeric_enums: bool,
    stack: Vec<(String, String)>,
    compiled: HashMap<(String, String), TypeNode>,
    placeholders: Vec<Placeholder>,
}

impl<'a> State<'a> {
    fn descriptor(&self, module: &str, type_name: &str) -> Result<&'a TypeDescriptor, Error> {
        let specification = self.specification;
        let module_description = specification
            .get(module)
            .ok_or_else(|| Error::from(ErrorKind::UnknownModule(module.to_string())))?;
        module_description
            .types
            .get(type_name)
            .ok_or_else(|| Error::unknown_type(module, type_name))
    }

    /// The module `type_name` is defined in, when referenced from within `module`
    fn defining_module(
        &self,
        module: &str,
        descriptor: &TypeDescriptor,
    ) -> Result<String, Error> {
        if let Some(explicit) = &descriptor.module {
            return Ok(explicit.clone());
        }
        let module_description = self
            .specification
            .get(module)
            .ok_or_else(|| Error::from(ErrorKind::UnknownModule(module.to_string())))?;
        if module_description.types.contains_key(&descriptor.type_name) {
            Ok(module.to_string())
        } else if let Some(imported) = module_description.imported_from(&descriptor.type_name) {
            Ok(imported.to_string())
        } else {
            Err(Error::unknown_type(module, &descriptor.type_name))
        }
    }

    fn compile_named(&mut self, module: &str, type_name: &str) -> Result<TypeNode, Error> {
        let key = (module.to_string(), type_name.to_string());
        if let Some(node) = self.compiled.get(&key) {
            return Ok(node.clone());
        }

        debug!("Compiling {}.{}", module, type_name);
        let descriptor = self.descriptor(module, type_name)?;
        self.stack.push(key.clone());
        let result = self.compile_type(module, descriptor);
        self.stack.pop();

        let node = result.map_err(|e| e.add_location(type_name))?;
        self.compiled.insert(key, node.clone());
        Ok(node)
    }

    fn compile_type(
        &mut self,
        module: &str,
        descriptor: &'a TypeDescriptor,
    ) -> Result<TypeNode, Error> {
        let node = self.compile_untagged(module, descriptor)?;
        match &descriptor.tag {
            None => Ok(node),
            Some(tag) => self.apply_tag(module, tag, node),
        }
    }

    fn apply_tag(
        &mut self,
        module: &str,
        descriptor: &TagDescriptor,
        mut node: TypeNode,
    ) -> Result<TypeNode, Error> {
        let tag = Tag::from(descriptor);
        let environment = self.tag_default(module)?;
        let explicit = descriptor.is_explicit(environment)
            || node.is_untagged()
            || self.is_untagged_placeholder(&node);

        if explicit {
            Ok(TypeNode::ExplicitTag(ExplicitTag::new(tag, node)))
        } else if let TypeNode::Recursive(recursive) = &node {
            let placeholder = &self.placeholders[recursive.slot()];
            let (module, type_name) = (placeholder.module.clone(), placeholder.type_name.clone());
            Ok(self.placeholder(module, type_name, Some(tag)))
        } else {
            node.set_tag(tag);
            Ok(node)
        }
    }

    fn tag_default(&self, module: &str) -> Result<asn1ber_model::TagDefault, Error> {
        self.specification
            .get(module)
            .map(|module| module.tag_default())
            .ok_or_else(|| ErrorKind::UnknownModule(module.to_string()).into())
    }

    fn is_untagged_placeholder(&self, node: &TypeNode) -> bool {
        match node {
            TypeNode::Recursive(recursive) => {
                let placeholder = &self.placeholders[recursive.slot()];
                placeholder.tag.is_none()
                    && self.resolves_to_untagged(&placeholder.module, &placeholder.type_name, 0)
            }
            _ => false,
        }
    }

    /// Whether the named type is a CHOICE, ANY or ANY DEFINED BY without a tag of its own
    fn resolves_to_untagged(&self, module: &str, type_name: &str, depth: usize) -> bool {
        let descriptor = match self.descriptor(module, type_name) {
            Ok(descriptor) => descriptor,
            Err(_) => return false,
        };
        if descriptor.tag.is_some() {
            return false;
        }
        match descriptor.builtin() {
            Some(TypeName::Choice) | Some(TypeName::Any) | Some(TypeName::AnyDefinedBy) => true,
            Some(_) => false,
            None if depth > self.type_count() => false,
            None => match self.defining_module(module, descriptor) {
                Ok(target) => self.resolves_to_untagged(&target, &descriptor.type_name, depth + 1),
                Err(_) => false,
            },
        }
    }

    fn type_count(&self) -> usize {
        self.specification
            .values()
            .map(|module| module.types.len())
            .sum()
    }

    fn placeholder(&mut self, module: String, type_name: String, tag: Option<Tag>) -> TypeNode {
        let slot = self.placeholders.len();
        trace!(
            "Placeholder {} for recursive reference to {}.{}",
            slot,
            module,
            type_name
        );
        self.placeholders.push(Placeholder {
            module,
            type_name,
            tag,
        });
        TypeNode::Recursive(Recursive::new(slot))
    }

    fn compile_untagged(
        &mut self,
        module: &str,
        descriptor: &'a TypeDescriptor,
    ) -> Result<TypeNode, Error> {
        let type_name = match descriptor.builtin() {
            Some(type_name) => type_name,
            None => return self.compile_reference(module, descriptor),
        };

        Ok(match type_name {
            TypeName::Boolean => TypeNode::Boolean(Primitive::new(Tag::DEFAULT_BOOLEAN)),
            TypeName::Integer => TypeNode::Integer(Primitive::new(Tag::DEFAULT_INTEGER)),
            TypeName::Real => TypeNode::Real(Primitive::new(Tag::DEFAULT_REAL)),
            TypeName::Null => TypeNode::Null(Primitive::new(Tag::DEFAULT_NULL)),
            TypeName::ObjectIdentifier => {
                TypeNode::ObjectIdentifier(Primitive::new(Tag::DEFAULT_OBJECT_IDENTIFIER))
            }
            TypeName::Enumerated => self.compile_enumerated(descriptor)?,
            TypeName::BitString => TypeNode::BitString(BitStringNode::new(
                descriptor.named_bits.is_some(),
            )),
            TypeName::OctetString => TypeNode::OctetString(SegmentTags::new(
                Tag::DEFAULT_OCTET_STRING,
                Tag::DEFAULT_OCTET_STRING,
            )),
            TypeName::External => external(),
            TypeName::ObjectDescriptor
            | TypeName::Utf8String
            | TypeName::NumericString
            | TypeName::PrintableString
            | TypeName::TeletexString
            | TypeName::Ia5String
            | TypeName::GraphicString
            | TypeName::VisibleString
            | TypeName::GeneralString
            | TypeName::UniversalString
            | TypeName::BmpString => string(type_name),
            TypeName::UtcTime => TypeNode::Time(TimeNode::new(TimeKind::UtcTime)),
            TypeName::GeneralizedTime => TypeNode::Time(TimeNode::new(TimeKind::GeneralizedTime)),
            TypeName::Date => TypeNode::Time(TimeNode::new(TimeKind::Date)),
            TypeName::TimeOfDay => TypeNode::Time(TimeNode::new(TimeKind::TimeOfDay)),
            TypeName::DateTime => TypeNode::Time(TimeNode::new(TimeKind::DateTime)),
            TypeName::Any => TypeNode::Any,
            TypeName::AnyDefinedBy => self.compile_any_defined_by(module, descriptor)?,
            TypeName::Sequence => {
                let (root, additions) = self.compile_members(module, descriptor)?;
                TypeNode::Sequence(MembersType::sequence(root, additions))
            }
            TypeName::Set => {
                let (root, additions) = self.compile_members(module, descriptor)?;
                TypeNode::Set(MembersType::set(root, additions))
            }
            TypeName::SequenceOf => TypeNode::SequenceOf(ArrayType::sequence_of(
                self.compile_element(module, descriptor)?,
            )),
            TypeName::SetOf => {
                TypeNode::SetOf(ArrayType::set_of(self.compile_element(module, descriptor)?))
            }
            TypeName::Choice => {
                let (root, additions) = self.compile_members(module, descriptor)?;
                let extensible = additions.is_some();
                let mut members = root;
                for addition in additions.into_iter().flatten() {
                    match addition {
                        Addition::Member(member) => members.push(member),
                        Addition::Group(group) => members.extend(group),
                    }
                }
                TypeNode::Choice(Choice::new(members, extensible))
            }
        })
    }

    fn compile_reference(
        &mut self,
        module: &str,
        descriptor: &TypeDescriptor,
    ) -> Result<TypeNode, Error> {
        let target = self.defining_module(module, descriptor)?;
        let key = (target, descriptor.type_name.clone());
        if self.stack.contains(&key) {
            let (module, type_name) = key;
            Ok(self.placeholder(module, type_name, None))
        } else {
            self.compile_named(&key.0, &key.1)
        }
    }

    fn compile_enumerated(&self, descriptor: &TypeDescriptor) -> Result<TypeNode, Error> {
        let entries = descriptor
            .values
            .as_ref()
            .ok_or_else(|| Error::missing_descriptor_key(&descriptor.type_name, "values"))?;
        let mut values = Vec::with_capacity(entries.len());
        let mut extensible = false;
        for entry in entries {
            match entry {
                EnumEntry::ExtensionMarker(_) => extensible = true,
                EnumEntry::Value(label, number) => {
                    values.push((label.clone(), i128::from(*number)))
                }
            }
        }
        Ok(TypeNode::Enumerated(Enumerated::new(
            values,
            extensible,
            self.numeric_enums,
        )))
    }

    fn compile_any_defined_by(
        &mut self,
        module: &str,
        descriptor: &'a TypeDescriptor,
    ) -> Result<TypeNode, Error> {
        let type_member = descriptor
            .value
            .as_ref()
            .ok_or_else(|| Error::missing_descriptor_key(&descriptor.type_name, "value"))?;
        let mut choices = BTreeMap::new();
        for (key, choice) in descriptor.choices.iter().flatten() {
            let node = self
                .compile_type(module, choice)
                .map_err(|e| e.add_location(key))?;
            choices.insert(key.clone(), node);
        }
        Ok(TypeNode::AnyDefinedBy(AnyDefinedBy::new(
            type_member.clone(),
            choices,
        )))
    }

    fn compile_element(
        &mut self,
        module: &str,
        descriptor: &'a TypeDescriptor,
    ) -> Result<TypeNode, Error> {
        let element = descriptor
            .element
            .as_ref()
            .ok_or_else(|| Error::missing_descriptor_key(&descriptor.type_name, "element"))?;
        self.compile_type(module, element)
    }

    /// The root members and, if there is an extension marker, the extension additions. A second
    /// marker ends the additions, members after it are root members again.
    fn compile_members(
        &mut self,
        module: &str,
        descriptor: &'a TypeDescriptor,
    ) -> Result<(Vec<Member>, Option<Vec<Addition>>), Error> {
        let entries = descriptor
            .members
            .as_ref()
            .ok_or_else(|| Error::missing_descriptor_key(&descriptor.type_name, "members"))?;

        let mut root = Vec::new();
        let mut additions = None;
        let mut in_extension = false;
        for entry in entries {
            match entry {
                MemberEntry::ExtensionMarker(_) => {
                    in_extension = !in_extension;
                    additions.get_or_insert_with(Vec::new);
                }
                MemberEntry::Member(member) => {
                    let member = self.compile_member(module, member)?;
                    if in_extension {
                        additions
                            .get_or_insert_with(Vec::new)
                            .push(Addition::Member(member));
                    } else {
                        root.push(member);
                    }
                }
                MemberEntry::Group(group) => {
                    let members = group
                        .iter()
                        .map(|member| self.compile_member(module, member))
                        .collect::<Result<Vec<_>, _>>()?;
                    if in_extension {
                        additions
                            .get_or_insert_with(Vec::new)
                            .push(Addition::Group(members));
                    } else {
                        root.extend(members);
                    }
                }
            }
        }
        Ok((root, additions))
    }

    fn compile_member(
        &mut self,
        module: &str,
        descriptor: &'a TypeDescriptor,
    ) -> Result<Member, Error> {
        let name = descriptor
            .name
            .as_ref()
            .ok_or_else(|| Error::missing_descriptor_key(&descriptor.type_name, "name"))?;
        let node = self
            .compile_type(module, descriptor)
            .map_err(|e| e.add_location(name))?;
        let default = match &descriptor.default {
            Some(default) => {
                Some(convert_default(&node, default).map_err(|e| e.add_location(name))?)
            }
            None => None,
        };
        Ok(Member {
            name: name.clone(),
            node,
            optional: descriptor.optional,
            default,
        })
    }

    /// Fills the registry slots with the nodes the placeholders stand for and completes the tag
    /// tables of all choices that have recursive members
    fn resolve_recursion(
        &self,
        roots: &mut [(String, String, TypeNode)],
    ) -> Result<Registry, Error> {
        let mut slots = Vec::with_capacity(self.placeholders.len());
        for slot in 0..self.placeholders.len() {
            slots.push(self.slot_node(slot, 0)?);
        }

        // Recursive untagged choices may contain their own tags, so grow all tag sets from
        // empty ones until they no longer change
        let mut slot_tags = vec![Some(Vec::new()); slots.len()];
        loop {
            let mut changed = false;
            for (slot, node) in slots.iter().enumerate() {
                let mut tags = node.tags(&slot_tags).unwrap_or_default();
                tags.sort();
                tags.dedup();
                if slot_tags[slot].as_ref() != Some(&tags) {
                    slot_tags[slot] = Some(tags);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        // SET members are ordered only now, as recursive members have no tags before
        let mut patched = 0;
        let mut complete = |node: &mut TypeNode| match node {
            TypeNode::Choice(choice) if choice.has_deferred() => {
                choice.backpatch(&slot_tags);
                patched += 1;
            }
            TypeNode::Set(set) => set
                .root_members_mut()
                .sort_by_key(|member| canonical_order(member, &slot_tags)),
            _ => {}
        };
        for (_, _, node) in roots.iter_mut() {
            node.for_each_node_mut(&mut complete);
        }
        for node in slots.iter_mut() {
            node.for_each_node_mut(&mut complete);
        }
        trace!(
            "Resolved {} recursive reference(s), backpatched {} choice(s)",
            slots.len(),
            patched
        );

        Ok(Registry {
            slot_names: self
                .placeholders
                .iter()
                .map(|placeholder| format!("{}.{}", placeholder.module, placeholder.type_name))
                .collect(),
            slots: slots.into_iter().map(Some).collect(),
            slot_tags,
        })
    }

    fn slot_node(&self, slot: usize, depth: usize) -> Result<TypeNode, Error> {
        let placeholder = &self.placeholders[slot];
        let name = format!("{}.{}", placeholder.module, placeholder.type_name);
        let mut node = self
            .compiled
            .get(&(placeholder.module.clone(), placeholder.type_name.clone()))
            .cloned()
            .ok_or_else(|| Error::from(ErrorKind::UnresolvedRecursion(name.clone())))?;

        if let TypeNode::Recursive(alias) = &node {
            if depth >= self.placeholders.len() {
                return Err(ErrorKind::UnresolvedRecursion(name).into());
            }
            node = self.slot_node(alias.slot(), depth + 1)?;
        }
        if let Some(tag) = placeholder.tag {
            if node.is_untagged() {
                node = TypeNode::ExplicitTag(ExplicitTag::new(tag, node));
            } else {
                node.set_tag(tag);
            }
        }
        trace!("Resolved placeholder {} to {}", slot, name);
        Ok(node)
    }
}

fn string(type_name: TypeName) -> TypeNode {
    let (tag, encoding) = match type_name {
        TypeName::Utf8String => (Tag::DEFAULT_UTF8_STRING, TextEncoding::Utf8),
        TypeName::NumericString => (Tag::DEFAULT_NUMERIC_STRING, TextEncoding::Ascii),
        TypeName::PrintableString => (Tag::DEFAULT_PRINTABLE_STRING, TextEncoding::Ascii),
        TypeName::Ia5String => (Tag::DEFAULT_IA5_STRING, TextEncoding::Ascii),
        TypeName::VisibleString => (Tag::DEFAULT_VISIBLE_STRING, TextEncoding::Ascii),
        TypeName::TeletexString => (Tag::DEFAULT_TELETEXT_STRING, TextEncoding::Latin1),
        TypeName::GraphicString => (Tag::DEFAULT_GRAPHIC_STRING, TextEncoding::Latin1),
        TypeName::GeneralString => (Tag::DEFAULT_GENERAL_STRING, TextEncoding::Latin1),
        TypeName::BmpString => (Tag::DEFAULT_BMP_STRING, TextEncoding::Utf16Be),
        TypeName::UniversalString => (Tag::DEFAULT_UNIVERSAL_STRING, TextEncoding::Utf32Be),
        _ => (Tag::DEFAULT_OBJECT_DESCRIPTOR, TextEncoding::Latin1),
    };
    TypeNode::String(StringNode::new(type_name.label(), tag, encoding))
}

/// ITU-T X.680, 37.5
fn external() -> TypeNode {
    let mut octet_aligned = TypeNode::OctetString(SegmentTags::new(
        Tag::DEFAULT_OCTET_STRING,
        Tag::DEFAULT_OCTET_STRING,
    ));
    octet_aligned.set_tag(Tag::ContextSpecific(1));
    let mut arbitrary = TypeNode::BitString(BitStringNode::new(false));
    arbitrary.set_tag(Tag::ContextSpecific(2));

    let encoding = Choice::new(
        vec![
            Member::new(
                "single-ASN1-type",
                TypeNode::ExplicitTag(ExplicitTag::new(Tag::ContextSpecific(0), TypeNode::Any)),
            ),
            Member::new("octet-aligned", octet_aligned),
            Member::new("arbitrary", arbitrary),
        ],
        false,
    );
    let mut external = TypeNode::Sequence(MembersType::sequence(
        vec![
            Member::new(
                "direct-reference",
                TypeNode::ObjectIdentifier(Primitive::new(Tag::DEFAULT_OBJECT_IDENTIFIER)),
            )
            .optional(),
            Member::new(
                "indirect-reference",
                TypeNode::Integer(Primitive::new(Tag::DEFAULT_INTEGER)),
            )
            .optional(),
            Member::new("data-value-descriptor", string(TypeName::ObjectDescriptor)).optional(),
            Member::new("encoding", TypeNode::Choice(encoding)),
        ],
        None,
    ));
    external.set_tag(Tag::DEFAULT_EXTERNAL);
    external
}

/// ITU-T X.690, 8.11.1 leaves the order of SET members to the sender. They are encoded in the
/// canonical order of their tags, ignoring the constructed bit.
fn canonical_order(member: &Member, slot_tags: &SlotTags) -> (bool, Option<Vec<u8>>) {
    let tag = member.node.tags(slot_tags).and_then(|tags| {
        tags.into_iter()
            .map(|mut tag| {
                if let Some(first) = tag.first_mut() {
                    *first &= !FLAG_CONSTRUCTED;
                }
                tag
            })
            .min()
    });
    (tag.is_none(), tag)
}

/// Converts the default value of a member to the value of its compiled type
fn convert_default(node: &TypeNode, default: &DefaultValue) -> Result<Value, Error> {
    let invalid = || Error::invalid_default(node.type_label(), format!("{:?}", default));
    let value = match (node, default) {
        (TypeNode::Boolean(_), DefaultValue::Boolean(value)) => Value::Boolean(*value),
        (TypeNode::Integer(_), DefaultValue::Integer(value)) => Value::Integer(i128::from(*value)),
        (TypeNode::Real(_), DefaultValue::Real(value)) => Value::Real(*value),
        (TypeNode::Real(_), DefaultValue::Integer(value)) => Value::Real(*value as f64),
        (TypeNode::Null(_), DefaultValue::Null) => Value::Null,
        (TypeNode::Enumerated(node), DefaultValue::Text(label)) => {
            node.value_of(label).ok_or_else(invalid)?
        }
        (TypeNode::BitString(_), DefaultValue::Text(bits)) => {
            Value::BitString(BitString::from_binary(bits).ok_or_else(invalid)?)
        }
        (TypeNode::OctetString(_), DefaultValue::Text(text)) => {
            Value::OctetString(hex::decode(text.trim()).map_err(|_| invalid())?)
        }
        (TypeNode::ObjectIdentifier(_), DefaultValue::Text(text)) => {
            Value::ObjectIdentifier(text.clone())
        }
        (TypeNode::String(_), DefaultValue::Text(text)) => Value::String(text.clone()),
        (TypeNode::Time(node), DefaultValue::Text(text)) => match node.kind() {
            TimeKind::UtcTime => Value::UtcTime(time::decode_utc_time(text)?),
            TimeKind::GeneralizedTime => {
                Value::GeneralizedTime(time::decode_generalized_time(text)?)
            }
            TimeKind::Date => Value::Date(time::decode_date(text)?),
            TimeKind::TimeOfDay => Value::TimeOfDay(time::decode_time_of_day(text)?),
            TimeKind::DateTime => Value::DateTime(time::decode_date_time(text)?),
        },
        (TypeNode::SequenceOf(array), DefaultValue::List(items))
        | (TypeNode::SetOf(array), DefaultValue::List(items)) => Value::SequenceOf(
            items
                .iter()
                .map(|item| convert_default(array.element(), item))
                .collect::<Result<_, _>>()?,
        ),
        (TypeNode::ExplicitTag(node), default) => convert_default(node.inner(), default)?,
        _ => return Err(invalid()),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use asn1ber_model::{ModuleDescription, TagDescriptor};

    fn specification(types: Vec<(&str, TypeDescriptor)>) -> Specification {
        let mut module = ModuleDescription::default();
        for (name, descriptor) in types {
            module.types.insert(name.to_string(), descriptor);
        }
        let mut specification = Specification::new();
        specification.insert("Test".to_string(), module);
        specification
    }

    #[test]
    fn test_convert_octet_string_default() {
        let octets = TypeNode::OctetString(SegmentTags::new(
            Tag::DEFAULT_OCTET_STRING,
            Tag::DEFAULT_OCTET_STRING,
        ));
        let convert = |text: &str| convert_default(&octets, &DefaultValue::Text(text.into()));
        assert_eq!(Value::OctetString(vec![0x01, 0xab]), convert(" 01AB ").unwrap());
        assert_eq!(Value::OctetString(Vec::new()), convert("").unwrap());
        for invalid in &["0", "zz"] {
            let e = convert(*invalid).unwrap_err();
            assert!(matches!(e.kind(), ErrorKind::InvalidDefault { .. }));
        }
    }

    #[test]
    fn test_convert_default() {
        let octets = TypeNode::OctetString(SegmentTags::new(
            Tag::DEFAULT_OCTET_STRING,
            Tag::DEFAULT_OCTET_STRING,
        ));
        assert_eq!(
            Value::OctetString(vec![0xde, 0xad]),
            convert_default(&octets, &DefaultValue::Text("dead".into())).unwrap()
        );
        let bits = TypeNode::BitString(BitStringNode::new(false));
        assert_eq!(
            Value::BitString(BitString::new(vec![0b1010_0000], 3)),
            convert_default(&bits, &DefaultValue::Text("101".into())).unwrap()
        );
        let integers = TypeNode::SequenceOf(ArrayType::sequence_of(TypeNode::Integer(
            Primitive::new(Tag::DEFAULT_INTEGER),
        )));
        assert_eq!(
            Value::SequenceOf(vec![Value::Integer(1), Value::Integer(2)]),
            convert_default(
                &integers,
                &DefaultValue::List(vec![DefaultValue::Integer(1), DefaultValue::Integer(2)])
            )
            .unwrap()
        );
        assert!(convert_default(&bits, &DefaultValue::Boolean(true)).is_err());
    }

    #[test]
    fn test_set_members_in_canonical_order() {
        let set = TypeDescriptor::new("SET").with_members(vec![
            TypeDescriptor::new("BOOLEAN")
                .named("b")
                .with_tag(TagDescriptor::context(1))
                .into(),
            TypeDescriptor::new("INTEGER").named("i").into(),
            TypeDescriptor::new("SEQUENCE")
                .named("s")
                .with_tag(TagDescriptor::context(0).implicit())
                .with_members(vec![])
                .into(),
        ]);
        let compiled = compile(&specification(vec![("S", set)])).unwrap();
        let node = compiled.get("Test", "S").unwrap().node();
        let names = match node {
            TypeNode::Set(set) => set
                .root_members()
                .iter()
                .map(|member| member.name.as_str())
                .collect::<Vec<_>>(),
            other => panic!("Unexpected node {:?}", other),
        };
        assert_eq!(vec!["i", "s", "b"], names);
    }

    #[test]
    fn test_unknown_type_reference() {
        let sequence = TypeDescriptor::new("SEQUENCE")
            .with_members(vec![TypeDescriptor::new("Missing").named("m").into()]);
        let e = compile(&specification(vec![("S", sequence)])).unwrap_err();
        assert!(matches!(e.kind(), ErrorKind::UnknownType { .. }));
        assert_eq!("S.m", e.location());
    }

    #[test]
    fn test_missing_descriptor_key() {
        let e = compile(&specification(vec![("L", TypeDescriptor::new("SEQUENCE OF"))]))
            .unwrap_err();
        assert!(matches!(
            e.kind(),
            ErrorKind::MissingDescriptorKey { key: "element", .. }
        ));
    }
}
