//! The module description an ASN.1 parser produces and the BER compiler consumes.
//!
//! Only the keys the codec needs are modelled; everything else the parser emits (constraints,
//! value assignments, object classes, ...) is ignored while deserializing.

mod tag;

pub use tag::*;

use std::collections::BTreeMap;
use std::str::FromStr;

/// All modules of one compilation, by module name
pub type Specification = BTreeMap<String, ModuleDescription>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModuleDescription {
    #[serde(default)]
    pub types: BTreeMap<String, TypeDescriptor>,
    #[serde(default)]
    pub tags: Option<TagDefault>,
    /// Imported type names, by the module they are imported from
    #[serde(default)]
    pub imports: BTreeMap<String, Vec<String>>,
}

impl ModuleDescription {
    pub fn tag_default(&self) -> TagDefault {
        self.tags.unwrap_or_default()
    }

    /// The name of the module `type_name` is imported from, if it is imported at all
    pub fn imported_from(&self, type_name: &str) -> Option<&str> {
        self.imports
            .iter()
            .find(|(_, names)| names.iter().any(|name| name == type_name))
            .map(|(module, _)| module.as_str())
    }
}

/// The sentinel the parser places in member and enumeration lists, ITU-T X.680, 25.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ExtensionMarker {
    #[serde(rename = "...")]
    Marker,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MemberEntry {
    ExtensionMarker(ExtensionMarker),
    /// An extension addition group `[[ ... ]]`
    Group(Vec<TypeDescriptor>),
    Member(Box<TypeDescriptor>),
}

impl From<TypeDescriptor> for MemberEntry {
    fn from(descriptor: TypeDescriptor) -> Self {
        MemberEntry::Member(Box::new(descriptor))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EnumEntry {
    ExtensionMarker(ExtensionMarker),
    Value(String, i64),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    List(Vec<DefaultValue>),
    Null,
}

/// Describes one type, either a named type or a member/element of a constructed type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TypeDescriptor {
    /// The built-in type keyword (see [`TypeName`]) or the name of a referenced type
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tag: Option<TagDescriptor>,
    #[serde(default)]
    pub members: Option<Vec<MemberEntry>>,
    #[serde(default)]
    pub element: Option<Box<TypeDescriptor>>,
    #[serde(default)]
    pub values: Option<Vec<EnumEntry>>,
    #[serde(default, rename = "named-bits")]
    pub named_bits: Option<Vec<(String, u64)>>,
    /// The open type table of `ANY DEFINED BY`, by governing value
    #[serde(default)]
    pub choices: Option<BTreeMap<String, TypeDescriptor>>,
    /// The governing member of `ANY DEFINED BY`
    #[serde(default)]
    pub value: Option<String>,
    /// The module a referenced type lives in, if not the current one
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub default: Option<DefaultValue>,
}

impl TypeDescriptor {
    pub fn new<S: Into<String>>(type_name: S) -> Self {
        Self {
            type_name: type_name.into(),
            ..Default::default()
        }
    }

    pub fn named<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tag(mut self, tag: TagDescriptor) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_members<I: IntoIterator<Item = MemberEntry>>(mut self, members: I) -> Self {
        self.members = Some(members.into_iter().collect());
        self
    }

    pub fn with_element(mut self, element: TypeDescriptor) -> Self {
        self.element = Some(Box::new(element));
        self
    }

    pub fn with_values<I: IntoIterator<Item = EnumEntry>>(mut self, values: I) -> Self {
        self.values = Some(values.into_iter().collect());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// The built-in type this descriptor names or `None` for a type reference
    pub fn builtin(&self) -> Option<TypeName> {
        TypeName::from_str(&self.type_name).ok()
    }
}

/// The keywords of the built-in types, ITU-T X.680 | ISO/IEC 8824-1, 16.2
///
/// ```rust
/// use asn1ber_model::TypeName;
/// use std::str::FromStr;
/// assert_eq!(Ok(TypeName::SequenceOf), TypeName::from_str("SEQUENCE OF"));
/// assert_eq!(Ok(TypeName::TeletexString), TypeName::from_str("T61String"));
/// assert!(TypeName::from_str("MyType").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
pub enum TypeName {
    #[strum(serialize = "BOOLEAN")]
    Boolean,
    #[strum(serialize = "INTEGER")]
    Integer,
    #[strum(serialize = "REAL")]
    Real,
    #[strum(serialize = "ENUMERATED")]
    Enumerated,
    #[strum(serialize = "NULL")]
    Null,
    #[strum(serialize = "BIT STRING")]
    BitString,
    #[strum(serialize = "OCTET STRING")]
    OctetString,
    #[strum(serialize = "OBJECT IDENTIFIER")]
    ObjectIdentifier,
    #[strum(serialize = "ObjectDescriptor")]
    ObjectDescriptor,
    #[strum(serialize = "EXTERNAL")]
    External,
    #[strum(serialize = "UTF8String")]
    Utf8String,
    #[strum(serialize = "NumericString")]
    NumericString,
    #[strum(serialize = "PrintableString")]
    PrintableString,
    #[strum(to_string = "TeletexString", serialize = "T61String")]
    TeletexString,
    #[strum(serialize = "IA5String")]
    Ia5String,
    #[strum(serialize = "GraphicString")]
    GraphicString,
    #[strum(serialize = "VisibleString")]
    VisibleString,
    #[strum(serialize = "GeneralString")]
    GeneralString,
    #[strum(serialize = "UniversalString")]
    UniversalString,
    #[strum(serialize = "BMPString")]
    BmpString,
    #[strum(serialize = "UTCTime")]
    UtcTime,
    #[strum(serialize = "GeneralizedTime")]
    GeneralizedTime,
    #[strum(serialize = "DATE")]
    Date,
    #[strum(serialize = "TIME-OF-DAY")]
    TimeOfDay,
    #[strum(serialize = "DATE-TIME")]
    DateTime,
    #[strum(serialize = "ANY")]
    Any,
    #[strum(serialize = "ANY DEFINED BY")]
    AnyDefinedBy,
    #[strum(serialize = "SEQUENCE")]
    Sequence,
    #[strum(serialize = "SEQUENCE OF")]
    SequenceOf,
    #[strum(serialize = "SET")]
    Set,
    #[strum(serialize = "SET OF")]
    SetOf,
    #[strum(serialize = "CHOICE")]
    Choice,
}

impl TypeName {
    pub fn label(self) -> &'static str {
        self.into()
    }
}
