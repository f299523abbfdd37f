///ITU-T X.680 | ISO/IEC 8824-1, chapter 8
///
/// # Ordering
/// According to ITU-T X.680 | ISO/IEC 8824-1, 8.6, the canonical order is
/// a) Universal, Application, ContextSpecific and Private and
/// b) within each class, the numbers shall be ordered ascending
///
/// ```rust
/// use asn1ber_model::Tag;
/// let mut tags = vec![
///     Tag::Universal(1),
///     Tag::Application(0),
///     Tag::Private(7),
///     Tag::ContextSpecific(107),
///     Tag::ContextSpecific(32),
///     Tag::Universal(0),
/// ];
/// tags.sort();
/// assert_eq!(tags, vec![
///     Tag::Universal(0),
///     Tag::Universal(1),
///     Tag::Application(0),
///     Tag::ContextSpecific(32),
///     Tag::ContextSpecific(107),
///     Tag::Private(7),
/// ]);
/// ```
#[derive(Debug, Clone, Copy, PartialOrd, PartialEq, Ord, Eq, Hash)]
pub enum Tag {
    Universal(usize),
    Application(usize),
    ContextSpecific(usize),
    Private(usize),
}

impl Tag {
    pub const END_OF_CONTENTS: Tag = Tag::Universal(0);
    pub const DEFAULT_BOOLEAN: Tag = Tag::Universal(1);
    pub const DEFAULT_INTEGER: Tag = Tag::Universal(2);
    pub const DEFAULT_BIT_STRING: Tag = Tag::Universal(3);
    pub const DEFAULT_OCTET_STRING: Tag = Tag::Universal(4);
    pub const DEFAULT_NULL: Tag = Tag::Universal(5);
    pub const DEFAULT_OBJECT_IDENTIFIER: Tag = Tag::Universal(6);
    pub const DEFAULT_OBJECT_DESCRIPTOR: Tag = Tag::Universal(7);
    pub const DEFAULT_EXTERNAL: Tag = Tag::Universal(8);
    pub const DEFAULT_REAL: Tag = Tag::Universal(9);
    pub const DEFAULT_ENUMERATED: Tag = Tag::Universal(10);
    pub const DEFAULT_UTF8_STRING: Tag = Tag::Universal(12);
    pub const DEFAULT_SEQUENCE: Tag = Tag::Universal(16);
    pub const DEFAULT_SEQUENCE_OF: Tag = Tag::Universal(16);
    pub const DEFAULT_SET: Tag = Tag::Universal(17);
    pub const DEFAULT_SET_OF: Tag = Tag::Universal(17);

    /// ITU-T Rec. X.680, 41
    pub const DEFAULT_NUMERIC_STRING: Tag = Tag::Universal(18);
    /// ITU-T Rec. X.680, 41
    pub const DEFAULT_PRINTABLE_STRING: Tag = Tag::Universal(19);
    /// ITU-T Rec. X.680, 41
    pub const DEFAULT_TELETEXT_STRING: Tag = Tag::Universal(20);
    /// ITU-T Rec. X.680, 41
    pub const DEFAULT_VIDEOTEXT_STRING: Tag = Tag::Universal(21);
    /// ITU-T Rec. X.680, 41
    pub const DEFAULT_IA5_STRING: Tag = Tag::Universal(22);
    pub const DEFAULT_UTC_TIME: Tag = Tag::Universal(23);
    pub const DEFAULT_GENERALIZED_TIME: Tag = Tag::Universal(24);
    /// ITU-T Rec. X.680, 41
    pub const DEFAULT_GRAPHIC_STRING: Tag = Tag::Universal(25);
    /// ITU-T Rec. X.680, 41
    pub const DEFAULT_VISIBLE_STRING: Tag = Tag::Universal(26);
    /// ITU-T Rec. X.680, 41
    pub const DEFAULT_GENERAL_STRING: Tag = Tag::Universal(27);
    /// ITU-T Rec. X.680, 41
    pub const DEFAULT_UNIVERSAL_STRING: Tag = Tag::Universal(28);
    /// ITU-T Rec. X.680, 41
    pub const DEFAULT_BMP_STRING: Tag = Tag::Universal(30);
    pub const DEFAULT_DATE: Tag = Tag::Universal(31);
    pub const DEFAULT_TIME_OF_DAY: Tag = Tag::Universal(32);
    pub const DEFAULT_DATE_TIME: Tag = Tag::Universal(33);

    pub const fn new(class: Class, number: usize) -> Self {
        match class {
            Class::Universal => Tag::Universal(number),
            Class::Application => Tag::Application(number),
            Class::ContextSpecific => Tag::ContextSpecific(number),
            Class::Private => Tag::Private(number),
        }
    }

    pub const fn class(self) -> Class {
        match self {
            Tag::Universal(_) => Class::Universal,
            Tag::Application(_) => Class::Application,
            Tag::ContextSpecific(_) => Class::ContextSpecific,
            Tag::Private(_) => Class::Private,
        }
    }

    pub const fn number(self) -> usize {
        match self {
            Tag::Universal(n)
            | Tag::Application(n)
            | Tag::ContextSpecific(n)
            | Tag::Private(n) => n,
        }
    }
}

impl From<&TagDescriptor> for Tag {
    /// A tag without an explicit class is context-specific, as in `[3]`.
    fn from(descriptor: &TagDescriptor) -> Self {
        Tag::new(
            descriptor.class.unwrap_or(Class::ContextSpecific),
            descriptor.number,
        )
    }
}

/// ITU-T X.680 | ISO/IEC 8824-1, 8.1
#[derive(
    Debug, Clone, Copy, PartialOrd, PartialEq, Ord, Eq, Hash, Deserialize, IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Class {
    #[strum(serialize = "UNIVERSAL")]
    Universal,
    #[strum(serialize = "APPLICATION")]
    Application,
    #[strum(serialize = "CONTEXT-SPECIFIC")]
    ContextSpecific,
    #[strum(serialize = "PRIVATE")]
    Private,
}

/// ITU-T X.680 | ISO/IEC 8824-1, 31.2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TagKind {
    Explicit,
    Implicit,
}

/// The module-wide tagging environment, ITU-T X.680 | ISO/IEC 8824-1, 13.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TagDefault {
    Explicit,
    Implicit,
    Automatic,
}

impl Default for TagDefault {
    /// ITU-T X.680 | ISO/IEC 8824-1, 13.2: "If the "TagDefault" is empty, then "EXPLICIT TAGS"
    /// is assumed"
    fn default() -> Self {
        TagDefault::Explicit
    }
}

/// The `tag` entry of a type descriptor, e.g. `[APPLICATION 7] IMPLICIT`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagDescriptor {
    pub number: usize,
    #[serde(default)]
    pub class: Option<Class>,
    #[serde(default)]
    pub kind: Option<TagKind>,
}

impl TagDescriptor {
    pub fn context(number: usize) -> Self {
        Self {
            number,
            class: None,
            kind: None,
        }
    }

    pub fn with_class(mut self, class: Class) -> Self {
        self.class = Some(class);
        self
    }

    pub fn explicit(mut self) -> Self {
        self.kind = Some(TagKind::Explicit);
        self
    }

    pub fn implicit(mut self) -> Self {
        self.kind = Some(TagKind::Implicit);
        self
    }

    /// Whether this tag wraps the tagged type in an additional constructed encoding, given the
    /// tagging environment of the module the type is defined in.
    pub fn is_explicit(&self, environment: TagDefault) -> bool {
        match self.kind {
            Some(TagKind::Explicit) => true,
            Some(TagKind::Implicit) => false,
            None => environment == TagDefault::Explicit,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[test]
    fn test_tag_from_descriptor_defaults_to_context_specific() {
        assert_eq!(
            Tag::ContextSpecific(3),
            Tag::from(&TagDescriptor::context(3))
        );
        assert_eq!(
            Tag::Application(7),
            Tag::from(&TagDescriptor::context(7).with_class(Class::Application))
        );
    }

    #[test]
    fn test_class_and_number_round_trip() {
        for class in &[
            Class::Universal,
            Class::Application,
            Class::ContextSpecific,
            Class::Private,
        ] {
            let tag = Tag::new(*class, 1337);
            assert_eq!(*class, tag.class());
            assert_eq!(1337, tag.number());
        }
    }

    #[test]
    fn test_explicitness_follows_environment() {
        let tag = TagDescriptor::context(0);
        assert!(tag.is_explicit(TagDefault::Explicit));
        assert!(!tag.is_explicit(TagDefault::Implicit));
        assert!(!tag.is_explicit(TagDefault::Automatic));
        assert!(tag.clone().explicit().is_explicit(TagDefault::Implicit));
        assert!(!tag.implicit().is_explicit(TagDefault::Explicit));
    }

    #[test]
    fn test_deserialize_tag_descriptor() {
        let json = r#"{"number": 5, "class": "CONTEXT-SPECIFIC", "kind": "IMPLICIT"}"#;
        let tag: TagDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(
            TagDescriptor::context(5)
                .with_class(Class::ContextSpecific)
                .implicit(),
            tag
        );
    }

    #[test]
    fn test_class_label() {
        let label: &'static str = Class::ContextSpecific.into();
        assert_eq!("CONTEXT-SPECIFIC", label);
    }
}
