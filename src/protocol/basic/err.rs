use backtrace::Backtrace;
use std::fmt::{Debug, Display, Formatter};

pub struct Error(pub(crate) Box<Inner>);

impl Error {
    #[inline]
    pub fn kind(&self) -> &ErrorKind {
        &self.0.kind
    }

    /// The byte offset into the decoded data the error was detected at
    #[inline]
    pub fn offset(&self) -> Option<usize> {
        self.0.offset
    }

    /// The dotted path of type and member names leading to the failing element
    pub fn location(&self) -> String {
        self.0.location.join(".")
    }

    pub(crate) fn at(mut self, offset: usize) -> Self {
        self.0.offset = Some(offset);
        self
    }

    pub(crate) fn add_location(mut self, name: &str) -> Self {
        if !name.is_empty() {
            self.0.location.insert(0, name.to_string());
        }
        self
    }

    /// Whether the supplied value could not be encoded. Such errors are tolerated for extension
    /// additions, which are then left out of the encoding.
    pub fn is_encode_error(&self) -> bool {
        matches!(
            self.0.kind,
            ErrorKind::UnknownEnumerationLabel { .. }
                | ErrorKind::UnknownChoiceMember { .. }
                | ErrorKind::MissingMember { .. }
                | ErrorKind::UnexpectedValue { .. }
                | ErrorKind::UnencodableCharacter { .. }
                | ErrorKind::InvalidObjectIdentifier(_)
                | ErrorKind::InvalidBitString { .. }
                | ErrorKind::RealExponentOutOfRange(_)
                | ErrorKind::BadAnyDefinedByChoice(_)
                | ErrorKind::InvalidTime { .. }
        )
    }

    /// Whether the data ended before the element was complete
    pub fn is_out_of_data(&self) -> bool {
        matches!(
            self.0.kind,
            ErrorKind::OutOfData { .. }
                | ErrorKind::LengthOutOfData { .. }
                | ErrorKind::MissingContents { .. }
        )
    }

    #[cold]
    #[inline(never)]
    pub fn out_of_data(reading: &'static str, offset: usize) -> Self {
        Self::from(ErrorKind::OutOfData { reading }).at(offset)
    }

    #[cold]
    #[inline(never)]
    pub fn length_out_of_data(expected: usize, got: usize, offset: usize) -> Self {
        Self::from(ErrorKind::LengthOutOfData { expected, got }).at(offset)
    }

    #[cold]
    #[inline(never)]
    pub fn missing_contents(expected: usize, got: usize, offset: usize) -> Self {
        Self::from(ErrorKind::MissingContents { expected, got }).at(offset)
    }

    #[cold]
    #[inline(never)]
    pub fn unsupported_length_size(length_bytes: usize, offset: usize) -> Self {
        Self::from(ErrorKind::UnsupportedLengthSize(length_bytes)).at(offset)
    }

    #[cold]
    #[inline(never)]
    pub fn expected_definite_length(offset: usize) -> Self {
        Self::from(ErrorKind::ExpectedDefiniteLength).at(offset)
    }

    #[cold]
    #[inline(never)]
    pub fn missing_mandatory_field(member: &str, offset: usize) -> Self {
        Self::from(ErrorKind::MissingMandatoryField {
            member: member.to_string(),
        })
        .at(offset)
        .add_location(member)
    }

    #[cold]
    #[inline(never)]
    pub fn unexpected_tag(
        type_label: &str,
        expected: Vec<String>,
        got: String,
        offset: usize,
    ) -> Self {
        Self::from(ErrorKind::UnexpectedTag {
            type_label: type_label.to_string(),
            expected,
            got,
        })
        .at(offset)
    }

    #[cold]
    #[inline(never)]
    pub fn no_end_of_contents(offset: usize) -> Self {
        Self::from(ErrorKind::NoEndOfContents).at(offset)
    }

    #[cold]
    #[inline(never)]
    pub fn nesting_too_deep(limit: usize, offset: usize) -> Self {
        Self::from(ErrorKind::NestingTooDeep(limit)).at(offset)
    }

    #[cold]
    #[inline(never)]
    pub fn malformed(kind: ErrorKind, offset: usize) -> Self {
        Self::from(kind).at(offset)
    }

    #[cold]
    #[inline(never)]
    pub fn unexpected_value(type_label: &'static str, got: &'static str) -> Self {
        Self::from(ErrorKind::UnexpectedValue { type_label, got })
    }

    #[cold]
    #[inline(never)]
    pub fn missing_member(type_label: &'static str, member: &str, present: Vec<String>) -> Self {
        Self::from(ErrorKind::MissingMember {
            type_label,
            member: member.to_string(),
            present,
        })
    }

    #[cold]
    #[inline(never)]
    pub fn unknown_type(module: &str, name: &str) -> Self {
        Self::from(ErrorKind::UnknownType {
            module: module.to_string(),
            name: name.to_string(),
        })
    }

    #[cold]
    #[inline(never)]
    pub fn missing_descriptor_key(type_name: &str, key: &'static str) -> Self {
        Self::from(ErrorKind::MissingDescriptorKey {
            type_name: type_name.to_string(),
            key,
        })
    }

    #[cold]
    #[inline(never)]
    pub fn invalid_default(type_label: &'static str, default: String) -> Self {
        Self::from(ErrorKind::InvalidDefault {
            type_label,
            default,
        })
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Error(Box::new(Inner::from(kind)))
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for Error {
    #[inline]
    fn from(e: serde_json::Error) -> Self {
        Self::from(ErrorKind::InvalidDescription(e))
    }
}

impl Debug for Error {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self)?;
        let mut backtrace = self.0.backtrace.clone();
        backtrace.resolve();
        writeln!(f, "{:?}", backtrace)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.0.location.is_empty() {
            write!(f, "{}: ", self.location())?;
        }
        write!(f, "{}", self.0.kind)?;
        if let Some(offset) = self.0.offset {
            write!(f, " (At offset: {})", offset)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn description(&self) -> &str {
        "compiling, encoding or decoding with basic rules failed"
    }
}

#[derive(Debug)]
pub(crate) struct Inner {
    pub(crate) kind: ErrorKind,
    pub(crate) offset: Option<usize>,
    pub(crate) location: Vec<String>,
    pub(crate) backtrace: Backtrace,
}

impl From<ErrorKind> for Inner {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            offset: None,
            location: Vec::new(),
            backtrace: Backtrace::new_unresolved(),
        }
    }
}

#[derive(Debug)]
pub enum ErrorKind {
    // decoding
    OutOfData {
        reading: &'static str,
    },
    LengthOutOfData {
        expected: usize,
        got: usize,
    },
    MissingContents {
        expected: usize,
        got: usize,
    },
    UnsupportedLengthSize(usize),
    ExpectedDefiniteLength,
    MissingMandatoryField {
        member: String,
    },
    UnexpectedTag {
        type_label: String,
        expected: Vec<String>,
        got: String,
    },
    NoEndOfContents,
    NestingTooDeep(usize),
    InvalidBooleanLength(usize),
    UnsupportedRealControl {
        form: &'static str,
        control: u8,
    },
    InvalidDecimalReal(String),
    IntegerTooLarge(usize),
    InvalidBitStringContents,
    InvalidObjectIdentifierContents,
    InvalidStringContents {
        encoding: &'static str,
    },
    UnknownEnumerationValue {
        expected: String,
        got: i128,
    },
    UnresolvedRecursion(String),
    // decoding and encoding
    BadAnyDefinedByChoice(String),
    InvalidTime {
        type_label: &'static str,
        text: String,
    },
    // encoding
    RealExponentOutOfRange(i64),
    UnknownEnumerationLabel {
        expected: String,
        got: String,
    },
    UnknownChoiceMember {
        expected: String,
        got: String,
    },
    MissingMember {
        type_label: &'static str,
        member: String,
        present: Vec<String>,
    },
    UnexpectedValue {
        type_label: &'static str,
        got: &'static str,
    },
    UnencodableCharacter {
        encoding: &'static str,
        character: char,
    },
    InvalidObjectIdentifier(String),
    InvalidBitString {
        bits: usize,
        bytes: usize,
    },
    // compiling
    UnknownModule(String),
    UnknownType {
        module: String,
        name: String,
    },
    MissingDescriptorKey {
        type_name: String,
        key: &'static str,
    },
    InvalidDefault {
        type_label: &'static str,
        default: String,
    },
    #[cfg(feature = "json")]
    InvalidDescription(serde_json::Error),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::OutOfData { reading } => {
                write!(f, "Ran out of data when reading {}", reading)
            }
            ErrorKind::LengthOutOfData { expected, got } => write!(
                f,
                "Expected {} length byte(s), but got {}.",
                expected, got
            ),
            ErrorKind::MissingContents { expected, got } => write!(
                f,
                "Expected at least {} contents byte(s), but got {}.",
                expected, got
            ),
            ErrorKind::UnsupportedLengthSize(length_bytes) => write!(
                f,
                "Length encoded in {} byte(s) exceeds the supported maximum of {}.",
                length_bytes,
                std::mem::size_of::<usize>()
            ),
            ErrorKind::ExpectedDefiniteLength => {
                write!(f, "Expected definite length, but got indefinite.")
            }
            ErrorKind::MissingMandatoryField { member } => {
                write!(f, "{} is missing and has no default value", member)
            }
            ErrorKind::UnexpectedTag {
                type_label,
                expected,
                got,
            } => {
                if expected.len() == 1 {
                    write!(
                        f,
                        "Expected {} with tag '{}', but got '{}'.",
                        type_label, expected[0], got
                    )
                } else {
                    write!(
                        f,
                        "Expected {} with tags {:?}, but got '{}'.",
                        type_label, expected, got
                    )
                }
            }
            ErrorKind::NoEndOfContents => write!(
                f,
                "Could not find end-of-contents tag for indefinite length field."
            ),
            ErrorKind::NestingTooDeep(limit) => {
                write!(f, "Elements are nested deeper than {} levels.", limit)
            }
            ErrorKind::InvalidBooleanLength(length) => write!(
                f,
                "Expected BOOLEAN contents length 1, but got {}.",
                length
            ),
            ErrorKind::UnsupportedRealControl { form, control } => write!(
                f,
                "Unsupported {} REAL control word 0x{:02x}.",
                form, control
            ),
            ErrorKind::InvalidDecimalReal(text) => {
                write!(f, "Invalid decimal REAL contents '{}'.", text)
            }
            ErrorKind::IntegerTooLarge(length) => write!(
                f,
                "INTEGER of {} bytes exceeds the supported maximum of 16 bytes.",
                length
            ),
            ErrorKind::InvalidBitStringContents => {
                write!(f, "Invalid BIT STRING unused bits octet or length.")
            }
            ErrorKind::InvalidObjectIdentifierContents => {
                write!(f, "Invalid OBJECT IDENTIFIER contents.")
            }
            ErrorKind::InvalidStringContents { encoding } => {
                write!(f, "String contents are not valid {}.", encoding)
            }
            ErrorKind::UnknownEnumerationValue { expected, got } => write!(
                f,
                "Expected enumeration value {}, but got {}.",
                expected, got
            ),
            ErrorKind::UnresolvedRecursion(name) => {
                write!(f, "Recursive type {} was never resolved.", name)
            }
            ErrorKind::BadAnyDefinedByChoice(choice) => {
                write!(f, "Bad AnyDefinedBy choice {}.", choice)
            }
            ErrorKind::InvalidTime { type_label, text } => {
                write!(f, "Invalid {} '{}'.", type_label, text)
            }
            ErrorKind::RealExponentOutOfRange(exponent) => {
                write!(f, "REAL exponent {} out of range.", exponent)
            }
            ErrorKind::UnknownEnumerationLabel { expected, got } => write!(
                f,
                "Expected enumeration value {}, but got '{}'.",
                expected, got
            ),
            ErrorKind::UnknownChoiceMember { expected, got } => {
                write!(f, "Expected choice {}, but got '{}'.", expected, got)
            }
            ErrorKind::MissingMember {
                type_label,
                member,
                present,
            } => write!(
                f,
                "{} member '{}' not found in {:?}.",
                type_label, member, present
            ),
            ErrorKind::UnexpectedValue { type_label, got } => {
                write!(f, "Expected a value of type {}, but got {}.", type_label, got)
            }
            ErrorKind::UnencodableCharacter {
                encoding,
                character,
            } => write!(
                f,
                "Character {:?} cannot be encoded as {}.",
                character, encoding
            ),
            ErrorKind::InvalidObjectIdentifier(text) => {
                write!(f, "Invalid OBJECT IDENTIFIER '{}'.", text)
            }
            ErrorKind::InvalidBitString { bits, bytes } => write!(
                f,
                "BIT STRING of {} bit(s) needs more than the {} byte(s) given.",
                bits, bytes
            ),
            ErrorKind::UnknownModule(name) => write!(f, "Module '{}' not found.", name),
            ErrorKind::UnknownType { module, name } => {
                write!(f, "Type '{}' not found in module '{}'.", name, module)
            }
            ErrorKind::MissingDescriptorKey { type_name, key } => write!(
                f,
                "Descriptor of {} is missing the '{}' entry.",
                type_name, key
            ),
            ErrorKind::InvalidDefault {
                type_label,
                default,
            } => write!(f, "Invalid default value {} for {}.", default, type_label),
            #[cfg(feature = "json")]
            ErrorKind::InvalidDescription(e) => {
                write!(f, "Invalid module description: {}", e)
            }
        }
    }
}
