pub use crate::compiled::{decode_full_length, CompiledModules, CompiledType};
#[cfg(feature = "json")]
pub use crate::compiler::compile_json_str;
pub use crate::compiler::{compile, Compiler};
pub use crate::protocol::basic::{Error, ErrorKind};
pub use crate::value::{BitString, Date, DateTime, Fields, TimeOfDay, Value};
pub use asn1ber_model::{
    Class, DefaultValue, EnumEntry, MemberEntry, ModuleDescription, Specification, Tag,
    TagDefault, TagDescriptor, TagKind, TypeDescriptor, TypeName,
};
