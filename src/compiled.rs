use crate::protocol::basic::err::{Error, ErrorKind};
use crate::protocol::basic::node::{found_tag, Decoded, Registry, TypeNode};
use crate::protocol::basic::octets::{decode_length, read_tag, skip_element};
use crate::value::Value;
use log::trace;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The compiled types of all modules, by module and type name
#[derive(Debug, Default)]
pub struct CompiledModules {
    modules: BTreeMap<String, BTreeMap<String, CompiledType>>,
}

impl CompiledModules {
    pub(crate) fn new(modules: BTreeMap<String, BTreeMap<String, CompiledType>>) -> Self {
        Self { modules }
    }

    pub fn get(&self, module: &str, type_name: &str) -> Option<&CompiledType> {
        self.modules.get(module)?.get(type_name)
    }

    /// The type with the given name in the first module that defines one
    pub fn type_by_name(&self, type_name: &str) -> Option<&CompiledType> {
        self.modules
            .values()
            .find_map(|module| module.get(type_name))
    }

    pub fn module(&self, module: &str) -> Option<&BTreeMap<String, CompiledType>> {
        self.modules.get(module)
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }
}

/// A named type ready to encode and decode values
#[derive(Debug, Clone)]
pub struct CompiledType {
    module: String,
    name: String,
    node: TypeNode,
    registry: Arc<Registry>,
}

impl CompiledType {
    pub(crate) fn new(
        module: String,
        name: String,
        node: TypeNode,
        registry: Arc<Registry>,
    ) -> Self {
        Self {
            module,
            name,
            node,
            registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn node(&self) -> &TypeNode {
        &self.node
    }

    pub fn type_label(&self) -> &'static str {
        self.node.type_label()
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.node
            .encode(&self.registry, value, &mut out, None)
            .map_err(|e| e.add_location(&self.name))?;
        trace!("Encoded {} into {} byte(s)", self.name, out.len());
        Ok(out)
    }

    /// Decodes a value from the start of `data`, trailing bytes are ignored
    pub fn decode(&self, data: &[u8]) -> Result<Value, Error> {
        self.decode_with_length(data).map(|(value, _)| value)
    }

    /// Decodes a value from the start of `data` and returns it together with the number of bytes
    /// its encoding occupies
    pub fn decode_with_length(&self, data: &[u8]) -> Result<(Value, usize), Error> {
        if data.is_empty() {
            return Err(Error::out_of_data("tag", 0).add_location(&self.name));
        }
        match self.node.decode(&self.registry, data, 0, None) {
            Ok(Decoded::Matched(value, end)) => {
                trace!("Decoded {} from {} byte(s)", self.name, end);
                Ok((value, end))
            }
            Ok(Decoded::TagMismatch) => Err(Error::unexpected_tag(
                self.node.type_label(),
                self.node.expected_tags(&self.registry),
                found_tag(data, 0),
                0,
            )
            .add_location(&self.name)),
            Err(e) => Err(e.add_location(&self.name)),
        }
    }
}

/// The number of bytes the encoding at the start of `data` occupies, or `None` if `data` is too
/// short to tell. If the header is complete, the full length is returned even when the contents
/// are not.
///
/// ```rust
/// use asn1ber::compiled::decode_full_length;
/// assert_eq!(Some(4), decode_full_length(&[0x04, 0x02, 0xab]));
/// assert_eq!(Some(4), decode_full_length(&[0x30, 0x80, 0x00, 0x00]));
/// assert_eq!(None, decode_full_length(&[0x30, 0x82, 0x01]));
/// assert_eq!(None, decode_full_length(&[]));
/// ```
pub fn decode_full_length(data: &[u8]) -> Option<usize> {
    let (_, offset) = read_tag(data, 0).ok()?;
    match decode_length(data, offset, false) {
        Ok((Some(length), contents)) => Some(contents + length),
        Ok((None, _)) => skip_element(data, 0).ok(),
        Err(e) => match e.kind() {
            ErrorKind::MissingContents { expected, .. } => {
                e.offset().map(|offset| offset + expected)
            }
            _ => None,
        },
    }
}
