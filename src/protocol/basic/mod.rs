//! This module contains the codec of the basic encoding rules, ITU-T X.690 | ISO/IEC 8825-1,
//! together with the compiled type tree it operates on.

pub mod err;
pub mod node;
pub mod octets;
pub mod structure;
pub mod time;

pub use err::{Error, ErrorKind};
pub use node::{Decoded, Member, Registry, TypeNode};
