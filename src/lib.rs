#![deny(rustdoc::broken_intra_doc_links)]
#![warn(unused_extern_crates)]

#[macro_use]
extern crate serde_derive;

pub mod compiled;
pub mod compiler;
pub mod prelude;
pub mod protocol;
pub mod value;

pub use asn1ber_model as model;
