#[macro_use]
extern crate strum_macros;
#[macro_use]
extern crate serde_derive;

mod model;

pub use model::*;
