//! Encoding rules. Only the basic family is implemented.

pub mod basic;
