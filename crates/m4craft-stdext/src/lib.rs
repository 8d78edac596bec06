//! The m4craft standard library extension (stdext)
//!
//! This crate contains data structures that are used in m4craft
//!     but that are not specific to the macro-processing domain.

pub mod collections;
