//! # M4lang: an m4 macro language interpreter.
//!
//! This crate implements the core of an m4-style macro processor: the
//! tokenizer, the commands map, user-macro substitution, and the virtual
//! machine whose main loop performs pushback-driven rescanning. The
//! built-in macros themselves live in the `m4lang-stdlib` crate and are
//! provided to the VM at initialization.

extern crate m4craft_stdext;

pub mod command;
pub mod error;
pub mod parse;
pub mod prelude;
pub mod token;
pub mod usermacro;
pub mod vm;
