//! Module that re-exports the types needed when implementing built-in macros.
//!
//! This is useful for getting everything in scope in a Rust module:
//! ```
//! use m4lang::prelude as m4l;
//! ```

pub use crate::error::Result;
