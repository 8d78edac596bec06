//! The m4lang commands API
//!
//! A *command* is anything a name in the input can resolve to:
//!     a built-in macro implemented in the engine,
//!     or a user-defined macro created with `define`.
//! Both live in the same [Map], so a user definition can shadow a built-in
//!     and `undefine` can remove either.
//!
//! ## Built-in dispatch
//!
//! Built-ins are dispatched through function pointers stored in the map
//! entry, never by comparing names in the main loop. Each built-in has a
//! *call* function, invoked when the name is followed by a parenthesized
//! argument list, and optionally a *bare call* function, invoked when it is
//! not. A built-in without a bare call (for example `define`) passes through
//! as literal text when invoked without arguments, because there is nothing
//! sensible for it to do.

use crate::usermacro;
use crate::vm;
use std::rc;

pub(crate) mod map;

pub use map::Map;

/// The maximum number of arguments a macro call may collect.
pub const MAX_ARGUMENTS: usize = 9;

/// The Rust type of built-in macro functions.
pub type CallFn = fn(input: &mut vm::VM, arguments: &Arguments) -> crate::error::Result<()>;

/// The Rust type of built-in macro functions for the bare (no argument list)
/// form.
pub type BareCallFn = fn(input: &mut vm::VM) -> crate::error::Result<()>;

/// An m4lang command.
pub enum Command {
    /// A built-in macro that is implemented in the engine.
    ///
    /// Examples: `define`, `divert`.
    BuiltIn(BuiltIn),

    /// A user-defined macro.
    ///
    /// Examples: `cool` after `define(cool, $1 and $2)`.
    Macro(rc::Rc<usermacro::Macro>),
}

// We implement Clone manually so that cloning a user macro is an Rc bump
// rather than a copy of the replacement text.
impl Clone for Command {
    fn clone(&self) -> Self {
        match self {
            Command::BuiltIn(built_in) => Command::BuiltIn(*built_in),
            Command::Macro(user_macro) => Command::Macro(user_macro.clone()),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::BuiltIn(_) => write![f, "a built-in macro"],
            Command::Macro(_) => write![f, "a user-defined macro"],
        }
    }
}

/// A built-in macro. Built-ins are provided at VM initialization.
#[derive(Clone, Copy)]
pub struct BuiltIn {
    call: CallFn,
    bare_call: Option<BareCallFn>,
}

impl BuiltIn {
    /// Create a new built-in macro.
    pub fn new(call: CallFn) -> BuiltIn {
        BuiltIn {
            call,
            bare_call: None,
        }
    }

    /// Set the bare form of this built-in macro.
    pub fn with_bare(mut self, bare_call: BareCallFn) -> BuiltIn {
        self.bare_call = Some(bare_call);
        self
    }

    pub fn call(&self) -> CallFn {
        self.call
    }

    pub fn bare_call(&self) -> Option<BareCallFn> {
        self.bare_call
    }
}

/// The arguments collected by a macro call.
///
/// Arguments are numbered 1 through [MAX_ARGUMENTS]. An argument that was
/// never collected reads as the empty byte string, so built-ins do not need
/// to distinguish `foo(a)` from `foo(a,)` beyond the emptiness of the
/// argument itself.
pub struct Arguments {
    collected: Vec<Vec<u8>>,
}

impl Arguments {
    /// Create the argument set for a new call: a single empty argument.
    pub(crate) fn new() -> Arguments {
        Arguments {
            collected: vec![Vec::new()],
        }
    }

    /// Get argument `n`, where `n` is 1-based.
    ///
    /// Arguments that were not collected read as empty.
    pub fn get(&self, n: usize) -> &[u8] {
        match n.checked_sub(1).and_then(|i| self.collected.get(i)) {
            None => &[],
            Some(buffer) => buffer,
        }
    }

    /// Return the number of collected arguments, including empty ones.
    pub fn count(&self) -> usize {
        self.collected.len()
    }

    /// Start collecting the next argument.
    ///
    /// Returns false if [MAX_ARGUMENTS] arguments have already been
    /// collected.
    pub(crate) fn begin_next(&mut self) -> bool {
        if self.collected.len() == MAX_ARGUMENTS {
            return false;
        }
        self.collected.push(Vec::new());
        true
    }

    /// Return the buffer of the argument currently being collected.
    pub(crate) fn active_mut(&mut self) -> &mut Vec<u8> {
        self.collected.last_mut().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_arguments_read_as_empty() {
        let arguments = Arguments::new();
        assert_eq!(arguments.count(), 1);
        assert_eq!(arguments.get(1), b"");
        assert_eq!(arguments.get(2), b"");
        assert_eq!(arguments.get(9), b"");
        assert_eq!(arguments.get(0), b"");
    }

    #[test]
    fn arguments_are_one_based() {
        let mut arguments = Arguments::new();
        arguments.active_mut().extend_from_slice(b"first");
        assert!(arguments.begin_next());
        arguments.active_mut().extend_from_slice(b"second");
        assert_eq!(arguments.get(1), b"first");
        assert_eq!(arguments.get(2), b"second");
        assert_eq!(arguments.count(), 2);
    }

    #[test]
    fn at_most_nine_arguments() {
        let mut arguments = Arguments::new();
        for _ in 0..MAX_ARGUMENTS - 1 {
            assert!(arguments.begin_next());
        }
        assert!(!arguments.begin_next());
        assert_eq!(arguments.count(), MAX_ARGUMENTS);
    }
}
