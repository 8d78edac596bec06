//! String built-ins (`len`, `index`, `substr`, `translit`).
//!
//! All of these operate on bytes, not characters, and push their result
//! back into the input for rescanning.

use m4lang::command;
use m4lang::error;
use m4lang::parse;
use m4lang::vm;

/// Get the `len` built-in.
pub fn get_len() -> command::BuiltIn {
    command::BuiltIn::new(len_fn)
}

fn len_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    let length = arguments.get(1).len();
    input.push_source(format!("{length}"));
    Ok(())
}

/// Get the `index` built-in.
pub fn get_index() -> command::BuiltIn {
    command::BuiltIn::new(index_fn)
}

fn index_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    let haystack = arguments.get(1);
    let needle = arguments.get(2);
    let position: i64 = if needle.is_empty() {
        // The empty needle occurs at offset 0 of every haystack.
        0
    } else {
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
            .map_or(-1, |position| position as i64)
    };
    input.push_source(format!("{position}"));
    Ok(())
}

/// Get the `substr` built-in.
pub fn get_substr() -> command::BuiltIn {
    command::BuiltIn::new(substr_fn)
}

fn substr_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    let string = arguments.get(1);
    if string.is_empty() {
        return Ok(());
    }
    let invalid = || error::Error::usage("substr: invalid start or length");
    let start = parse::number(arguments.get(2)).ok_or_else(invalid)?;
    let length = parse::number(arguments.get(3)).ok_or_else(invalid)?;
    if start >= string.len() {
        return Ok(());
    }
    let end = string.len().min(start.saturating_add(length));
    input.push_source(&string[start..end]);
    Ok(())
}

/// Get the `translit` built-in.
pub fn get_translit() -> command::BuiltIn {
    command::BuiltIn::new(translit_fn)
}

#[derive(Clone, Copy)]
enum Mapping {
    Pass,
    Delete,
    To(u8),
}

fn translit_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    let string = arguments.get(1);
    let from = arguments.get(2);
    let to = arguments.get(3);

    let mut map = [Mapping::Pass; 256];
    // While the two strings run in parallel, the first occurrence of a byte
    // in `from` wins.
    let mut i = 0;
    while i < from.len() && i < to.len() {
        let slot = &mut map[usize::from(from[i])];
        if matches!(slot, Mapping::Pass) {
            *slot = Mapping::To(to[i]);
        }
        i += 1;
    }
    // Bytes of `from` with no counterpart in `to` are deleted, overriding
    // any earlier mapping.
    while i < from.len() {
        map[usize::from(from[i])] = Mapping::Delete;
        i += 1;
    }

    let mut result = Vec::with_capacity(string.len());
    for &byte in string {
        match map[usize::from(byte)] {
            Mapping::Pass => result.push(byte),
            Mapping::Delete => {}
            Mapping::To(mapped) => result.push(mapped),
        }
    }
    input.push_source(result);
    Ok(())
}
