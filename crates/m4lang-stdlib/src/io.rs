//! Input and output built-ins (`include`, `dnl`, `errprint`, `dirsep`).

use crate::write_diagnostic;
use m4lang::command;
use m4lang::error;
use m4lang::vm;

/// Get the `include` built-in.
pub fn get_include() -> command::BuiltIn {
    command::BuiltIn::new(include_fn)
}

fn include_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    let path = String::from_utf8_lossy(arguments.get(1)).into_owned();
    let contents = input
        .file_system
        .read_bytes(std::path::Path::new(&path))
        .map_err(|err| error::Error::io(format!("include: failed to include file: {path}"), err))?;
    // The file contents are read next, before anything already buffered, so
    // macro calls inside the file fire in place.
    input.push_source(contents);
    Ok(())
}

/// Get the `dnl` built-in.
pub fn get_dnl() -> command::BuiltIn {
    command::BuiltIn::new(dnl_fn).with_bare(dnl_bare_fn)
}

fn dnl_fn(input: &mut vm::VM, _: &command::Arguments) -> error::Result<()> {
    discard_to_newline(input)
}

fn dnl_bare_fn(input: &mut vm::VM) -> error::Result<()> {
    discard_to_newline(input)
}

/// Discard input up to and including the next newline token. Reaching the
/// end of input first is not an error.
fn discard_to_newline(input: &mut vm::VM) -> error::Result<()> {
    while let Some(token) = input.next_token()? {
        if token.is_char(b'\n') {
            break;
        }
    }
    Ok(())
}

/// Get the `errprint` built-in.
pub fn get_errprint() -> command::BuiltIn {
    command::BuiltIn::new(errprint_fn)
}

fn errprint_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    for k in 1..=command::MAX_ARGUMENTS {
        let argument = arguments.get(k);
        if argument.is_empty() {
            continue;
        }
        let mut line = argument.to_vec();
        line.push(b'\n');
        write_diagnostic(input, &line)?;
    }
    Ok(())
}

/// Get the `dirsep` built-in.
pub fn get_dirsep() -> command::BuiltIn {
    command::BuiltIn::new(dirsep_fn).with_bare(dirsep_bare_fn)
}

fn dirsep_fn(input: &mut vm::VM, _: &command::Arguments) -> error::Result<()> {
    dirsep(input)
}

fn dirsep_bare_fn(input: &mut vm::VM) -> error::Result<()> {
    dirsep(input)
}

fn dirsep(input: &mut vm::VM) -> error::Result<()> {
    input.push_source(std::path::MAIN_SEPARATOR_STR);
    Ok(())
}
