//! Diversion built-ins (`divert`, `undivert`, `divnum`).

use m4lang::command;
use m4lang::error;
use m4lang::vm;
use m4lang::vm::Selection;

/// Get the `divert` built-in.
pub fn get_divert() -> command::BuiltIn {
    command::BuiltIn::new(divert_fn).with_bare(divert_bare_fn)
}

fn divert_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    let selection = match arguments.get(1) {
        &[digit] if digit.is_ascii_digit() => Selection::Buffer(digit - b'0'),
        b"-1" => Selection::Sink,
        _ => {
            return Err(error::Error::usage(
                "divert: diversion number must be 0 to 9 or -1",
            ))
        }
    };
    input.select_diversion(selection);
    Ok(())
}

// The bare form resets to the primary output.
fn divert_bare_fn(input: &mut vm::VM) -> error::Result<()> {
    input.select_diversion(Selection::Buffer(0));
    Ok(())
}

/// Get the `undivert` built-in.
pub fn get_undivert() -> command::BuiltIn {
    command::BuiltIn::new(undivert_fn).with_bare(undivert_bare_fn)
}

fn undivert_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    for k in 1..=command::MAX_ARGUMENTS {
        // Arguments that are not a single digit 1 through 9 are ignored.
        if let &[digit @ b'1'..=b'9'] = arguments.get(k) {
            input.undivert(digit - b'0')?;
        }
    }
    Ok(())
}

fn undivert_bare_fn(input: &mut vm::VM) -> error::Result<()> {
    if input.diversion_number() != 0 {
        return Err(error::Error::usage(
            "undivert: the bare form may only be used from diversion 0",
        ));
    }
    input.undivert_all()
}

/// Get the `divnum` built-in.
pub fn get_divnum() -> command::BuiltIn {
    command::BuiltIn::new(divnum_fn).with_bare(divnum_bare_fn)
}

fn divnum_fn(input: &mut vm::VM, _: &command::Arguments) -> error::Result<()> {
    divnum(input)
}

fn divnum_bare_fn(input: &mut vm::VM) -> error::Result<()> {
    divnum(input)
}

fn divnum(input: &mut vm::VM) -> error::Result<()> {
    let number = input.diversion_number();
    input.push_source(format!("{number}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use std::collections::HashMap;

    fn initial_built_ins() -> HashMap<&'static str, command::BuiltIn> {
        HashMap::from([
            ("divert", get_divert()),
            ("undivert", get_undivert()),
            ("divnum", get_divnum()),
        ])
    }

    test_suite![
        output_tests(
            (
                explicit_undivert_flushes_early,
                "divert(2)hello divert(0)world undivert(2)",
                "world hello "
            ),
            (
                diversions_flush_in_order_at_termination,
                "divert(2)two divert(1)one divert(0)zero ",
                "zero one two "
            ),
            (divnum_starts_at_zero, "divnum", "0"),
            (divnum_tracks_divert, "divert(3)divert(0)divert(7)divnum divert(0)undivert(7)", "7 "),
            (divnum_of_sink, "divert(-1)divnum divert(0)done", "done"),
            (bare_divert_resets_to_primary, "divert(5)five divert zero undivert(5)", " zero five "),
            (sink_discards, "divert(-1)gone divert(0)kept", "kept"),
            (
                undivert_appends_to_current_diversion,
                "divert(3)three divert(4)four undivert(3)divert(0)undivert(4)",
                "four three "
            ),
            (
                undivert_clears_the_source,
                "divert(2)x divert(0)undivert(2)undivert(2)",
                "x "
            ),
            (undivert_ignores_junk_arguments, "divert(2)x divert(0)undivert(a, 0, 22, 2)", "x "),
            (bare_undivert_flushes_everything, "divert(9)nine divert(1)one divert(0)undivert", "one nine "),
            (undivert_of_empty_diversion, "undivert(4)ok", "ok"),
        ),
        failure_tests(
            (divert_two_digits, "divert(12)"),
            (divert_negative_other_than_minus_one, "divert(-2)"),
            (divert_empty_argument, "divert()"),
            (divert_non_numeric, "divert(x)"),
            (bare_undivert_outside_primary, "divert(3)undivert"),
        ),
    ];
}
