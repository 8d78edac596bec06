//! Conditional built-ins (`ifdef` and `ifelse`).
//!
//! Both conditionals push the chosen branch back into the input, so the
//! branch is rescanned and macro calls inside it fire. `ifelse` is the
//! two-branch form: `ifelse(a, b, yes, no)` compares `a` and `b` byte for
//! byte. The traditional chained form is not part of this dialect.

use m4lang::command;
use m4lang::error;
use m4lang::token;
use m4lang::vm;

/// Get the `ifdef` built-in.
pub fn get_ifdef() -> command::BuiltIn {
    command::BuiltIn::new(ifdef_fn)
}

fn ifdef_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    let name = arguments.get(1);
    let defined = name.first().copied().is_some_and(token::is_name_start)
        && input.commands_map().get(name).is_some();
    let branch = if defined {
        arguments.get(2)
    } else {
        arguments.get(3)
    };
    input.push_source(branch);
    Ok(())
}

/// Get the `ifelse` built-in.
pub fn get_ifelse() -> command::BuiltIn {
    command::BuiltIn::new(ifelse_fn)
}

fn ifelse_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    let branch = if arguments.get(1) == arguments.get(2) {
        arguments.get(3)
    } else {
        arguments.get(4)
    };
    input.push_source(branch);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use std::collections::HashMap;

    fn initial_built_ins() -> HashMap<&'static str, command::BuiltIn> {
        HashMap::from([
            ("ifdef", get_ifdef()),
            ("ifelse", get_ifelse()),
            ("define", crate::def::get_define()),
            ("undefine", crate::def::get_undefine()),
            ("changequote", crate::quote::get_changequote()),
        ])
    }

    test_suite![
        output_tests(
            (ifelse_equal, "ifelse(a, a, yes, no)", "yes"),
            (ifelse_not_equal, "ifelse(a, b, yes, no)", "no"),
            (ifelse_both, "ifelse(a, a, yes, no)ifelse(a, b, yes, no)", "yesno"),
            (ifelse_empty_arguments_are_equal, "ifelse(, , yes, no)", "yes"),
            (ifelse_branch_is_rescanned, "define(x, wow)ifelse(a, a, x, y)", "wow"),
            (
                ifdef_built_in_is_defined,
                "changequote([,])ifdef([define], T, F)",
                "T"
            ),
            (
                ifdef_round_trip,
                "changequote([,])define(y,5)ifdef([y],T,F)undefine([y])ifdef([y],T,F)",
                "TF"
            ),
            (ifdef_missing_name, "changequote([,])ifdef([nothing], T, F)", "F"),
            (ifdef_branch_is_rescanned, "changequote([,])define(y, wow)ifdef([y], y, n)", "wow"),
            (ifdef_empty_name, "ifdef(, T, F)", "F"),
        ),
    ];
}
