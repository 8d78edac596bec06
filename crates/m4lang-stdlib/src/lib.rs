//! The m4lang standard library of built-in macros.
//!
//! Each module implements one family of built-ins. The full catalogue is
//! assembled by [built_in_macros], which is what the command-line driver
//! passes to the VM.

use m4lang::command;
use m4lang::error;
use m4lang::vm;
use std::collections::HashMap;

pub mod conditional;
pub mod def;
pub mod diversion;
pub mod io;
pub mod math;
pub mod quote;
#[cfg(feature = "shell")]
pub mod sh;
pub mod string;
pub mod testing;

/// Return the full set of built-in macros, keyed by name.
pub fn built_in_macros() -> HashMap<&'static str, command::BuiltIn> {
    #[allow(unused_mut)]
    let mut m = HashMap::from([
        ("define", def::get_define()),
        ("undefine", def::get_undefine()),
        ("dumpdef", def::get_dumpdef()),
        ("htdist", def::get_htdist()),
        ("ifdef", conditional::get_ifdef()),
        ("ifelse", conditional::get_ifelse()),
        ("changequote", quote::get_changequote()),
        ("divert", diversion::get_divert()),
        ("undivert", diversion::get_undivert()),
        ("divnum", diversion::get_divnum()),
        ("len", string::get_len()),
        ("index", string::get_index()),
        ("substr", string::get_substr()),
        ("translit", string::get_translit()),
        ("incr", math::get_incr()),
        ("add", math::get_add()),
        ("mult", math::get_mult()),
        ("sub", math::get_sub()),
        ("div", math::get_div()),
        ("mod", math::get_mod()),
        ("include", io::get_include()),
        ("dnl", io::get_dnl()),
        ("errprint", io::get_errprint()),
        ("dirsep", io::get_dirsep()),
    ]);
    #[cfg(feature = "shell")]
    {
        m.insert("esyscmd", sh::get_esyscmd());
        m.insert("maketemp", sh::get_maketemp());
    }
    m
}

/// Write bytes to the VM's diagnostics writer.
pub(crate) fn write_diagnostic(vm: &vm::VM, bytes: &[u8]) -> error::Result<()> {
    use std::io::Write;
    let terminal_err = vm.terminal_err.clone();
    let mut writer = terminal_err.borrow_mut();
    writer
        .write_all(bytes)
        .and_then(|_| writer.flush())
        .map_err(|err| error::Error::io("failed to write diagnostics", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn initial_built_ins() -> HashMap<&'static str, command::BuiltIn> {
        built_in_macros()
    }

    // End-to-end cases exercising the whole catalogue together.
    test_suite![
        output_tests(
            (
                quoting_hides_macro_names_from_expansion,
                "define(cool, wow)`cool' cool",
                "cool wow"
            ),
            (
                string_built_ins_compose,
                "substr(elephant, 2, 4)translit(bananas, abcs, xyz)",
                "ephayxnxnx"
            ),
            (nested_arithmetic, "add(mult(3, 4), incr(7))", "20"),
            (
                definitions_rescans_transitively,
                "define(a, b)define(b, c)a",
                "c"
            ),
            (
                arguments_expand_during_collection,
                "define(double, $1$1)define(x, ab)double(x)",
                "abab"
            ),
            (
                diverted_macro_output_is_replayed,
                "define(cool, wow)divert(2)cool divert(0)start undivert(2)end",
                "start wow end"
            ),
            (
                quoted_definition_defers_expansion,
                "changequote([,])define(greet, [hello])greet",
                "hello"
            ),
        ),
    ];

    #[test]
    fn every_built_in_is_registered() {
        let m = built_in_macros();
        for name in [
            "define",
            "undefine",
            "dumpdef",
            "htdist",
            "ifdef",
            "ifelse",
            "changequote",
            "divert",
            "undivert",
            "divnum",
            "len",
            "index",
            "substr",
            "translit",
            "incr",
            "add",
            "mult",
            "sub",
            "div",
            "mod",
            "include",
            "dnl",
            "errprint",
            "dirsep",
        ] {
            assert!(m.contains_key(name), "missing built-in: {name}");
        }
        #[cfg(feature = "shell")]
        {
            assert!(m.contains_key("esyscmd"));
            assert!(m.contains_key("maketemp"));
        }
    }
}
