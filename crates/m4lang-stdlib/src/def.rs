//! Built-ins for creating, removing and inspecting macro definitions
//! (`define`, `undefine`, `dumpdef`, `htdist`).

use crate::write_diagnostic;
use m4lang::command;
use m4lang::error;
use m4lang::token;
use m4lang::usermacro;
use m4lang::vm;

/// Get the `define` built-in.
pub fn get_define() -> command::BuiltIn {
    command::BuiltIn::new(define_fn)
}

fn define_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    input.commands_map_mut().insert_macro(
        arguments.get(1),
        usermacro::Macro::new(arguments.get(2)),
    );
    Ok(())
}

/// Get the `undefine` built-in.
pub fn get_undefine() -> command::BuiltIn {
    command::BuiltIn::new(undefine_fn)
}

fn undefine_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    // Removing a missing name is not an error.
    input.commands_map_mut().remove(arguments.get(1));
    Ok(())
}

/// Get the `dumpdef` built-in.
pub fn get_dumpdef() -> command::BuiltIn {
    command::BuiltIn::new(dumpdef_fn)
}

fn dumpdef_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    for k in 1..=command::MAX_ARGUMENTS {
        let name = arguments.get(k);
        if name.is_empty() {
            continue;
        }
        let looks_like_name = token::is_name_start(name[0]);
        let command = if looks_like_name {
            input.commands_map().get(name)
        } else {
            None
        };
        let mut line = name.to_vec();
        line.extend_from_slice(b": ");
        match command {
            Some(command::Command::BuiltIn(_)) => line.extend_from_slice(b"built-in"),
            Some(command::Command::Macro(user_macro)) => {
                line.extend_from_slice(user_macro.replacement())
            }
            None => line.extend_from_slice(b"undefined"),
        }
        line.push(b'\n');
        write_diagnostic(input, &line)?;
    }
    Ok(())
}

/// Get the `htdist` built-in.
pub fn get_htdist() -> command::BuiltIn {
    command::BuiltIn::new(htdist_fn).with_bare(htdist_bare_fn)
}

fn htdist_fn(input: &mut vm::VM, _: &command::Arguments) -> error::Result<()> {
    htdist(input)
}

fn htdist_bare_fn(input: &mut vm::VM) -> error::Result<()> {
    htdist(input)
}

/// Write the bucket-length frequency distribution of the commands map to the
/// diagnostics writer. Chain lengths of 100 or more are reported together.
fn htdist(input: &mut vm::VM) -> error::Result<()> {
    let mut frequency = [0_usize; 101];
    for length in input.commands_map().bucket_lengths() {
        frequency[length.min(100)] += 1;
    }
    let mut report = String::from("entries_per_bucket number_of_buckets\n");
    for (length, count) in frequency.iter().enumerate().take(100) {
        if *count > 0 {
            report.push_str(&format!("{length} {count}\n"));
        }
    }
    if frequency[100] > 0 {
        report.push_str(&format!(">=100 {}\n", frequency[100]));
    }
    write_diagnostic(input, report.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use std::collections::HashMap;

    fn initial_built_ins() -> HashMap<&'static str, command::BuiltIn> {
        HashMap::from([
            ("define", get_define()),
            ("undefine", get_undefine()),
            ("dumpdef", get_dumpdef()),
            ("htdist", get_htdist()),
            ("len", crate::string::get_len()),
        ])
    }

    test_suite![
        output_tests(
            (define_and_call, "define(cool,$1 and $2)cool(goat, mice)", "goat and mice"),
            (define_and_call_bare, "define(cool, wow)cool", "wow"),
            (define_empty_body, "define(x)x b", " b"),
            (define_replaces_definition, "define(x, 1)define(x, 2)x", "2"),
            (define_shadows_built_in, "define(len, short)len(abc)", "short"),
            (bare_define_is_literal_text, "define and more", "define and more"),
            (undefine_removes_name, "define(x, 1)undefine(x)x", "x"),
            (undefine_missing_name_is_benign, "undefine(nothing)ok", "ok"),
            (undefine_built_in, "undefine(len)len(abc)", "len(abc)"),
            (redefine_after_undefine, "define(x, 1)undefine(x)define(x, 2)x", "2"),
        ),
    ];

    #[test]
    fn dumpdef_reports_definitions() {
        let options = vec![TestOption::InitialBuiltIns(initial_built_ins)];
        let run = execute_source_code("define(cool, wow)dumpdef(cool, len, missing)", &options);
        run.result.unwrap();
        assert_eq!(run.diagnostics, "cool: wow\nlen: built-in\nmissing: undefined\n");
    }

    #[test]
    fn dumpdef_skips_empty_names() {
        let options = vec![TestOption::InitialBuiltIns(initial_built_ins)];
        let run = execute_source_code("dumpdef(, len, )", &options);
        run.result.unwrap();
        assert_eq!(run.diagnostics, "len: built-in\n");
    }

    #[test]
    fn htdist_reports_distribution() {
        let options = vec![TestOption::InitialBuiltIns(initial_built_ins)];
        let run = execute_source_code("htdist", &options);
        run.result.unwrap();
        let mut lines = run.diagnostics.lines();
        assert_eq!(lines.next(), Some("entries_per_bucket number_of_buckets"));
        // Five built-ins are installed, so the report accounts for 16384
        // buckets, almost all of them empty.
        let empty = lines.next().unwrap();
        assert!(empty.starts_with("0 "));
    }
}
