//! Arithmetic built-ins (`incr`, `add`, `mult`, `sub`, `div`, `mod`).
//!
//! Numbers are non-negative machine words. Every operation checks for
//! overflow (and underflow, for `sub`) before it happens; there is no
//! wrapping arithmetic in this language. The folding built-ins skip empty
//! arguments, so `mult( , 5, , 3)` multiplies 5 by 3.

use m4lang::command;
use m4lang::error;
use m4lang::parse;
use m4lang::vm;

/// Get the `incr` built-in.
pub fn get_incr() -> command::BuiltIn {
    command::BuiltIn::new(incr_fn)
}

fn incr_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    let n = parse::number(arguments.get(1))
        .ok_or_else(|| error::Error::usage("incr: invalid number"))?;
    let n = n
        .checked_add(1)
        .ok_or_else(|| error::Error::usage("incr: integer overflow"))?;
    input.push_source(format!("{n}"));
    Ok(())
}

/// Get the `add` built-in.
pub fn get_add() -> command::BuiltIn {
    command::BuiltIn::new(add_fn)
}

/// Get the `mult` built-in.
pub fn get_mult() -> command::BuiltIn {
    command::BuiltIn::new(mult_fn)
}

/// Get the `sub` built-in.
pub fn get_sub() -> command::BuiltIn {
    command::BuiltIn::new(sub_fn)
}

/// Get the `div` built-in.
pub fn get_div() -> command::BuiltIn {
    command::BuiltIn::new(div_fn)
}

/// Get the `mod` built-in.
pub fn get_mod() -> command::BuiltIn {
    command::BuiltIn::new(mod_fn)
}

fn add_op(lhs: usize, rhs: usize) -> error::Result<usize> {
    lhs.checked_add(rhs)
        .ok_or_else(|| error::Error::usage("add: integer overflow"))
}

fn mult_op(lhs: usize, rhs: usize) -> error::Result<usize> {
    lhs.checked_mul(rhs)
        .ok_or_else(|| error::Error::usage("mult: integer overflow"))
}

fn sub_op(lhs: usize, rhs: usize) -> error::Result<usize> {
    lhs.checked_sub(rhs)
        .ok_or_else(|| error::Error::usage("sub: integer underflow"))
}

fn div_op(lhs: usize, rhs: usize) -> error::Result<usize> {
    if rhs == 0 {
        return Err(error::Error::usage("div: divide by zero"));
    }
    Ok(lhs / rhs)
}

fn mod_op(lhs: usize, rhs: usize) -> error::Result<usize> {
    if rhs == 0 {
        return Err(error::Error::usage("mod: modulo by zero"));
    }
    Ok(lhs % rhs)
}

/// Fold the non-empty arguments with an identity element.
macro_rules! create_fold_primitive {
    ($prim_fn: ident, $name: literal, $identity: expr, $fold_op: ident) => {
        fn $prim_fn(
            input: &mut vm::VM,
            arguments: &command::Arguments,
        ) -> error::Result<()> {
            let mut accumulator: usize = $identity;
            for k in 1..=command::MAX_ARGUMENTS {
                let argument = arguments.get(k);
                if argument.is_empty() {
                    continue;
                }
                let n = parse::number(argument)
                    .ok_or_else(|| error::Error::usage(concat!($name, ": invalid number")))?;
                accumulator = $fold_op(accumulator, n)?;
            }
            input.push_source(format!("{accumulator}"));
            Ok(())
        }
    };
}

/// Fold the non-empty arguments into the first argument, which is required.
macro_rules! create_seeded_fold_primitive {
    ($prim_fn: ident, $name: literal, $fold_op: ident) => {
        fn $prim_fn(
            input: &mut vm::VM,
            arguments: &command::Arguments,
        ) -> error::Result<()> {
            let first = arguments.get(1);
            if first.is_empty() {
                return Err(error::Error::usage(concat!($name, ": argument 1 must be used")));
            }
            let mut accumulator = parse::number(first)
                .ok_or_else(|| error::Error::usage(concat!($name, ": invalid number")))?;
            for k in 2..=command::MAX_ARGUMENTS {
                let argument = arguments.get(k);
                if argument.is_empty() {
                    continue;
                }
                let n = parse::number(argument)
                    .ok_or_else(|| error::Error::usage(concat!($name, ": invalid number")))?;
                accumulator = $fold_op(accumulator, n)?;
            }
            input.push_source(format!("{accumulator}"));
            Ok(())
        }
    };
}

create_fold_primitive![add_fn, "add", 0, add_op];
create_fold_primitive![mult_fn, "mult", 1, mult_op];
create_seeded_fold_primitive![sub_fn, "sub", sub_op];
create_seeded_fold_primitive![div_fn, "div", div_op];
create_seeded_fold_primitive![mod_fn, "mod", mod_op];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use std::collections::HashMap;

    fn initial_built_ins() -> HashMap<&'static str, command::BuiltIn> {
        HashMap::from([
            ("incr", get_incr()),
            ("add", get_add()),
            ("mult", get_mult()),
            ("sub", get_sub()),
            ("div", get_div()),
            ("mod", get_mod()),
        ])
    }

    test_suite![
        output_tests(
            (incr_base_case, "incr(76)", "77"),
            (incr_zero, "incr(0)", "1"),
            (incr_result_can_be_incremented_again, "incr(incr(5))", "7"),
            (add_base_case, "add(8, 2, 4)", "14"),
            (add_no_arguments_yields_identity, "add()", "0"),
            (add_skips_empty_arguments, "add( , 5, , 3)", "8"),
            (mult_base_case, "mult(5, 4)", "20"),
            (mult_skips_empty_arguments, "mult( , 5, , 3)", "15"),
            (mult_no_arguments_yields_identity, "mult()", "1"),
            (mult_by_zero, "mult(5, 0)", "0"),
            (sub_base_case, "sub(80, 20, 5)", "55"),
            (sub_to_zero, "sub(5, 5)", "0"),
            (div_base_case, "div(5, 2)", "2"),
            (div_chained, "div(100, 5, 2)", "10"),
            (mod_base_case, "mod(5, 2)", "1"),
            (mod_exact, "mod(10, 5)", "0"),
        ),
        failure_tests(
            (incr_non_numeric, "incr(goat)"),
            (incr_negative, "incr(-1)"),
            (incr_empty, "incr()"),
            (add_non_numeric, "add(1, x)"),
            (sub_underflow, "sub(3, 5)"),
            (sub_requires_first_argument, "sub( , 5)"),
            (div_by_zero, "div(5, 0)"),
            (div_requires_first_argument, "div( , 5)"),
            (mod_by_zero, "mod(5, 0)"),
            (mod_requires_first_argument, "mod( , 5)"),
        ),
    ];

    #[test]
    fn incr_is_total_below_the_maximum_word() {
        let options = vec![TestOption::InitialBuiltIns(initial_built_ins)];
        let input = format!("incr({})", usize::MAX - 1);
        let want = format!("{}", usize::MAX);
        run_output_test(&input, &want, &options);
    }

    #[test]
    fn incr_overflows_at_the_maximum_word() {
        let options = vec![TestOption::InitialBuiltIns(initial_built_ins)];
        let input = format!("incr({})", usize::MAX);
        run_failure_test(&input, &options);
    }

    #[test]
    fn add_overflow_is_fatal() {
        let options = vec![TestOption::InitialBuiltIns(initial_built_ins)];
        let input = format!("add({}, 1)", usize::MAX);
        run_failure_test(&input, &options);
    }

    #[test]
    fn mult_overflow_is_fatal() {
        let options = vec![TestOption::InitialBuiltIns(initial_built_ins)];
        let input = format!("mult({}, 2)", usize::MAX);
        run_failure_test(&input, &options);
    }
}
