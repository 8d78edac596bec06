//! Utilities for writing unit tests
//!
//! This module contains utilities (types, helper functions and a Rust macro)
//!     that make it easier to write unit tests for built-in macros.
//! It's based on the philosophy that high-quality extensive unit tests
//!     will be written if and only if writing them is easy.
//!
//! In general the main tool used in this module is the [test_suite] Rust
//!     macro, which generates a suite of unit tests for a set of built-ins.

use m4lang::command;
use m4lang::vm;
use m4lang::vm::VM;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Option passed to a test runner.
pub enum TestOption<'a> {
    /// The initial built-ins are the result of invoking the provided static
    /// function.
    ///
    /// Overrides previous `InitialBuiltIns` options.
    InitialBuiltIns(fn() -> HashMap<&'static str, command::BuiltIn>),

    /// The provided static function is invoked after the VM is created and
    /// before execution starts. This can be used to provide more custom VM
    /// initialization.
    ///
    /// Overrides previous `CustomVMInitialization` or
    /// `CustomVMInitializationDyn` options.
    CustomVMInitialization(fn(&mut VM)),

    /// The provided closure is invoked after the VM is created and before
    /// execution starts. This can be used to provide more custom VM
    /// initialization.
    ///
    /// Overrides previous `CustomVMInitialization` or
    /// `CustomVMInitializationDyn` options.
    CustomVMInitializationDyn(Box<dyn Fn(&mut VM) + 'a>),
}

pub struct ResolvedOptions<'a> {
    initial_built_ins: &'a dyn Fn() -> HashMap<&'static str, command::BuiltIn>,
    custom_vm_initialization: &'a dyn Fn(&mut VM),
}

impl<'a> ResolvedOptions<'a> {
    pub fn new(options: &'a [TestOption]) -> Self {
        let mut resolved = Self {
            initial_built_ins: &HashMap::new,
            custom_vm_initialization: &|_| {},
        };
        for option in options {
            match option {
                TestOption::InitialBuiltIns(f) => resolved.initial_built_ins = f,
                TestOption::CustomVMInitialization(f) => resolved.custom_vm_initialization = f,
                TestOption::CustomVMInitializationDyn(f) => resolved.custom_vm_initialization = f,
            }
        }
        resolved
    }
}

/// Everything a test run produced.
pub struct TestRun {
    pub result: m4lang::error::Result<()>,
    /// Bytes written to the program output, decoded lossily.
    pub output: String,
    /// Bytes written to the diagnostics writer, decoded lossily.
    pub diagnostics: String,
}

/// Execute source code in a fresh VM with the provided options, capturing
/// the program output and the diagnostics.
pub fn execute_source_code(source: &str, options: &[TestOption]) -> TestRun {
    let resolved = ResolvedOptions::new(options);
    let mut vm = VM::new((resolved.initial_built_ins)());
    let output: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let diagnostics: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    vm.terminal_out = output.clone();
    vm.terminal_err = diagnostics.clone();
    (resolved.custom_vm_initialization)(&mut vm);
    vm.push_source(source);
    let result = vm.run();
    let run = TestRun {
        result,
        output: String::from_utf8_lossy(&output.borrow()).into_owned(),
        diagnostics: String::from_utf8_lossy(&diagnostics.borrow()).into_owned(),
    };
    run
}

/// Run an output test.
///
/// The test passes if the source processes cleanly and the program output is
/// byte-for-byte the wanted string.
pub fn run_output_test(source: &str, want: &str, options: &[TestOption]) {
    let run = execute_source_code(source, options);
    if let Err(err) = &run.result {
        println!("processing failed: {err}");
        panic!("output test failed: processing returned an error");
    }
    if run.output != want {
        println!("Output is different:");
        println!("------[got]-------");
        println!("{}", run.output);
        println!("------[want]------");
        println!("{want}");
        println!("-----------------");
        panic!("output test failed");
    }
}

/// Run a failure test.
///
/// The test passes if processing the provided source fails.
pub fn run_failure_test(source: &str, options: &[TestOption]) {
    let run = execute_source_code(source, options);
    if run.result.is_ok() {
        println!("Processing succeeded with output:");
        println!("'{}'", run.output);
        panic!("failure test did not pass: processing succeeded");
    }
}

/// In-memory file system for use in unit tests.
///
/// This type mocks out the file system operations in the VM.
/// It provides an in-memory system to which "files" can be added before the
/// test runs. It is designed to help test built-ins that interact with the
/// file system.
#[derive(Default)]
pub struct InMemoryFileSystem {
    files: HashMap<std::path::PathBuf, Vec<u8>>,
}

impl InMemoryFileSystem {
    /// Add a file to the in-memory file system.
    pub fn add<C: Into<Vec<u8>>>(&mut self, path: &str, contents: C) {
        self.files.insert(path.into(), contents.into());
    }
}

impl vm::FileSystem for InMemoryFileSystem {
    fn read_bytes(&self, path: &std::path::Path) -> std::io::Result<Vec<u8>> {
        match self.files.get(path) {
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "not found",
            )),
            Some(contents) => Ok(contents.clone()),
        }
    }
}

/// Macro to generate a suite of unit tests
///
/// The general use of this macro looks like this:
/// ```
/// # use m4lang_stdlib::testing::*;
/// # use m4lang::command;
/// # use std::collections::HashMap;
/// # fn initial_built_ins() -> HashMap<&'static str, command::BuiltIn> {
/// #     HashMap::new()
/// # }
/// test_suite![
///     options(TestOption::InitialBuiltIns(initial_built_ins)),
///     output_tests(
///         (case_1, "input_1", "output_1"),
///         (case_2, "input_2", "output_2"),
///     ),
///     failure_tests(
///         (case_3, "input_3"),
///     ),
/// ];
/// ```
///
/// The arguments to the macro are:
///
/// - `options(option_1, ..., option_n)`: options to pass to the test runner,
///     of type [TestOption]. The options can be omitted, in which case they
///     default to `options(TestOption::InitialBuiltIns(initial_built_ins))`
///     where `initial_built_ins` is a static function in the current scope.
///
/// - `output_tests(cases...)`: each case is (case name, input, wanted
///     output) and is fed into the [run_output_test] test runner.
///
/// - `failure_tests(cases...)`: each case is (case name, input) and is fed
///     into the [run_failure_test] test runner.
#[macro_export]
macro_rules! test_suite {
    ( options $options: tt, output_tests ( $( ($name: ident, $input: expr, $want: expr $(,)? ) ),* $(,)? ) $(,)? ) => (
        $(
            #[test]
            fn $name() {
                let input = $input;
                let want = $want;
                let options = vec! $options;
                $crate::testing::run_output_test(&input, &want, &options);
            }
        )*
    );
    ( options $options: tt, failure_tests ( $( ($name: ident, $input: expr $(,)? ) ),* $(,)? ) $(,)? ) => (
        $(
            #[test]
            fn $name() {
                let input = $input;
                let options = vec! $options;
                $crate::testing::run_failure_test(&input, &options);
            }
        )*
    );
    ( options $options: tt, $( $test_kind: ident $test_cases: tt ),+ $(,)? ) => (
        $(
            test_suite![options $options, $test_kind $test_cases,];
        )+
    );
    ( $( $test_kind: ident $test_cases: tt ),+ $(,)? ) => (
        test_suite![options (TestOption::InitialBuiltIns(initial_built_ins)), $( $test_kind $test_cases, )+ ];
    );
}

pub use test_suite;
