use clap::Parser;
use m4lang::vm;
use std::path::PathBuf;

/// An m4-style macro processor.
///
/// Input is read, macro invocations are expanded with their results fed back
/// into the input for rescanning, and everything else passes through to
/// standard output. Diagnostics go to standard error.
#[derive(Parser)]
#[clap(version)]
struct Cli {
    /// Input files, processed in the order given.
    ///
    /// With no files, input is read from standard input.
    files: Vec<PathBuf>,
}

fn main() {
    let args: Cli = Cli::parse();
    let mut vm = vm::VM::new(m4lang_stdlib::built_in_macros());
    if args.files.is_empty() {
        vm.read_terminal_in = true;
    } else {
        // Input is a stack, so the files are pushed in reverse: the first
        // file on the command line is read first.
        for path in args.files.iter().rev() {
            let contents = vm.file_system.read_bytes(path);
            match contents {
                Ok(contents) => vm.push_source(contents),
                Err(err) => {
                    eprintln!("{}", m4lang::error::Error::io(
                        format!("failed to read input file {}", path.display()),
                        err,
                    ));
                    std::process::exit(1);
                }
            }
        }
    }
    if let Err(err) = vm.run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
