//! Shell-escape built-ins (`esyscmd` and `maketemp`).
//!
//! These are the only built-ins that reach outside the process, so the
//! whole module sits behind the `shell` cargo feature.

use m4lang::command;
use m4lang::error;
use m4lang::vm;
use rand::Rng;

/// Get the `esyscmd` built-in.
pub fn get_esyscmd() -> command::BuiltIn {
    command::BuiltIn::new(esyscmd_fn)
}

fn esyscmd_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    let command_line = String::from_utf8_lossy(arguments.get(1)).into_owned();
    #[cfg(windows)]
    let output = std::process::Command::new("cmd")
        .arg("/C")
        .arg(&command_line)
        .output();
    #[cfg(not(windows))]
    let output = std::process::Command::new("sh")
        .arg("-c")
        .arg(&command_line)
        .output();
    let output =
        output.map_err(|err| error::Error::io("esyscmd: failed to run the command", err))?;
    if !output.status.success() {
        return Err(error::Error::io_failure(format!(
            "esyscmd: command failed with {}",
            output.status
        )));
    }
    // NUL bytes cannot be rescanned meaningfully, so they are stripped from
    // the captured output.
    let captured: Vec<u8> = output.stdout.into_iter().filter(|&byte| byte != 0).collect();
    input.push_source(captured);
    Ok(())
}

/// Get the `maketemp` built-in.
pub fn get_maketemp() -> command::BuiltIn {
    command::BuiltIn::new(maketemp_fn)
}

fn maketemp_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    let template = arguments.get(1);
    let x_count = template
        .iter()
        .rev()
        .take_while(|&&byte| byte == b'X')
        .count();
    if x_count == 0 {
        return Err(error::Error::usage(
            "maketemp: template must end with at least one X",
        ));
    }
    let stem = &template[..template.len() - x_count];
    let mut rng = rand::thread_rng();
    for _ in 0..100 {
        let mut name = stem.to_vec();
        for _ in 0..x_count {
            name.push(rng.sample(rand::distributions::Alphanumeric));
        }
        let path = String::from_utf8_lossy(&name).into_owned();
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(_) => {
                input.push_source(name);
                return Ok(());
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => {
                return Err(error::Error::io("maketemp: failed to create the file", err))
            }
        }
    }
    Err(error::Error::io_failure(
        "maketemp: failed to find an unused name",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use std::collections::HashMap;

    fn initial_built_ins() -> HashMap<&'static str, command::BuiltIn> {
        HashMap::from([
            ("esyscmd", get_esyscmd()),
            ("maketemp", get_maketemp()),
        ])
    }

    #[cfg(unix)]
    test_suite![
        output_tests(
            (esyscmd_captures_stdout, "esyscmd(echo hello)", "hello\n"),
            (esyscmd_output_is_rescanned, "esyscmd(printf 'esyscmd(echo nested)')", "nested\n"),
            (bare_esyscmd_is_literal_text, "esyscmd more", "esyscmd more"),
        ),
        failure_tests(
            (esyscmd_nonzero_exit, "esyscmd(exit 3)"),
        ),
    ];

    #[cfg(unix)]
    #[test]
    fn maketemp_creates_a_unique_file() {
        let options = vec![TestOption::InitialBuiltIns(initial_built_ins)];
        let template = format!(
            "{}/m4crafttestXXXXXX",
            std::env::temp_dir().to_string_lossy()
        );
        let run = execute_source_code(&format!("maketemp({template})"), &options);
        run.result.unwrap();
        let created = run.output;
        assert_ne!(created, template);
        assert!(created.starts_with(&template[..template.len() - 6]));
        let path = std::path::Path::new(&created);
        assert!(path.exists());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn maketemp_requires_a_template() {
        let options = vec![TestOption::InitialBuiltIns(initial_built_ins)];
        run_failure_test("maketemp(no_trailing_marker)", &options);
    }
}
