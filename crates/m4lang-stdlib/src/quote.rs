//! The `changequote` built-in.

use m4lang::command;
use m4lang::error;
use m4lang::vm;

/// Get the `changequote` built-in.
pub fn get_changequote() -> command::BuiltIn {
    command::BuiltIn::new(changequote_fn)
}

fn changequote_fn(input: &mut vm::VM, arguments: &command::Arguments) -> error::Result<()> {
    let (left, right) = match (arguments.get(1), arguments.get(2)) {
        (&[left], &[right]) => (left, right),
        _ => return Err(invalid_delimiters()),
    };
    if left == right
        || !left.is_ascii_graphic()
        || !right.is_ascii_graphic()
        || is_reserved(left)
        || is_reserved(right)
    {
        return Err(invalid_delimiters());
    }
    input.set_quote_delimiters(left, right);
    Ok(())
}

/// The call syntax bytes cannot double as quote delimiters.
fn is_reserved(byte: u8) -> bool {
    matches!(byte, b'(' | b')' | b',')
}

fn invalid_delimiters() -> Box<error::Error> {
    error::Error::usage(
        "changequote: delimiters must be two distinct single graphic characters, \
         none of them a parenthesis or a comma",
    )
}
