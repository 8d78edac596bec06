//! Token streaming over the pushback buffer.
//!
//! The tokenizer is stateless across calls: each call to [next_token] reads
//! the minimum number of bytes needed to produce one token, and the first
//! byte read past the end of a name is unread so nothing is lost. Bytes come
//! from the pushback buffer, falling back to the terminal when the buffer is
//! empty and terminal reads are enabled.

use super::VM;
use crate::error;
use crate::token;
use crate::token::Token;

pub(crate) fn next_token(vm: &mut VM) -> crate::error::Result<Option<Token>> {
    let first = match read_byte(vm)? {
        None => return Ok(None),
        Some(byte) => byte,
    };
    if !token::is_name_start(first) {
        return Ok(Some(Token::Char(first)));
    }
    let mut name = vec![first];
    loop {
        match read_byte(vm)? {
            None => break,
            Some(byte) => {
                if token::is_name_continue(byte) {
                    name.push(byte);
                } else {
                    // Read past the end of the name, so put the byte back.
                    vm.input.unread(byte);
                    break;
                }
            }
        }
    }
    Ok(Some(Token::Word(name)))
}

/// Read tokens up to the next non-whitespace token, which is unread.
///
/// End of input simply stops the scan; the main loop reports whatever error
/// the resulting state implies.
pub(crate) fn eat_whitespace(vm: &mut VM) -> crate::error::Result<()> {
    while let Some(token) = next_token(vm)? {
        if !token.is_whitespace() {
            vm.input.unread_bytes(token.bytes());
            break;
        }
    }
    Ok(())
}

fn read_byte(vm: &mut VM) -> crate::error::Result<Option<u8>> {
    if let Some(byte) = vm.input.read() {
        return Ok(Some(byte));
    }
    if !vm.read_terminal_in {
        return Ok(None);
    }
    let terminal_in = vm.terminal_in.clone();
    let byte = terminal_in
        .borrow_mut()
        .read_byte()
        .map_err(|err| error::Error::io("failed to read from the terminal", err))?;
    Ok(byte)
}
