//! Error handling
//!
//! Every fatal condition in the interpreter is represented by a boxed
//! [Error] value carrying a [Kind], a one-line title, and optional notes.
//! There is no recovery: an error aborts the main loop and the process
//! exits with a non-zero code after the error has been printed.

use colored::Colorize;
use std::fmt;

/// The result type used throughout the interpreter.
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// The kind of a fatal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// A built-in macro was invoked with invalid arguments,
    /// or a macro call was malformed.
    Usage,
    /// The input ended in a state that cannot be completed,
    /// such as inside a macro call or inside quotes.
    EndOfInput,
    /// An operation on the file system, a stream, or a child process failed.
    Io,
}

/// A fatal interpreter error.
#[derive(Debug)]
pub struct Error {
    kind: Kind,
    title: String,
    notes: Vec<String>,
}

impl Error {
    /// Create a new usage error.
    pub fn usage<T: Into<String>>(title: T) -> Box<Error> {
        Box::new(Error {
            kind: Kind::Usage,
            title: title.into(),
            notes: vec![],
        })
    }

    /// Create a new end-of-input error.
    pub fn end_of_input<T: Into<String>>(title: T) -> Box<Error> {
        Box::new(Error {
            kind: Kind::EndOfInput,
            title: title.into(),
            notes: vec![],
        })
    }

    /// Create a new I/O error. The underlying error is attached as a note.
    pub fn io<T: Into<String>>(title: T, underlying: std::io::Error) -> Box<Error> {
        Box::new(Error {
            kind: Kind::Io,
            title: title.into(),
            notes: vec![format!("underlying I/O error: {underlying}")],
        })
    }

    /// Create a new I/O error that has no underlying [std::io::Error] value,
    /// such as a child process exiting unsuccessfully.
    pub fn io_failure<T: Into<String>>(title: T) -> Box<Error> {
        Box::new(Error {
            kind: Kind::Io,
            title: title.into(),
            notes: vec![],
        })
    }

    /// Attach a note to the error.
    pub fn with_note<T: Into<String>>(mut self: Box<Error>, note: T) -> Box<Error> {
        self.notes.push(note.into());
        self
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", "error:".bright_red().bold(), self.title)?;
        for note in &self.notes {
            write!(f, "\n  {} {}", "note:".bold(), note)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_preserved() {
        assert_eq!(Error::usage("bad").kind(), Kind::Usage);
        assert_eq!(Error::end_of_input("eof").kind(), Kind::EndOfInput);
        let underlying = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(Error::io("read failed", underlying).kind(), Kind::Io);
    }

    #[test]
    fn display_contains_title_and_notes() {
        colored::control::set_override(false);
        let err = Error::usage("divert: diversion number must be 0 to 9 or -1")
            .with_note("the argument was `77`");
        let rendered = format!("{err}");
        assert!(rendered.contains("divert: diversion number must be 0 to 9 or -1"));
        assert!(rendered.contains("the argument was `77`"));
    }
}
