//! The m4lang virtual machine (VM).
//!
//! This module contains the definition of the runtime VM and the main loop
//! that drives macro expansion. The VM owns the four pieces of state that
//! together implement rescanning semantics:
//!
//! - the pushback input buffer, into which every substitution result is
//!   unread so that it is scanned again;
//! - the call stack of active macro invocations, which collects arguments;
//! - the commands map from names to built-ins and user definitions;
//! - the diversion set, which multiplexes non-argument output.
//!
//! At every moment output goes to exactly one target: the active argument
//! buffer of the top call frame when the call stack is non-empty, and the
//! current diversion otherwise. The target is computed from the state on
//! every write rather than cached in a pointer.

use crate::command;
use crate::command::Arguments;
use crate::command::BuiltIn;
use crate::command::Command;
use crate::error;
use crate::token::Token;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::rc::Rc;

mod diversion;
mod input;
mod streams;

pub use diversion::Selection;
pub use diversion::DIVERSION_COUNT;
pub use input::Pushback;

/// The m4lang virtual machine.
pub struct VM {
    /// File system operations.
    ///
    /// By default this is real operations on the file system.
    /// It is replaceable to support unit testing.
    pub file_system: Box<dyn FileSystem>,

    /// Byte input from the terminal.
    ///
    /// By default this reads from standard input.
    pub terminal_in: Rc<RefCell<dyn TerminalIn>>,

    /// Writer that receives program output.
    ///
    /// Diversion 0 is flushed here while the VM runs, and all diversions are
    /// flushed here at termination. Defaults to standard output.
    pub terminal_out: Rc<RefCell<dyn io::Write>>,

    /// Writer that receives diagnostics (`errprint`, `dumpdef`, `htdist`).
    ///
    /// Defaults to standard error.
    pub terminal_err: Rc<RefCell<dyn io::Write>>,

    /// Whether reads fall through to [VM::terminal_in] when the pushback
    /// buffer is empty.
    ///
    /// Defaults to false; the command-line driver enables it when no input
    /// files are provided.
    pub read_terminal_in: bool,

    commands_map: command::Map,
    input: Pushback,
    call_stack: Vec<Frame>,
    diversions: diversion::DiversionSet,
    quote: QuoteState,
}

/// File system operations that the interpreter may need to perform.
///
/// These operations are extracted to a trait so that they can be mocked out
/// in unit testing.
pub trait FileSystem {
    /// Read the entire contents of a file.
    ///
    /// This is implemented by [std::fs::read].
    fn read_bytes(&self, path: &std::path::Path) -> io::Result<Vec<u8>>;
}

struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_bytes(&self, path: &std::path::Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Byte input operations from the terminal.
///
/// These operations are extracted to a trait so that they can be mocked out
/// in unit testing.
pub trait TerminalIn {
    /// Read a single byte from the terminal, or [None] at end of input.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

impl TerminalIn for io::Stdin {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use io::Read;
        let mut buffer = [0_u8; 1];
        let read = self.lock().read(&mut buffer)?;
        Ok(if read == 1 { Some(buffer[0]) } else { None })
    }
}

/// The quoting state of the main loop.
///
/// Text between the left and right delimiters passes through without macro
/// recognition. Quotes nest: the delimiters themselves are emitted at every
/// depth beyond the outermost pair.
struct QuoteState {
    left: u8,
    right: u8,
    depth: usize,
    active: bool,
}

impl Default for QuoteState {
    fn default() -> Self {
        QuoteState {
            left: b'`',
            right: b'\'',
            depth: 0,
            active: false,
        }
    }
}

/// An active macro invocation.
///
/// The command is cloned from the map when the call starts, so redefining
/// the macro while its arguments are being collected does not change the
/// behavior of the active call.
struct Frame {
    name: Vec<u8>,
    command: Command,
    /// Unquoted parenthesis depth inside this call. The opening parenthesis
    /// of the call raises it to 1; the call closes when it returns to 0.
    bracket_depth: usize,
    args: Arguments,
}

impl Frame {
    fn new(name: Vec<u8>, command: Command) -> Frame {
        Frame {
            name,
            command,
            bracket_depth: 1,
            args: Arguments::new(),
        }
    }
}

impl VM {
    /// Create a new VM with the provided built-in macros.
    pub fn new(built_ins: HashMap<&'static str, BuiltIn>) -> Box<VM> {
        Box::new(VM {
            file_system: Box::new(RealFileSystem {}),
            terminal_in: Rc::new(RefCell::new(io::stdin())),
            terminal_out: Rc::new(RefCell::new(io::stdout())),
            terminal_err: Rc::new(RefCell::new(io::stderr())),
            read_terminal_in: false,
            commands_map: command::Map::new(built_ins),
            input: Pushback::new(),
            call_stack: Vec::new(),
            diversions: diversion::DiversionSet::new(),
            quote: QuoteState::default(),
        })
    }

    /// Add source bytes to the front of the input.
    ///
    /// Input is a stack: the source pushed last is read first. This is the
    /// same operation the engine itself uses to rescan substitution
    /// results, and it is how `include` and the command-line driver load
    /// files.
    pub fn push_source<T: AsRef<[u8]>>(&mut self, source: T) {
        self.input.unread_bytes(source.as_ref());
    }

    /// Read the next token from the input.
    pub fn next_token(&mut self) -> error::Result<Option<Token>> {
        streams::next_token(self)
    }

    /// Return a reference to the commands map.
    #[inline]
    pub fn commands_map(&self) -> &command::Map {
        &self.commands_map
    }

    /// Return a mutable reference to the commands map.
    #[inline]
    pub fn commands_map_mut(&mut self) -> &mut command::Map {
        &mut self.commands_map
    }

    /// Replace the quote delimiters.
    ///
    /// The caller is responsible for validating the delimiters; see the
    /// `changequote` built-in.
    pub fn set_quote_delimiters(&mut self, left: u8, right: u8) {
        self.quote.left = left;
        self.quote.right = right;
    }

    /// Redirect non-argument output to the provided diversion.
    pub fn select_diversion(&mut self, selection: Selection) {
        self.diversions.select(selection);
    }

    /// The current diversion number: 0 through 9, or -1 for the sink.
    pub fn diversion_number(&self) -> i64 {
        self.diversions.number()
    }

    /// Undivert buffer `n`, which must be 1 through 9: flush it to the
    /// output when the current diversion is 0, otherwise append it to the
    /// current diversion (never to itself). The source buffer is cleared.
    pub fn undivert(&mut self, n: u8) -> error::Result<()> {
        let terminal_out = self.terminal_out.clone();
        let result = self
            .diversions
            .undivert(n, &mut *terminal_out.borrow_mut())
            .map_err(write_error);
        result
    }

    /// Flush diversions 0 through 9 to the output in numeric order.
    pub fn undivert_all(&mut self) -> error::Result<()> {
        let terminal_out = self.terminal_out.clone();
        let result = self
            .diversions
            .flush_all(&mut *terminal_out.borrow_mut())
            .map_err(write_error);
        result
    }

    /// Run the VM until the input is exhausted.
    ///
    /// It is assumed that the VM has been preloaded with source bytes using
    /// [VM::push_source], unless terminal reads are enabled. On a clean end
    /// of input all diversions are flushed; ending inside a macro call or
    /// inside quotes is an error.
    pub fn run(&mut self) -> error::Result<()> {
        loop {
            self.flush_primary()?;
            let token = match streams::next_token(self)? {
                None => break,
                Some(token) => token,
            };
            self.process_token(token)?;
        }
        if !self.call_stack.is_empty() {
            return Err(error::Error::end_of_input(
                "input ended inside a macro call",
            ));
        }
        if self.quote.active {
            return Err(error::Error::end_of_input("input ended inside quotes"));
        }
        self.undivert_all()
    }

    fn flush_primary(&mut self) -> error::Result<()> {
        let terminal_out = self.terminal_out.clone();
        let result = self
            .diversions
            .flush_primary(&mut *terminal_out.borrow_mut())
            .map_err(write_error);
        result
    }

    /// Emit bytes to the current output target: the active argument buffer
    /// of the top call frame, or the current diversion when the call stack
    /// is empty.
    fn emit(&mut self, bytes: &[u8]) {
        match self.call_stack.last_mut() {
            Some(frame) => frame.args.active_mut().extend_from_slice(bytes),
            None => self.diversions.write(bytes),
        }
    }

    fn process_token(&mut self, token: Token) -> error::Result<()> {
        // Quote delimiters are recognized everywhere, including during
        // argument collection. The comparison is against the token's full
        // byte string: a single-letter name token matches a letter
        // delimiter.
        if token.bytes() == std::slice::from_ref(&self.quote.left) {
            if self.quote.depth > 0 {
                self.emit(token.bytes());
            }
            self.quote.depth += 1;
            self.quote.active = true;
            return Ok(());
        }
        if self.quote.active {
            if token.bytes() == std::slice::from_ref(&self.quote.right) {
                if self.quote.depth > 1 {
                    self.emit(token.bytes());
                }
                self.quote.depth -= 1;
                if self.quote.depth == 0 {
                    self.quote.active = false;
                }
            } else {
                self.emit(token.bytes());
            }
            return Ok(());
        }
        if let Some(name) = token.word() {
            if let Some(command) = self.commands_map.get(name) {
                let command = command.clone();
                let name = name.to_vec();
                return self.expand_name(name, command);
            }
        }
        if let Some(depth) = self.call_stack.last().map(|frame| frame.bracket_depth) {
            if token.is_char(b')') {
                if depth == 1 {
                    return self.close_call();
                }
                self.emit(token.bytes());
                self.call_stack.last_mut().unwrap().bracket_depth -= 1;
                return Ok(());
            }
            if token.is_char(b',') && depth == 1 {
                return self.next_argument();
            }
            if token.is_char(b'(') {
                self.emit(token.bytes());
                self.call_stack.last_mut().unwrap().bracket_depth += 1;
                return Ok(());
            }
        }
        self.emit(token.bytes());
        Ok(())
    }

    /// Handle a name token that resolved to a command.
    ///
    /// One token of lookahead decides between the two invocation forms: an
    /// immediately following `(` starts argument collection, anything else
    /// is unread and the bare form runs.
    fn expand_name(&mut self, name: Vec<u8>, command: Command) -> error::Result<()> {
        let lookahead = streams::next_token(self)?;
        if let Some(token) = &lookahead {
            if token.is_char(b'(') {
                self.call_stack.push(Frame::new(name, command));
                return streams::eat_whitespace(self);
            }
        }
        if let Some(token) = lookahead {
            self.input.unread_bytes(token.bytes());
        }
        match command {
            Command::BuiltIn(built_in) => match built_in.bare_call() {
                Some(bare_call) => bare_call(self),
                None => {
                    // This built-in needs arguments, so the bare name passes
                    // through as literal text.
                    self.emit(&name);
                    Ok(())
                }
            },
            Command::Macro(user_macro) => {
                let stripped = user_macro.strip_parameters();
                self.input.unread_bytes(&stripped);
                Ok(())
            }
        }
    }

    fn next_argument(&mut self) -> error::Result<()> {
        let frame = self.call_stack.last_mut().unwrap();
        if !frame.args.begin_next() {
            let name = String::from_utf8_lossy(&frame.name).into_owned();
            return Err(error::Error::usage("macro call has too many arguments")
                .with_note(format!("the call to `{name}` collected {} arguments already", command::MAX_ARGUMENTS)));
        }
        streams::eat_whitespace(self)
    }

    fn close_call(&mut self) -> error::Result<()> {
        let mut frame = self.call_stack.pop().unwrap();
        frame.bracket_depth -= 1;
        debug_assert_eq!(frame.bracket_depth, 0);
        let Frame { command, args, .. } = frame;
        match command {
            Command::BuiltIn(built_in) => (built_in.call())(self, &args),
            Command::Macro(user_macro) => {
                let expansion = user_macro.substitute(&args);
                self.input.unread_bytes(&expansion);
                Ok(())
            }
        }
    }
}

fn write_error(err: io::Error) -> Box<error::Error> {
    error::Error::io("failed to write program output", err)
}
