use std::io::IsTerminal;
use std::sync::OnceLock;

static DEBUG: OnceLock<bool> = OnceLock::new();
static ANSI: OnceLock<bool> = OnceLock::new();

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::log::_debug(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::log::_info(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::log::_success(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log::_error(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log::_warn(format!($($arg)*))
    };
}

#[macro_export]
macro_rules! question {
    ($($arg:tt)*) => {
        $crate::log::_question(format!($($arg)*))
    };
}

/// Resolves colour and debug settings up front. Calling it is optional, the
/// macros fall back to the same detection on first use.
pub fn init() {
    ansi();
    debug_enabled();
}

fn ansi() -> bool {
    *ANSI.get_or_init(|| {
        if std::env::var("NO_COLOR").is_ok() {
            false
        } else if std::env::var("FORCE_COLOR").is_ok() {
            true
        } else {
            std::io::stdout().is_terminal()
        }
    })
}

fn debug_enabled() -> bool {
    *DEBUG.get_or_init(|| cfg!(debug_assertions) || std::env::var("DEBUG").is_ok())
}

fn strip_ansi_codes(input: &str) -> String {
    if ansi() {
        return input.to_string();
    }
    console::strip_ansi_codes(input).to_string()
}

enum Stream {
    Stdout,
    Stderr,
}

fn emit(stream: Stream, colour: u8, prefix: &str, message: &str) {
    let line = if ansi() {
        format!("\x1b[1;{}m{} \x1b[0m{}", colour, prefix, message)
    } else {
        format!("{} {}", prefix, message)
    };
    match stream {
        Stream::Stdout => println!("{}", line),
        Stream::Stderr => eprintln!("{}", line),
    }
}

pub fn _debug(message: String) {
    if debug_enabled() {
        emit(Stream::Stdout, 90, "D)", &message);
    }
}

pub fn _info(message: String) {
    emit(Stream::Stdout, 94, "i)", &message);
}

pub fn _success(message: String) {
    emit(Stream::Stdout, 92, "o)", &message);
}

pub fn _error(message: String) {
    emit(Stream::Stderr, 91, "X)", &message);
}

pub fn _warn(message: String) {
    emit(Stream::Stderr, 93, "!)", &message);
}

/// Prompt label for dialoguer, styled like the other prefixes.
pub fn _question(message: String) -> String {
    if ansi() {
        format!("\x1b[1;90m?) \x1b[0m{}", message)
    } else {
        format!("?) {}", message)
    }
}

/// Wraps `text` in a bold escape when colour is on.
pub fn bold(text: &str) -> String {
    strip_ansi_codes(&console::style(text).bold().force_styling(true).to_string())
}
