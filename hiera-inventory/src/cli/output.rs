//! Terminal output: colored diagnostics on stderr, JSON documents on stdout
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::io::Write;

use colored::Colorize;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Indentation of the JSON inventory document.
pub const JSON_INDENT: &[u8] = b"    ";

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Write `value` as pretty JSON (4-space indent) followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> std::io::Result<()> {
    let mut ser = Serializer::with_formatter(&mut *out, PrettyFormatter::with_indent(JSON_INDENT));
    value.serialize(&mut ser)?;
    writeln!(out)?;
    out.flush()
}
