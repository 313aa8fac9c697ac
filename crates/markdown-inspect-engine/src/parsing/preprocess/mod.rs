//! # Preprocessing
//!
//! Reads the raw input one logical line at a time, normalizing every line
//! terminator to a single `\n`, and pulls preprocessor directives out of the
//! text before the structural parser sees it.
//!
//! ## Directives
//!
//! A directive is an HTML comment that occupies a whole line:
//!
//! - `<!-- @suppress spelling, sentence-length next=2 -->` silences the named
//!   rules on the two lines that follow (one line when `next` is omitted)
//! - `<!--suppress:spelling-->` is the compact spelling of the same thing
//! - `<!-- @suppress-file spelling -->` silences them for the whole document
//!
//! Lines inside a fenced code block (```` ``` ```` or `~~~`, indented at most
//! three spaces) are never read as directives.
//!
//! Naming no rules silences every rule. What happens to the directive line
//! itself is chosen by [`DirectivePolicy`]; in every case it produces no
//! sentences and its [`PreprocessorRule`](crate::models::PreprocessorRule)
//! records the original line number.

mod directive;
mod reader;

pub use directive::parse_directive;
pub use markdown_inspect_config::DirectivePolicy;
pub use reader::{LineDisposition, PreprocessingReader, RawLine};
