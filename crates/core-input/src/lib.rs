//! Key notation parsing.
//!
//! Hosts that do not translate platform events themselves (the replay CLI,
//! integration tests) describe keystrokes in Vim notation: plain characters
//! type themselves, `<...>` tokens name special keys and chords.
//!
//! ```text
//! hello<Esc>      five characters followed by Escape
//! <C-d><C-t>      control chords (base letter normalized to lowercase)
//! <lt>            a literal '<'
//! <S-Tab>         modifiers combine as C-, S-, A- (M- is accepted for A-)
//! ```
//!
//! A `<` that does not open a well-formed token (no closing `>`, empty or
//! whitespace content) is taken literally, matching Vim's mapping parser.

mod notation;

pub use notation::{NotationError, parse_key, parse_keys};
