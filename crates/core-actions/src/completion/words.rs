//! Word span and candidate computation for `<C-n>` / `<C-p>`.
//!
//! Offsets are absolute byte offsets into the whole buffer text. A word is a
//! maximal run of word characters (alphanumeric or `_`).

use core_model::TextSpan;
use core_text::grapheme::is_word_char;

/// The partial word ending at `caret`: the maximal backward run of word
/// characters. `None` when the character before the caret is not part of a
/// word (or the caret is at the start of the text).
pub fn word_completion_span(text: &str, caret: usize) -> Option<TextSpan> {
    if caret > text.len() || !text.is_char_boundary(caret) {
        return None;
    }
    let start = text[..caret]
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_word_char(*c))
        .last()
        .map(|(idx, _)| idx)?;
    Some(TextSpan::new(start, caret))
}

/// Candidates for completing the word under `anchor`.
pub fn word_completions(text: &str, anchor: TextSpan) -> WordCompletions {
    WordCompletions::new(text, anchor)
}

/// Lazy, restartable sequence of completion candidates.
///
/// Yields every word longer than one character that starts with the anchor
/// text, beginning with the first word starting at or after the anchor end
/// and wrapping around to the start of the buffer. Duplicates are kept.
#[derive(Debug, Clone)]
pub struct WordCompletions {
    text: String,
    prefix: String,
    anchor_end: usize,
    cursor: usize,
    wrapped: bool,
}

impl WordCompletions {
    pub fn new(text: &str, anchor: TextSpan) -> Self {
        let anchor_end = anchor.end.min(text.len());
        let prefix = text.get(anchor.start..anchor_end).unwrap_or_default();
        Self {
            text: text.to_string(),
            prefix: prefix.to_string(),
            anchor_end,
            cursor: anchor_end,
            wrapped: false,
        }
    }
}

impl Iterator for WordCompletions {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let limit = if self.wrapped {
                self.anchor_end
            } else {
                self.text.len()
            };
            match next_word(&self.text, self.cursor).filter(|span| span.start < limit) {
                Some(span) => {
                    self.cursor = span.end;
                    let word = &self.text[span.start..span.end];
                    if word.chars().nth(1).is_some() && word.starts_with(&self.prefix) {
                        return Some(word.to_string());
                    }
                }
                None if !self.wrapped => {
                    self.wrapped = true;
                    self.cursor = 0;
                }
                None => return None,
            }
        }
    }
}

/// First word that starts at or after `from`. A word starting before `from`
/// and extending past it is skipped.
fn next_word(text: &str, from: usize) -> Option<TextSpan> {
    let tail = text.get(from..)?;
    let mut previous_is_word = text[..from].chars().next_back().is_some_and(is_word_char);
    let mut start = None;
    for (idx, c) in tail.char_indices() {
        let word = is_word_char(c);
        match start {
            None if word && !previous_is_word => start = Some(from + idx),
            Some(s) if !word => return Some(TextSpan::new(s, from + idx)),
            _ => {}
        }
        previous_is_word = word;
    }
    start.map(|s| TextSpan::new(s, text.len()))
}
