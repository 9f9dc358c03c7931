//! Execution of insert commands against a host.
//!
//! `InsertCommandRunner` is the seam the dispatcher calls through. The
//! provided `BufferCommandRunner` works purely over the `InsertHost` traits:
//! every edit goes through `TextView`, every applied edit is reported to the
//! host's text-change tracker, and indentation follows `InsertSettings`.
//!
//! Caret rules:
//! * Edits leave the caret just past the inserted text (or at the start of
//!   the removed range).
//! * `MoveCaret` completes the host's in-flight text change; edits never do.
//! * Typing in virtual space first pads the line with real spaces up to the
//!   caret column.

use crate::command::{Direction, InsertCommand};
use crate::result::{CommandError, CommandResult};
use core_config::InsertSettings;
use core_model::{InsertHost, TextSpan};
use core_state::TextChange;
use core_text::{Position, grapheme};
use tracing::{debug, trace};

pub trait InsertCommandRunner {
    fn run_insert_command(
        &mut self,
        host: &mut dyn InsertHost,
        command: &InsertCommand,
    ) -> CommandResult;
}

/// Runner applying commands directly to the host buffer.
#[derive(Debug, Clone)]
pub struct BufferCommandRunner<S> {
    settings: S,
}

impl<S: InsertSettings> InsertCommandRunner for BufferCommandRunner<S> {
    fn run_insert_command(
        &mut self,
        host: &mut dyn InsertHost,
        command: &InsertCommand,
    ) -> CommandResult {
        let result = CommandResult::from(self.run(host, command));
        match result {
            CommandResult::Error(err) => {
                debug!(target: "actions.runner", command = ?command.tag(), error = %err, "command_failed")
            }
            CommandResult::Completed(_) => {
                trace!(target: "actions.runner", command = ?command.tag(), "command_completed")
            }
        }
        result
    }
}

impl<S: InsertSettings> BufferCommandRunner<S> {
    pub fn new(settings: S) -> Self {
        Self { settings }
    }

    fn run(&self, host: &mut dyn InsertHost, command: &InsertCommand) -> Result<(), CommandError> {
        let caret = host.caret();
        if !host.is_char_boundary(caret) {
            return Err(CommandError::InvalidCaret);
        }
        if command.edits_text() && host.is_read_only() {
            return Err(CommandError::ReadOnly);
        }
        match command {
            InsertCommand::Combined(commands) => {
                for command in commands {
                    self.run(host, command)?;
                }
                Ok(())
            }
            InsertCommand::DirectInsert(c) => {
                self.insert_char(host, *c);
                Ok(())
            }
            InsertCommand::InsertNewLine => {
                insert_at_caret(host, "\n");
                Ok(())
            }
            InsertCommand::InsertTab => {
                self.insert_tab(host);
                Ok(())
            }
            InsertCommand::ShiftLineLeft => {
                self.shift_line(host, false);
                Ok(())
            }
            InsertCommand::ShiftLineRight => {
                self.shift_line(host, true);
                Ok(())
            }
            InsertCommand::MoveCaret(direction) => {
                self.move_caret(host, *direction);
                Ok(())
            }
            InsertCommand::DeleteLeft => delete_left(host),
            InsertCommand::DeleteRight => delete_right(host),
            InsertCommand::DeleteWordBeforeCaret => {
                let caret = host.caret();
                let line = host.line_text(caret.line);
                delete_before_caret(host, word_deletion_start(&line[..caret.byte]))
            }
            InsertCommand::DeleteLineBeforeCaret => {
                let caret = host.caret();
                let line = host.line_text(caret.line);
                let indent = indent_len(&line);
                let start = if caret.byte > indent { indent } else { 0 };
                delete_before_caret(host, start)
            }
        }
    }

    fn insert_char(&self, host: &mut dyn InsertHost, c: char) {
        realize_virtual_space(host);
        let caret = host.caret();
        if host.overwrite() {
            let line = host.line_text(caret.line);
            if caret.byte < line.len() {
                let start = host.offset_of(caret);
                let len = grapheme::next_boundary(&line, caret.byte) - caret.byte;
                let removed = host.delete_text(TextSpan::with_len(start, len));
                host.record_change(TextChange::DeleteRight(removed.chars().count()));
            }
        }
        let mut utf8 = [0u8; 4];
        insert_at_caret(host, c.encode_utf8(&mut utf8));
    }

    fn insert_tab(&self, host: &mut dyn InsertHost) {
        realize_virtual_space(host);
        if !self.settings.expand_tab() {
            insert_at_caret(host, "\t");
            return;
        }
        let caret = host.caret();
        let tab_stop = self.settings.tab_stop();
        let col = grapheme::visual_col(&host.line_text(caret.line), caret.byte, tab_stop);
        insert_at_caret(host, &" ".repeat(tab_stop - col % tab_stop));
    }

    /// Re-indent the caret line to the previous/next multiple of `shift_width`.
    fn shift_line(&self, host: &mut dyn InsertHost, right: bool) {
        let caret = host.caret();
        let line = host.line_text(caret.line);
        let indent = indent_len(&line);
        let tab_stop = self.settings.tab_stop();
        let shift = self.settings.shift_width();
        let width = grapheme::visual_col(&line, indent, tab_stop);
        let target = if right {
            (width / shift + 1) * shift
        } else if width == 0 {
            return;
        } else {
            (width - 1) / shift * shift
        };
        let replacement = self.indent_string(target);
        let line_start = host.offset_of(Position::new(caret.line, 0));
        host.replace_text(TextSpan::with_len(line_start, indent), &replacement);
        let byte = if caret.byte <= indent {
            replacement.len()
        } else {
            caret.byte - indent + replacement.len()
        };
        host.move_caret(Position::new(caret.line, byte));
        debug!(target: "actions.runner", line = caret.line, from = width, to = target, "shift_line");
    }

    fn indent_string(&self, width: usize) -> String {
        if self.settings.expand_tab() {
            return " ".repeat(width);
        }
        let tab_stop = self.settings.tab_stop();
        let mut indent = "\t".repeat(width / tab_stop);
        indent.push_str(&" ".repeat(width % tab_stop));
        indent
    }

    fn move_caret(&self, host: &mut dyn InsertHost, direction: Direction) {
        let caret = host.caret();
        let line = host.line_text(caret.line);
        let target = match direction {
            // Leaving virtual space lands on the real end of line first.
            Direction::Left if host.is_in_virtual_space() => caret,
            Direction::Left => Position::new(caret.line, grapheme::prev_boundary(&line, caret.byte)),
            Direction::Right => Position::new(caret.line, grapheme::next_boundary(&line, caret.byte)),
            Direction::Up | Direction::Down => {
                let target_line = if direction == Direction::Up {
                    caret.line.checked_sub(1)
                } else {
                    Some(caret.line + 1).filter(|l| *l < host.line_count())
                };
                match target_line {
                    Some(target_line) => {
                        let tab_stop = self.settings.tab_stop();
                        let col = grapheme::visual_col(&line, caret.byte, tab_stop)
                            + host.virtual_spaces();
                        let text = host.line_text(target_line);
                        Position::new(target_line, byte_at_col(&text, col, tab_stop))
                    }
                    None => caret,
                }
            }
            Direction::LineStart => Position::new(caret.line, 0),
            Direction::LineEnd => Position::new(caret.line, line.len()),
        };
        host.move_caret(target);
        host.complete_change();
    }
}

fn insert_at_caret(host: &mut dyn InsertHost, text: &str) {
    let caret = host.caret();
    let end = host.insert_text(caret, text);
    host.move_caret(end);
    host.record_change(TextChange::Insert(text.to_string()));
}

fn realize_virtual_space(host: &mut dyn InsertHost) {
    let spaces = host.virtual_spaces();
    if spaces > 0 {
        insert_at_caret(host, &" ".repeat(spaces));
    }
}

fn delete_left(host: &mut dyn InsertHost) -> Result<(), CommandError> {
    let caret = host.caret();
    if host.overwrite() {
        // Replace mode backs over typed text without removing anything.
        if caret.byte == 0 {
            return Err(CommandError::NothingToDelete);
        }
        let line = host.line_text(caret.line);
        host.move_caret(Position::new(caret.line, grapheme::prev_boundary(&line, caret.byte)));
        return Ok(());
    }
    let line = host.line_text(caret.line);
    delete_before_caret(host, grapheme::prev_boundary(&line, caret.byte))
}

/// Delete from `start_byte` on the caret line up to the caret. At the start
/// of a line the line break before it goes instead.
fn delete_before_caret(host: &mut dyn InsertHost, start_byte: usize) -> Result<(), CommandError> {
    let caret = host.caret();
    let start = if caret.byte > 0 {
        Position::new(caret.line, start_byte)
    } else if caret.line > 0 {
        let previous = caret.line - 1;
        Position::new(previous, host.line_text(previous).len())
    } else {
        return Err(CommandError::NothingToDelete);
    };
    let start = host.offset_of(start);
    let end = host.offset_of(caret);
    let removed = host.delete_text(TextSpan::new(start, end));
    let pos = host.position_of(start);
    host.move_caret(pos);
    host.record_change(TextChange::DeleteLeft(removed.chars().count()));
    Ok(())
}

fn delete_right(host: &mut dyn InsertHost) -> Result<(), CommandError> {
    let caret = host.caret();
    let line = host.line_text(caret.line);
    let start = host.offset_of(caret);
    let end = if caret.byte < line.len() {
        start + grapheme::next_boundary(&line, caret.byte) - caret.byte
    } else if caret.line + 1 < host.line_count() {
        host.offset_of(Position::new(caret.line + 1, 0))
    } else {
        return Err(CommandError::NothingToDelete);
    };
    let removed = host.delete_text(TextSpan::new(start, end));
    host.move_caret(caret);
    host.record_change(TextChange::DeleteRight(removed.chars().count()));
    Ok(())
}

fn indent_len(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Start of the `<C-w>` range: trailing blanks, then one run of word
/// characters or one run of other non-blank characters.
fn word_deletion_start(before: &str) -> usize {
    let trimmed = before.trim_end_matches(char::is_whitespace);
    let Some(last) = trimmed.chars().next_back() else {
        return 0;
    };
    let word = grapheme::is_word_char(last);
    trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| !c.is_whitespace() && grapheme::is_word_char(*c) == word)
        .last()
        .map_or(trimmed.len(), |(idx, _)| idx)
}

/// Byte offset of the grapheme covering visual column `col`, or the line end.
fn byte_at_col(line: &str, col: usize, tab_stop: usize) -> usize {
    let mut width = 0;
    let mut byte = 0;
    for g in grapheme::iter(line) {
        let w = grapheme::cluster_width(g, width, tab_stop);
        if width + w > col {
            break;
        }
        width += w;
        byte += g.len();
    }
    byte
}
