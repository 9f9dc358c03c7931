//! Insert-mode command vocabulary.
//!
//! Every key the insert dispatcher handles (apart from Escape, `<C-o>` and
//! word completion) becomes an `InsertCommand` that the runner executes
//! against the host. Consecutive edits of the same combinable kind are folded
//! into a `Combined` value so the whole run can be repeated as one unit.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InsertCommand {
    /// Type one character at the caret (overwrites in Replace mode).
    DirectInsert(char),
    InsertNewLine,
    InsertTab,
    /// `<C-d>`: remove one shift width of indent from the caret line.
    ShiftLineLeft,
    /// `<C-t>`: add one shift width of indent to the caret line.
    ShiftLineRight,
    MoveCaret(Direction),
    DeleteLeft,
    DeleteRight,
    DeleteWordBeforeCaret,
    DeleteLineBeforeCaret,
    /// A folded run, executed in order. `combine` keeps it flat: elements
    /// are never `Combined` themselves.
    Combined(Vec<InsertCommand>),
}

/// Kind of an `InsertCommand`; a `Combined` reports the kind of its last element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandTag {
    DirectInsert,
    InsertNewLine,
    InsertTab,
    ShiftLineLeft,
    ShiftLineRight,
    MoveCaret,
    DeleteLeft,
    DeleteRight,
    DeleteWordBeforeCaret,
    DeleteLineBeforeCaret,
}

impl CommandTag {
    /// Runs of these kinds fold into one repeatable command.
    pub fn is_combinable(self) -> bool {
        matches!(
            self,
            CommandTag::DirectInsert
                | CommandTag::InsertNewLine
                | CommandTag::InsertTab
                | CommandTag::DeleteLeft
                | CommandTag::DeleteRight
        )
    }
}

impl InsertCommand {
    pub fn tag(&self) -> CommandTag {
        match self {
            InsertCommand::DirectInsert(_) => CommandTag::DirectInsert,
            InsertCommand::InsertNewLine => CommandTag::InsertNewLine,
            InsertCommand::InsertTab => CommandTag::InsertTab,
            InsertCommand::ShiftLineLeft => CommandTag::ShiftLineLeft,
            InsertCommand::ShiftLineRight => CommandTag::ShiftLineRight,
            InsertCommand::MoveCaret(_) => CommandTag::MoveCaret,
            InsertCommand::DeleteLeft => CommandTag::DeleteLeft,
            InsertCommand::DeleteRight => CommandTag::DeleteRight,
            InsertCommand::DeleteWordBeforeCaret => CommandTag::DeleteWordBeforeCaret,
            InsertCommand::DeleteLineBeforeCaret => CommandTag::DeleteLineBeforeCaret,
            // An empty run types nothing.
            InsertCommand::Combined(commands) => commands
                .last()
                .map_or(CommandTag::DirectInsert, InsertCommand::tag),
        }
    }

    pub fn is_combinable(&self) -> bool {
        self.tag().is_combinable()
    }

    /// Fold `next` onto `self` when both are combinable and share a kind.
    /// Returns `None` when `next` has to replace `self` instead.
    pub fn combine(self, next: InsertCommand) -> Option<InsertCommand> {
        if !self.is_combinable() || self.tag() != next.tag() {
            return None;
        }
        let mut commands = match self {
            InsertCommand::Combined(commands) => commands,
            leaf => vec![leaf],
        };
        match next {
            InsertCommand::Combined(more) => commands.extend(more),
            leaf => commands.push(leaf),
        }
        Some(InsertCommand::Combined(commands))
    }

    /// True for commands that modify buffer text (everything but caret motion).
    pub fn edits_text(&self) -> bool {
        match self {
            InsertCommand::MoveCaret(_) => false,
            InsertCommand::Combined(commands) => commands.iter().any(InsertCommand::edits_text),
            _ => true,
        }
    }

    /// Leaf commands in execution order.
    pub fn flatten(&self) -> Vec<&InsertCommand> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a InsertCommand>) {
        match self {
            InsertCommand::Combined(commands) => {
                for command in commands {
                    command.collect_leaves(out);
                }
            }
            leaf => out.push(leaf),
        }
    }

    /// Text typed by this command when it only inserts characters, newlines
    /// and tabs. Tabs are reported literally.
    pub fn inserted_text(&self) -> Option<String> {
        self.flatten()
            .into_iter()
            .map(|leaf| match leaf {
                InsertCommand::DirectInsert(c) => Some(*c),
                InsertCommand::InsertNewLine => Some('\n'),
                InsertCommand::InsertTab => Some('\t'),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for InsertCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = self.inserted_text() {
            return write!(f, "insert {text:?}");
        }
        let count = self.flatten().len();
        match self {
            InsertCommand::MoveCaret(direction) => write!(f, "move {direction:?}"),
            _ if count > 1 => write!(f, "{:?} x{count}", self.tag()),
            _ => write!(f, "{:?}", self.tag()),
        }
    }
}
