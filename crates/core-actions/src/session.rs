use crate::command::InsertCommand;

/// Per-activation state of an insert mode instance.
///
/// Holds the edit run typed since the mode was entered (or since the last
/// non-combinable command), folded into one `InsertCommand`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    combined_edit_command: Option<InsertCommand>,
}

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn combined_edit_command(&self) -> Option<&InsertCommand> {
        self.combined_edit_command.as_ref()
    }

    /// Fold a successfully executed command into the pending run.
    pub(crate) fn record(&mut self, command: InsertCommand) {
        let next = match self.combined_edit_command.take() {
            Some(pending) => pending.combine(command.clone()).unwrap_or(command),
            None => command,
        };
        self.combined_edit_command = Some(next);
    }

    pub(crate) fn clear(&mut self) {
        self.combined_edit_command = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandTag, Direction};
    use pretty_assertions::assert_eq;

    #[test]
    fn typed_run_folds_then_shift_replaces() {
        let mut data = SessionData::new();
        for c in "hello".chars() {
            data.record(InsertCommand::DirectInsert(c));
        }
        let pending = data.combined_edit_command().unwrap();
        assert_eq!(pending.tag(), CommandTag::DirectInsert);
        assert_eq!(pending.inserted_text().as_deref(), Some("hello"));

        data.record(InsertCommand::ShiftLineLeft);
        assert_eq!(
            data.combined_edit_command(),
            Some(&InsertCommand::ShiftLineLeft)
        );
    }

    #[test]
    fn kind_change_starts_new_run() {
        let mut data = SessionData::new();
        data.record(InsertCommand::DirectInsert('a'));
        data.record(InsertCommand::DeleteLeft);
        data.record(InsertCommand::DeleteLeft);
        let pending = data.combined_edit_command().unwrap();
        assert_eq!(pending.flatten().len(), 2);
        assert!(
            pending
                .flatten()
                .iter()
                .all(|c| **c == InsertCommand::DeleteLeft)
        );

        data.record(InsertCommand::MoveCaret(Direction::Left));
        data.clear();
        assert_eq!(data, SessionData::default());
    }
}
