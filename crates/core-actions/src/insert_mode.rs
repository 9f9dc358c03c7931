//! Insert / Replace mode key dispatcher.
//!
//! `InsertMode` turns one `KeyInput` into exactly one `ProcessResult`. Decision
//! order for `process`:
//! 1. With a word completion open, `<Down>`/`<Up>`/`<C-n>`/`<C-p>` move the
//!    selection and nothing else happens.
//! 2. Any other key dismisses the completion, then is handled as if none was
//!    open.
//! 3. `<Esc>`/`<C-[>` leave the mode.
//! 4. Keys in the binding table run their command.
//! 5. Printable characters, `<BS>` and `<Del>` run as direct input.
//! 6. Everything else is `NotHandled`.
//!
//! Commands are executed by an `InsertCommandRunner`; the dispatcher only
//! tracks the combined edit run (`SessionData`), the completion slot and the
//! `CommandRan` observers.
//!
//! The completion slot is shared with the session's dismissal handler so a
//! session dismissed by the host clears it. Each attached session carries a
//! generation number and the handler only clears the slot while its own
//! session is still the one attached.

use crate::command::{Direction, InsertCommand};
use crate::completion::{
    CompletionFlags, SubscriptionId, WordCompletionSession, WordCompletionSessionFactory,
    word_completion_span, word_completions,
};
use crate::history::{CommandRan, CommandRanObserver};
use crate::result::{CommandResult, ProcessResult};
use crate::runner::InsertCommandRunner;
use crate::session::SessionData;
use core_events::{KeyCode, KeyInput};
use core_model::InsertHost;
use core_state::{ModeArgument, ModeKind};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertKind {
    Insert,
    /// Typed characters overwrite the text under the caret.
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Binding {
    Command(InsertCommand),
    Escape,
    OneTimeCommand,
    WordCompletion { forward: bool },
}

struct ActiveCompletion {
    session: Rc<dyn WordCompletionSession>,
    subscription: SubscriptionId,
    generation: u64,
}

type CompletionSlot = Rc<RefCell<Option<ActiveCompletion>>>;

pub struct InsertMode {
    kind: InsertKind,
    bindings: HashMap<KeyInput, Binding>,
    runner: Box<dyn InsertCommandRunner>,
    completion_factory: Option<Box<dyn WordCompletionSessionFactory>>,
    completion: CompletionSlot,
    completion_generation: u64,
    session: SessionData,
    argument: ModeArgument,
    observers: Vec<Box<dyn CommandRanObserver>>,
}

fn default_bindings() -> HashMap<KeyInput, Binding> {
    let bind = |key: KeyInput, command: InsertCommand| (key, Binding::Command(command));
    HashMap::from([
        (KeyInput::named(KeyCode::Escape), Binding::Escape),
        (KeyInput::ctrl('['), Binding::Escape),
        (KeyInput::ctrl('o'), Binding::OneTimeCommand),
        bind(KeyInput::ctrl('d'), InsertCommand::ShiftLineLeft),
        bind(KeyInput::ctrl('t'), InsertCommand::ShiftLineRight),
        bind(KeyInput::named(KeyCode::Enter), InsertCommand::InsertNewLine),
        bind(KeyInput::alternate_enter(), InsertCommand::InsertNewLine),
        bind(KeyInput::ctrl('j'), InsertCommand::InsertNewLine),
        bind(KeyInput::named(KeyCode::Tab), InsertCommand::InsertTab),
        bind(KeyInput::ctrl('i'), InsertCommand::InsertTab),
        bind(KeyInput::ctrl('h'), InsertCommand::DeleteLeft),
        bind(KeyInput::ctrl('w'), InsertCommand::DeleteWordBeforeCaret),
        bind(KeyInput::ctrl('u'), InsertCommand::DeleteLineBeforeCaret),
        bind(KeyInput::named(KeyCode::Left), InsertCommand::MoveCaret(Direction::Left)),
        bind(KeyInput::named(KeyCode::Right), InsertCommand::MoveCaret(Direction::Right)),
        bind(KeyInput::named(KeyCode::Up), InsertCommand::MoveCaret(Direction::Up)),
        bind(KeyInput::named(KeyCode::Down), InsertCommand::MoveCaret(Direction::Down)),
        bind(KeyInput::named(KeyCode::Home), InsertCommand::MoveCaret(Direction::LineStart)),
        bind(KeyInput::named(KeyCode::End), InsertCommand::MoveCaret(Direction::LineEnd)),
    ])
}

impl InsertMode {
    /// Mode without word completion; see `with_word_completion`.
    pub fn new(kind: InsertKind, runner: Box<dyn InsertCommandRunner>) -> Self {
        Self {
            kind,
            bindings: default_bindings(),
            runner,
            completion_factory: None,
            completion: Rc::new(RefCell::new(None)),
            completion_generation: 0,
            session: SessionData::new(),
            argument: ModeArgument::None,
            observers: Vec::new(),
        }
    }

    /// Bind `<C-n>` / `<C-p>` to start sessions from `factory`.
    pub fn with_word_completion(mut self, factory: Box<dyn WordCompletionSessionFactory>) -> Self {
        self.bindings
            .insert(KeyInput::ctrl('n'), Binding::WordCompletion { forward: true });
        self.bindings
            .insert(KeyInput::ctrl('p'), Binding::WordCompletion { forward: false });
        self.completion_factory = Some(factory);
        self
    }

    pub fn mode_kind(&self) -> ModeKind {
        match self.kind {
            InsertKind::Insert => ModeKind::Insert,
            InsertKind::Replace => ModeKind::Replace,
        }
    }

    /// Notation of every bound key (`<C-d>`, `<Esc>`, ...), sorted.
    pub fn command_names(&self) -> BTreeSet<String> {
        self.bindings.keys().map(|key| key.to_string()).collect()
    }

    pub fn session_data(&self) -> &SessionData {
        &self.session
    }

    pub fn active_word_completion_session(&self) -> Option<Rc<dyn WordCompletionSession>> {
        self.completion
            .borrow()
            .as_ref()
            .map(|active| active.session.clone())
    }

    pub fn subscribe_command_ran(&mut self, observer: Box<dyn CommandRanObserver>) {
        self.observers.push(observer);
    }

    /// Keys typed as text rather than run as commands: printable characters,
    /// `<BS>` and `<Del>`.
    pub fn is_direct_insert(&self, key: &KeyInput) -> bool {
        direct_insert_command(key).is_some()
    }

    pub fn can_process(&self, key: &KeyInput) -> bool {
        self.bindings.contains_key(key) || self.is_direct_insert(key)
    }

    pub fn process<H: InsertHost>(&mut self, key: KeyInput, host: &mut H) -> ProcessResult {
        if let Some(session) = self.active_word_completion_session() {
            if let Some(forward) = completion_navigation(&key) {
                let moved = if forward {
                    session.move_next(host)
                } else {
                    session.move_previous(host)
                };
                trace!(target: "insert.completion", key = %key, moved, "navigate");
                return ProcessResult::Processed;
            }
            debug!(target: "insert.completion", key = %key, "dismiss_on_key");
            self.dismiss_word_completion();
        }

        match self.bindings.get(&key).cloned() {
            Some(Binding::Escape) => self.process_escape(key, host),
            // Hands control to Normal mode; nothing runs, so no CommandRan.
            Some(Binding::OneTimeCommand) => {
                debug!(target: "insert.dispatch", key = %key, "one_time_command");
                ProcessResult::SwitchModeOneTimeCommand
            }
            Some(Binding::WordCompletion { forward }) => self.start_word_completion(host, forward),
            Some(Binding::Command(command)) => self.run_command(key, command, host),
            None => match direct_insert_command(&key) {
                Some(command) => self.run_command(key, command, host),
                None => {
                    debug!(target: "insert.dispatch", key = %key, "not_handled");
                    ProcessResult::NotHandled
                }
            },
        }
    }

    pub fn on_enter<H: InsertHost>(&mut self, argument: ModeArgument, host: &mut H) {
        self.session = SessionData::new();
        self.argument = argument;
        if self.kind == InsertKind::Replace {
            host.set_overwrite(true);
        }
        debug!(target: "insert.session", mode = self.mode_kind().display_name(), ?argument, "enter");
    }

    pub fn on_leave<H: InsertHost>(&mut self, host: &mut H) {
        self.session.clear();
        self.dismiss_word_completion();
        if self.kind == InsertKind::Replace {
            host.set_overwrite(false);
        }
        self.argument = ModeArgument::None;
        debug!(target: "insert.session", mode = self.mode_kind().display_name(), "leave");
    }

    /// Host notification that the caret moved. A move made with the mouse
    /// ends the tracked text change; moves caused by edits leave it open.
    pub fn on_caret_moved<H: InsertHost>(&mut self, host: &mut H) {
        if host.is_left_button_pressed() && host.current_change().is_some() {
            host.complete_change();
            debug!(target: "insert.session", "mouse_move_completed_change");
        }
    }

    fn process_escape<H: InsertHost>(&mut self, key: KeyInput, host: &mut H) -> ProcessResult {
        if host.any_display_window_active() {
            host.dismiss_display_windows();
        }
        if host.is_in_virtual_space() {
            let real = host.caret();
            host.move_caret(real);
        } else {
            let command = InsertCommand::MoveCaret(Direction::Left);
            let result = self.runner.run_insert_command(host, &command);
            self.raise_command_ran(key, command, result);
        }
        self.session.clear();
        let target = match self.argument {
            ModeArgument::OneTimeCommandReturn(kind) => kind,
            ModeArgument::None => ModeKind::Normal,
        };
        debug!(target: "insert.dispatch", key = %key, target = target.display_name(), "escape");
        ProcessResult::SwitchMode(target)
    }

    fn run_command<H: InsertHost>(
        &mut self,
        key: KeyInput,
        command: InsertCommand,
        host: &mut H,
    ) -> ProcessResult {
        let result = self.runner.run_insert_command(host, &command);
        if let CommandResult::Completed(_) = result {
            self.session.record(command.clone());
        }
        trace!(target: "insert.dispatch", key = %key, command = ?command.tag(), error = result.is_error(), "run");
        self.raise_command_ran(key, command, result);
        result.into()
    }

    fn raise_command_ran(&self, key: KeyInput, command: InsertCommand, result: CommandResult) {
        if self.observers.is_empty() {
            return;
        }
        let event = CommandRan {
            key,
            command,
            result,
        };
        for observer in &self.observers {
            observer.on_command_ran(&event);
        }
    }

    fn start_word_completion<H: InsertHost>(&mut self, host: &mut H, forward: bool) -> ProcessResult {
        let text = host.text();
        let caret = host.offset_of(host.caret());
        let Some(span) = word_completion_span(&text, caret) else {
            debug!(target: "insert.completion", "no_word_before_caret");
            return ProcessResult::ProcessedAndHandledInput;
        };
        let words: Vec<String> = word_completions(&text, span).collect();
        if words.is_empty() {
            debug!(target: "insert.completion", "no_candidates");
            return ProcessResult::ProcessedAndHandledInput;
        }
        let Some(factory) = self.completion_factory.as_mut() else {
            return ProcessResult::ProcessedAndHandledInput;
        };
        let flags = if forward {
            CompletionFlags::FORWARD
        } else {
            CompletionFlags::empty()
        };
        let count = words.len();
        match factory.create_session(host, span, words, flags) {
            Some(session) if !session.is_dismissed() => {
                debug!(target: "insert.completion", candidates = count, forward, "session_started");
                self.attach_word_completion(session);
            }
            _ => debug!(target: "insert.completion", "session_not_created"),
        }
        ProcessResult::ProcessedAndHandledInput
    }

    fn attach_word_completion(&mut self, session: Rc<dyn WordCompletionSession>) {
        self.completion_generation += 1;
        let generation = self.completion_generation;
        let slot = Rc::downgrade(&self.completion);
        let subscription = session.subscribe_dismissed(Box::new(move || {
            let Some(slot) = slot.upgrade() else {
                return;
            };
            let mut slot = slot.borrow_mut();
            if slot.as_ref().is_some_and(|active| active.generation == generation) {
                *slot = None;
                debug!(target: "insert.completion", generation, "session_dismissed");
            }
        }));
        *self.completion.borrow_mut() = Some(ActiveCompletion {
            session,
            subscription,
            generation,
        });
    }

    /// Close the attached session, if any. The slot is emptied before the
    /// session is told, so its dismissal handler never sees a borrowed slot.
    fn dismiss_word_completion(&mut self) {
        let active = self.completion.borrow_mut().take();
        if let Some(active) = active {
            active.session.unsubscribe_dismissed(active.subscription);
            active.session.dismiss();
        }
    }
}

fn completion_navigation(key: &KeyInput) -> Option<bool> {
    if *key == KeyInput::named(KeyCode::Down) || *key == KeyInput::ctrl('n') {
        Some(true)
    } else if *key == KeyInput::named(KeyCode::Up) || *key == KeyInput::ctrl('p') {
        Some(false)
    } else {
        None
    }
}

fn direct_insert_command(key: &KeyInput) -> Option<InsertCommand> {
    if *key == KeyInput::named(KeyCode::Backspace) {
        return Some(InsertCommand::DeleteLeft);
    }
    if *key == KeyInput::named(KeyCode::Delete) {
        return Some(InsertCommand::DeleteRight);
    }
    if !key.is_printable() {
        return None;
    }
    key.char_value().map(InsertCommand::DirectInsert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::BufferCommandRunner;
    use core_config::InsertConfig;
    use core_events::KeyModifiers;
    use pretty_assertions::assert_eq;

    fn mode() -> InsertMode {
        InsertMode::new(
            InsertKind::Insert,
            Box::new(BufferCommandRunner::new(InsertConfig::default())),
        )
    }

    #[test]
    fn direct_insert_classification() {
        let m = mode();
        assert!(m.is_direct_insert(&KeyInput::char('a')));
        assert!(m.is_direct_insert(&KeyInput::new(KeyCode::Char('A'), KeyModifiers::SHIFT)));
        assert!(m.is_direct_insert(&KeyInput::named(KeyCode::Backspace)));
        assert!(m.is_direct_insert(&KeyInput::named(KeyCode::Delete)));
        assert!(!m.is_direct_insert(&KeyInput::named(KeyCode::Enter)));
        assert!(!m.is_direct_insert(&KeyInput::named(KeyCode::Tab)));
        assert!(!m.is_direct_insert(&KeyInput::alternate_enter()));
        assert!(!m.is_direct_insert(&KeyInput::ctrl('a')));
        assert!(!m.is_direct_insert(&KeyInput::char('\u{7}')));
    }

    #[test]
    fn completion_keys_bound_only_with_factory() {
        let plain = mode();
        assert!(!plain.can_process(&KeyInput::ctrl('n')));
        let with = mode().with_word_completion(Box::new(crate::completion::ListCompletionFactory::new()));
        assert!(with.can_process(&KeyInput::ctrl('n')));
        assert!(with.command_names().contains("<C-p>"));
    }

    #[test]
    fn mode_kind_follows_insert_kind() {
        assert_eq!(mode().mode_kind(), ModeKind::Insert);
        let replace = InsertMode::new(
            InsertKind::Replace,
            Box::new(BufferCommandRunner::new(InsertConfig::default())),
        );
        assert_eq!(replace.mode_kind(), ModeKind::Replace);
    }
}
