#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{
    BufferCommandRunner, CommandRan, CommandRanObserver, InsertKind, InsertMode,
    ListCompletionFactory, ProcessResult,
};
use core_config::InsertConfig;
use core_events::KeyInput;
use core_model::{EditorModel, TextView};
use core_state::ModeArgument;
use core_text::{Buffer, Position};
use std::cell::RefCell;
use std::rc::Rc;

pub fn model(text: &str, line: usize, byte: usize) -> EditorModel {
    let mut model = EditorModel::new(Buffer::from_str("test", text).unwrap());
    model.move_caret(Position::new(line, byte));
    model
}

pub fn mode(kind: InsertKind) -> InsertMode {
    InsertMode::new(
        kind,
        Box::new(BufferCommandRunner::new(InsertConfig::new(4, 8, false))),
    )
    .with_word_completion(Box::new(ListCompletionFactory::new()))
}

/// Insert mode already entered on `model`.
pub fn entered(kind: InsertKind, model: &mut EditorModel) -> InsertMode {
    let mut mode = mode(kind);
    mode.on_enter(ModeArgument::None, model);
    mode
}

pub fn key(notation: &str) -> KeyInput {
    core_input::parse_key(notation).unwrap()
}

/// Feed a key script; returns one result per key.
pub fn feed(mode: &mut InsertMode, model: &mut EditorModel, script: &str) -> Vec<ProcessResult> {
    core_input::parse_keys(script)
        .unwrap()
        .into_iter()
        .map(|key| mode.process(key, model))
        .collect()
}

/// Observer collecting every `CommandRan` event.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<CommandRan>>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<CommandRan> {
        self.events.borrow().clone()
    }
}

impl CommandRanObserver for Recorder {
    fn on_command_ran(&self, event: &CommandRan) {
        self.events.borrow_mut().push(event.clone());
    }
}

pub fn record(mode: &mut InsertMode) -> Recorder {
    let recorder = Recorder::default();
    mode.subscribe_command_ran(Box::new(recorder.clone()));
    recorder
}
