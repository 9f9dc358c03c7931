mod common;

use common::{entered, feed, model};
use core_actions::{CommandHistory, InsertKind};
use std::rc::Rc;

#[test]
fn history_tracks_last_repeatable_run_across_escape() {
    let mut m = model("", 0, 0);
    let mut mode = entered(InsertKind::Insert, &mut m);
    let history = Rc::new(CommandHistory::new());
    mode.subscribe_command_ran(Box::new(history.clone()));

    feed(&mut mode, &mut m, "hello<Esc>");
    assert_eq!(
        history.last_repeatable().and_then(|c| c.inserted_text()),
        Some("hello".to_string())
    );
    // Five inserts plus the Escape caret motion.
    assert_eq!(history.len(), 6);
}

#[test]
fn every_observer_sees_each_command() {
    let mut m = model("", 0, 0);
    let mut mode = entered(InsertKind::Insert, &mut m);
    let first = common::record(&mut mode);
    let second = common::record(&mut mode);
    feed(&mut mode, &mut m, "a<BS><BS>");
    assert_eq!(first.events().len(), 3);
    assert_eq!(first.events(), second.events());
}
