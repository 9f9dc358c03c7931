//! Word completion sessions.
//!
//! A session is created by a `WordCompletionSessionFactory` when `<C-n>` or
//! `<C-p>` fires with a word before the caret. Sessions are shared through
//! `Rc` and use interior mutability: the host may dismiss one at any time
//! (focus loss, its own UI), and the insert dispatcher learns about that
//! through `subscribe_dismissed`.
//!
//! `ListCompletionSession` is the in-process implementation used by the
//! replay binary and tests: it writes the selected candidate straight into
//! the buffer over the anchor span.

mod words;

pub use words::{WordCompletions, word_completion_span, word_completions};

use bitflags::bitflags;
use core_model::{TextSpan, TextView};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::trace;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CompletionFlags: u8 {
        /// Started with `<C-n>`: select the first candidate. Without it the
        /// last candidate is selected first.
        const FORWARD = 0b0000_0001;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type DismissHandler = Box<dyn FnMut()>;

pub trait WordCompletionSession {
    /// Buffer span currently holding the completed word.
    fn span(&self) -> TextSpan;
    fn selected_word(&self) -> Option<String>;
    /// Select the next candidate (wrapping). Returns false once dismissed.
    fn move_next(&self, view: &mut dyn TextView) -> bool;
    fn move_previous(&self, view: &mut dyn TextView) -> bool;
    /// Close the session. Handlers run once; later calls do nothing.
    fn dismiss(&self);
    fn is_dismissed(&self) -> bool;
    fn subscribe_dismissed(&self, handler: DismissHandler) -> SubscriptionId;
    fn unsubscribe_dismissed(&self, id: SubscriptionId);
}

pub trait WordCompletionSessionFactory {
    /// Open a session over `span` offering `words`. `None` when no session
    /// could be shown.
    fn create_session(
        &mut self,
        view: &mut dyn TextView,
        span: TextSpan,
        words: Vec<String>,
        flags: CompletionFlags,
    ) -> Option<Rc<dyn WordCompletionSession>>;
}

#[derive(Debug)]
struct ListState {
    words: Vec<String>,
    selected: usize,
    span: TextSpan,
}

/// Session cycling through a fixed candidate list.
pub struct ListCompletionSession {
    state: RefCell<ListState>,
    dismissed: Cell<bool>,
    handlers: RefCell<Vec<(SubscriptionId, DismissHandler)>>,
    next_subscription: Cell<u64>,
}

impl ListCompletionSession {
    /// Select the initial candidate and write it over `span`. `None` when
    /// `words` is empty.
    pub fn start(
        view: &mut dyn TextView,
        span: TextSpan,
        words: Vec<String>,
        flags: CompletionFlags,
    ) -> Option<Rc<Self>> {
        let selected = if flags.contains(CompletionFlags::FORWARD) {
            0
        } else {
            words.len().checked_sub(1)?
        };
        let word = words.get(selected)?;
        let span = write_word(view, span, word);
        Some(Rc::new(Self {
            state: RefCell::new(ListState {
                words,
                selected,
                span,
            }),
            dismissed: Cell::new(false),
            handlers: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
        }))
    }

    pub fn candidates(&self) -> Vec<String> {
        self.state.borrow().words.clone()
    }

    fn select(&self, view: &mut dyn TextView, forward: bool) -> bool {
        if self.dismissed.get() {
            return false;
        }
        let mut state = self.state.borrow_mut();
        let count = state.words.len();
        state.selected = if forward {
            (state.selected + 1) % count
        } else {
            (state.selected + count - 1) % count
        };
        let word = state.words[state.selected].clone();
        state.span = write_word(view, state.span, &word);
        trace!(target: "insert.completion", selected = state.selected, count, "select");
        true
    }
}

fn write_word(view: &mut dyn TextView, span: TextSpan, word: &str) -> TextSpan {
    let span = view.replace_text(span, word);
    let end = view.position_of(span.end);
    view.move_caret(end);
    span
}

impl WordCompletionSession for ListCompletionSession {
    fn span(&self) -> TextSpan {
        self.state.borrow().span
    }

    fn selected_word(&self) -> Option<String> {
        let state = self.state.borrow();
        state.words.get(state.selected).cloned()
    }

    fn move_next(&self, view: &mut dyn TextView) -> bool {
        self.select(view, true)
    }

    fn move_previous(&self, view: &mut dyn TextView) -> bool {
        self.select(view, false)
    }

    fn dismiss(&self) {
        if self.dismissed.replace(true) {
            return;
        }
        // Handlers may unsubscribe while running; run them detached.
        let mut handlers = self.handlers.take();
        for (_, handler) in handlers.iter_mut() {
            handler();
        }
    }

    fn is_dismissed(&self) -> bool {
        self.dismissed.get()
    }

    fn subscribe_dismissed(&self, handler: DismissHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    fn unsubscribe_dismissed(&self, id: SubscriptionId) {
        self.handlers.borrow_mut().retain(|(sub, _)| *sub != id);
    }
}

/// Factory producing `ListCompletionSession`s.
#[derive(Debug, Default)]
pub struct ListCompletionFactory {
    created: usize,
}

impl ListCompletionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.created
    }
}

impl WordCompletionSessionFactory for ListCompletionFactory {
    fn create_session(
        &mut self,
        view: &mut dyn TextView,
        span: TextSpan,
        words: Vec<String>,
        flags: CompletionFlags,
    ) -> Option<Rc<dyn WordCompletionSession>> {
        let session: Rc<dyn WordCompletionSession> =
            ListCompletionSession::start(view, span, words, flags)?;
        self.created += 1;
        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::EditorModel;
    use core_text::{Buffer, Position};
    use pretty_assertions::assert_eq;

    fn model(text: &str, byte: usize) -> EditorModel {
        let mut m = EditorModel::new(Buffer::from_str("t", text).unwrap());
        m.move_caret(Position::new(0, byte));
        m
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn forward_session_writes_first_candidate_and_cycles() {
        let mut m = model("ca cat cow", 2);
        let session = ListCompletionSession::start(
            &mut m,
            TextSpan::new(0, 2),
            words(&["cat", "cow"]),
            CompletionFlags::FORWARD,
        )
        .unwrap();
        assert_eq!(m.text(), "cat cat cow");
        assert_eq!(m.caret(), Position::new(0, 3));

        assert!(session.move_next(&mut m));
        assert_eq!(m.text(), "cow cat cow");
        assert!(session.move_next(&mut m));
        assert_eq!(session.selected_word().as_deref(), Some("cat"));
        assert!(session.move_previous(&mut m));
        assert_eq!(m.text(), "cow cat cow");
        assert_eq!(session.span(), TextSpan::new(0, 3));
    }

    #[test]
    fn backward_session_starts_with_last_candidate() {
        let mut m = model("ca cat cow", 2);
        let session = ListCompletionSession::start(
            &mut m,
            TextSpan::new(0, 2),
            words(&["cat", "cow"]),
            CompletionFlags::empty(),
        )
        .unwrap();
        assert_eq!(session.selected_word().as_deref(), Some("cow"));
    }

    #[test]
    fn empty_candidate_list_opens_nothing() {
        let mut m = model("x", 1);
        let mut factory = ListCompletionFactory::new();
        let session =
            factory.create_session(&mut m, TextSpan::new(0, 1), Vec::new(), CompletionFlags::FORWARD);
        assert!(session.is_none());
        assert_eq!(factory.created(), 0);
        assert_eq!(m.text(), "x");
    }

    #[test]
    fn dismiss_fires_handlers_once_and_respects_unsubscribe() {
        let mut m = model("ab abc", 2);
        let session = ListCompletionSession::start(
            &mut m,
            TextSpan::new(0, 2),
            words(&["abc"]),
            CompletionFlags::FORWARD,
        )
        .unwrap();
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        session.subscribe_dismissed(Box::new(move || counter.set(counter.get() + 1)));
        let stale = Rc::new(Cell::new(0));
        let stale_counter = stale.clone();
        let skipped =
            session.subscribe_dismissed(Box::new(move || stale_counter.set(stale_counter.get() + 1)));
        session.unsubscribe_dismissed(skipped);

        session.dismiss();
        session.dismiss();
        assert!(session.is_dismissed());
        assert_eq!(fired.get(), 1);
        assert_eq!(stale.get(), 0);
        assert!(!session.move_next(&mut m));
    }
}
