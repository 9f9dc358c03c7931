//! Insert / Replace mode core.
//!
//! * `insert_mode::InsertMode` dispatches keys to commands, tracks the edit
//!   run of the current activation and owns the word completion slot.
//! * `runner` executes `InsertCommand`s against an `InsertHost`.
//! * `completion` computes completion spans/candidates and defines the session
//!   seam.
//! * `history` carries the `CommandRan` notification.

pub mod command;
pub mod completion;
pub mod history;
pub mod insert_mode;
pub mod result;
pub mod runner;
pub mod session;

pub use command::{CommandTag, Direction, InsertCommand};
pub use completion::{
    CompletionFlags, DismissHandler, ListCompletionFactory, ListCompletionSession, SubscriptionId,
    WordCompletionSession, WordCompletionSessionFactory, WordCompletions, word_completion_span,
    word_completions,
};
pub use history::{CommandHistory, CommandRan, CommandRanObserver};
pub use insert_mode::{InsertKind, InsertMode};
pub use result::{CommandError, CommandResult, ModeSwitch, ProcessResult};
pub use runner::{BufferCommandRunner, InsertCommandRunner};
pub use session::SessionData;
