use tracing::trace;

/// Description of the text produced by an insert session, reduced so that a
/// run of typing followed by corrections collapses to its net effect.
///
/// Counts are in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextChange {
    Insert(String),
    DeleteLeft(usize),
    DeleteRight(usize),
    /// Parts that do not reduce into each other, in order. Never nested.
    Combination(Vec<TextChange>),
}

impl TextChange {
    /// Append `next` to this change, reducing where the pair has a simpler
    /// equivalent.
    pub fn merge(self, next: TextChange) -> TextChange {
        if let TextChange::Combination(parts) = next {
            return parts.into_iter().fold(self, TextChange::merge);
        }
        match self {
            TextChange::Combination(mut parts) => {
                match parts.pop() {
                    Some(tail) => match Self::reduce(tail, next) {
                        Ok(reduced) => parts.push(reduced),
                        Err((tail, next)) => {
                            parts.push(tail);
                            parts.push(next);
                        }
                    },
                    None => parts.push(next),
                }
                TextChange::Combination(parts)
            }
            left => match Self::reduce(left, next) {
                Ok(reduced) => reduced,
                Err((left, right)) => TextChange::Combination(vec![left, right]),
            },
        }
    }

    fn reduce(left: TextChange, right: TextChange) -> Result<TextChange, (TextChange, TextChange)> {
        match (left, right) {
            (TextChange::Insert(mut a), TextChange::Insert(b)) => {
                a.push_str(&b);
                Ok(TextChange::Insert(a))
            }
            (TextChange::Insert(mut a), TextChange::DeleteLeft(n)) => {
                let len = a.chars().count();
                if n <= len {
                    for _ in 0..n {
                        a.pop();
                    }
                    Ok(TextChange::Insert(a))
                } else {
                    Ok(TextChange::DeleteLeft(n - len))
                }
            }
            (TextChange::DeleteLeft(a), TextChange::DeleteLeft(b)) => {
                Ok(TextChange::DeleteLeft(a + b))
            }
            (TextChange::DeleteRight(a), TextChange::DeleteRight(b)) => {
                Ok(TextChange::DeleteRight(a + b))
            }
            (left, right) => Err((left, right)),
        }
    }

    /// Net inserted text when the change is a pure insertion.
    pub fn inserted_text(&self) -> Option<&str> {
        match self {
            TextChange::Insert(text) => Some(text),
            _ => None,
        }
    }
}

/// Tracks the change in flight for the current insert session.
#[derive(Debug, Default)]
pub struct TextChangeTracker {
    current: Option<TextChange>,
    last: Option<TextChange>,
    completed: u64,
}

impl TextChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an applied edit, merging it into the in-flight change.
    pub fn record(&mut self, change: TextChange) {
        let merged = match self.current.take() {
            Some(current) => current.merge(change),
            None => change,
        };
        trace!(target: "state.change", change = discriminant_name(&merged), "record");
        self.current = Some(merged);
    }

    pub fn current_change(&self) -> Option<&TextChange> {
        self.current.as_ref()
    }

    /// Last change finalized by `complete_change`.
    pub fn last_change(&self) -> Option<&TextChange> {
        self.last.as_ref()
    }

    pub fn completed_count(&self) -> u64 {
        self.completed
    }

    /// Finalize the in-flight change. No-op when nothing is tracked.
    pub fn complete_change(&mut self) {
        if let Some(change) = self.current.take() {
            self.completed += 1;
            trace!(target: "state.change", completed = self.completed, "complete_change");
            self.last = Some(change);
        }
    }
}

// Buffer text never reaches the log; only the shape of the change.
fn discriminant_name(change: &TextChange) -> &'static str {
    match change {
        TextChange::Insert(_) => "insert",
        TextChange::DeleteLeft(_) => "delete_left",
        TextChange::DeleteRight(_) => "delete_right",
        TextChange::Combination(..) => "combination",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn inserts_concatenate() {
        let change = TextChange::Insert("he".into()).merge(TextChange::Insert("llo".into()));
        assert_eq!(change, TextChange::Insert("hello".into()));
    }

    #[test]
    fn backspace_trims_typed_text() {
        let change = TextChange::Insert("helo".into()).merge(TextChange::DeleteLeft(2));
        assert_eq!(change, TextChange::Insert("he".into()));
    }

    #[test]
    fn backspace_past_insert_start_becomes_delete() {
        let change = TextChange::Insert("a".into()).merge(TextChange::DeleteLeft(3));
        assert_eq!(change, TextChange::DeleteLeft(2));
    }

    #[test]
    fn unrelated_changes_combine_and_tail_keeps_reducing() {
        let change = TextChange::DeleteRight(1)
            .merge(TextChange::Insert("x".into()))
            .merge(TextChange::Insert("y".into()));
        assert_eq!(
            change,
            TextChange::Combination(vec![
                TextChange::DeleteRight(1),
                TextChange::Insert("xy".into())
            ])
        );
    }

    #[test]
    fn long_overwrite_run_stays_flat() {
        let mut tracker = TextChangeTracker::new();
        for _ in 0..100_000 {
            tracker.record(TextChange::DeleteRight(1));
            tracker.record(TextChange::Insert("x".into()));
        }
        let Some(TextChange::Combination(parts)) = tracker.current_change() else {
            panic!("expected a combination");
        };
        assert_eq!(parts.len(), 200_000);
        assert!(parts.iter().all(|p| !matches!(p, TextChange::Combination(_))));
        tracker.complete_change();
        assert_eq!(tracker.completed_count(), 1);
    }

    #[test]
    fn merging_a_combination_appends_its_parts() {
        let change = TextChange::Insert("a".into()).merge(TextChange::Combination(vec![
            TextChange::Insert("b".into()),
            TextChange::DeleteRight(1),
        ]));
        assert_eq!(
            change,
            TextChange::Combination(vec![
                TextChange::Insert("ab".into()),
                TextChange::DeleteRight(1)
            ])
        );
    }

    #[test]
    fn tracker_completes_and_remembers_last() {
        let mut tracker = TextChangeTracker::new();
        tracker.complete_change();
        assert_eq!(tracker.completed_count(), 0);

        tracker.record(TextChange::Insert("a".into()));
        tracker.record(TextChange::Insert("b".into()));
        assert_eq!(tracker.current_change(), Some(&TextChange::Insert("ab".into())));

        tracker.complete_change();
        assert!(tracker.current_change().is_none());
        assert_eq!(tracker.last_change(), Some(&TextChange::Insert("ab".into())));
        assert_eq!(tracker.completed_count(), 1);
    }
}
