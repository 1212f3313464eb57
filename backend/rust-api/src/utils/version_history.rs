use std::collections::VecDeque;

pub const DEFAULT_MAX_HISTORY: usize = 5;

/// Bounded undo/redo stack.
///
/// `present` is the current state; at most `max_entries` older states are
/// kept, the oldest being dropped first. Pushing a new state clears redo.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionHistory<T> {
    past: VecDeque<T>,
    present: Option<T>,
    future: Vec<T>,
    max_entries: usize,
}

impl<T: Clone> VersionHistory<T> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(max_entries),
            present: None,
            future: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Rebuilds a history from persisted parts, enforcing the bound.
    pub fn from_parts(past: Vec<T>, present: Option<T>, future: Vec<T>, max_entries: usize) -> Self {
        let mut history = Self::new(max_entries);
        let skip = past.len().saturating_sub(history.max_entries);
        history.past = past.into_iter().skip(skip).collect();
        history.present = present;
        history.future = future;
        history.future.truncate(history.max_entries);
        history
    }

    pub fn push(&mut self, state: T) {
        if let Some(previous) = self.present.take() {
            if self.past.len() == self.max_entries {
                self.past.pop_front();
            }
            self.past.push_back(previous);
        }
        self.present = Some(state);
        self.future.clear();
    }

    pub fn undo(&mut self) -> Option<&T> {
        let previous = self.past.pop_back()?;
        if let Some(current) = self.present.replace(previous) {
            self.future.push(current);
        }
        self.present.as_ref()
    }

    pub fn redo(&mut self) -> Option<&T> {
        let next = self.future.pop()?;
        if let Some(current) = self.present.replace(next) {
            if self.past.len() == self.max_entries {
                self.past.pop_front();
            }
            self.past.push_back(current);
        }
        self.present.as_ref()
    }

    pub fn current(&self) -> Option<&T> {
        self.present.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    pub fn into_parts(self) -> (Vec<T>, Option<T>, Vec<T>) {
        (self.past.into_iter().collect(), self.present, self.future)
    }

    pub fn parts(&self) -> (Vec<T>, Option<T>, Vec<T>) {
        self.clone().into_parts()
    }
}

impl<T: Clone> Default for VersionHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}
