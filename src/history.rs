/// Snapshot history: every entry is a full copy of the tracked value.
#[derive(Clone, Debug)]
pub struct UndoHistory<T: Clone> {
    stack: Vec<T>,
    cursor: usize,
}

impl<T: Clone> UndoHistory<T> {
    pub fn new(initial: T) -> Self {
        Self {
            stack: vec![initial],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &T {
        &self.stack[self.cursor]
    }

    /// Drops any redo branch and appends `value` as the new current entry.
    pub fn push_snapshot(&mut self, value: T) {
        if self.cursor + 1 < self.stack.len() {
            self.stack.truncate(self.cursor + 1);
        }
        self.stack.push(value);
        self.cursor = self.stack.len().saturating_sub(1);
    }

    /// Replaces the current entry in place. The redo branch is left alone.
    pub fn overwrite_current(&mut self, value: T) {
        self.stack[self.cursor] = value;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.stack.len()
    }

    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.stack[self.cursor])
    }

    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.stack[self.cursor])
    }

    /// Removes the current entry along with any redo branch and steps back to the previous one.
    pub fn discard_current(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.stack.truncate(self.cursor);
        self.cursor -= 1;
        true
    }

    pub fn clear_with(&mut self, value: T) {
        self.stack.clear();
        self.stack.push(value);
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::UndoHistory;

    #[test]
    fn undo_redo_flow() {
        let mut history = UndoHistory::new(vec![1]);
        history.push_snapshot(vec![1, 2]);
        history.push_snapshot(vec![1, 2, 3]);

        assert_eq!(history.undo(), Some(&vec![1, 2]));
        assert_eq!(history.undo(), Some(&vec![1]));
        assert_eq!(history.undo(), None);

        assert_eq!(history.redo(), Some(&vec![1, 2]));
        history.push_snapshot(vec![9]);
        assert_eq!(history.redo(), None);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn overwrite_replaces_current_without_new_entry() {
        let mut history = UndoHistory::new(0);
        history.push_snapshot(1);
        history.overwrite_current(2);
        history.overwrite_current(3);

        assert_eq!(history.len(), 2);
        assert_eq!(*history.current(), 3);
        assert_eq!(history.undo(), Some(&0));
        assert_eq!(history.redo(), Some(&3));
    }

    #[test]
    fn overwrite_keeps_redo_branch() {
        let mut history = UndoHistory::new("a");
        history.push_snapshot("b");
        history.undo();
        history.overwrite_current("a2");

        assert!(history.can_redo());
        assert_eq!(history.redo(), Some(&"b"));
    }

    #[test]
    fn discard_current_drops_entry_and_redo_branch() {
        let mut history = UndoHistory::new(1);
        history.push_snapshot(2);
        history.push_snapshot(3);
        history.undo();

        assert!(history.discard_current());
        assert_eq!(*history.current(), 1);
        assert_eq!(history.len(), 1);
        assert!(!history.can_redo());
        assert!(!history.discard_current());
    }

    #[test]
    fn clear_with_resets_cursor() {
        let mut history = UndoHistory::new(1);
        history.push_snapshot(2);
        history.clear_with(7);

        assert_eq!(history.cursor(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(*history.current(), 7);
    }
}
