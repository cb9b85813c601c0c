use tracing::debug;

use crate::annotation::{Annotation, AnnotationId};
use crate::history::UndoHistory;

/// How a mutation lands in the history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Commit {
    /// Append a new undo step.
    Step,
    /// Replace the current step in place. Used for the frames of one drag and for rescales.
    Coalesce,
}

/// Ordered annotation collection; later entries draw on top. The collection itself is the
/// current history snapshot, so undo/redo never diverge from what is displayed.
#[derive(Clone, Debug)]
pub struct AnnotationStore {
    history: UndoHistory<Vec<Annotation>>,
    next_id: u64,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self {
            history: UndoHistory::new(Vec::new()),
            next_id: 1,
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.history.current()
    }

    pub fn len(&self) -> usize {
        self.annotations().len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.annotations().iter().find(|annotation| annotation.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Ids come from a counter that only grows, so undo never brings an id back into play.
    pub fn next_annotation_id(&mut self) -> AnnotationId {
        let id = format!("ann-{}", self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn add(&mut self, annotation: Annotation) {
        debug!(id = %annotation.id, "add annotation");
        let mut next = self.annotations().to_vec();
        next.push(annotation);
        self.history.push_snapshot(next);
    }

    /// Replaces the annotation with the same id. Returns `false` (and records nothing) when the
    /// id is unknown or the content is unchanged.
    pub fn update(&mut self, annotation: Annotation, commit: Commit) -> bool {
        let Some(index) = self
            .annotations()
            .iter()
            .position(|item| item.id == annotation.id)
        else {
            return false;
        };
        if self.annotations()[index] == annotation {
            return false;
        }

        let mut next = self.annotations().to_vec();
        next[index] = annotation;
        self.apply(next, commit);
        true
    }

    pub fn delete(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        debug!(id, "delete annotation");
        let next = self
            .annotations()
            .iter()
            .filter(|annotation| annotation.id != id)
            .cloned()
            .collect();
        self.history.push_snapshot(next);
        true
    }

    pub fn clear(&mut self) {
        self.history.push_snapshot(Vec::new());
    }

    /// Swaps in a whole new collection as one undo step.
    pub fn replace_all(&mut self, annotations: Vec<Annotation>) {
        self.history.push_snapshot(annotations);
    }

    /// Per-axis rescale of every point, folded into the current history entry.
    pub fn rescale(&mut self, sx: f32, sy: f32) {
        if self.is_empty() {
            return;
        }
        let next = self
            .annotations()
            .iter()
            .map(|annotation| {
                let mut scaled = annotation.clone();
                scaled.scale_points(sx, sy);
                scaled
            })
            .collect();
        self.history.overwrite_current(next);
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo().is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo().is_some()
    }

    /// Drops the newest undo step without making it redoable. Used when a gesture turns out to
    /// have changed nothing.
    pub fn discard_last_step(&mut self) -> bool {
        self.history.discard_current()
    }

    /// Forgets the collection and its history. Ids keep counting up.
    pub fn reset(&mut self) {
        self.history.clear_with(Vec::new());
    }

    fn apply(&mut self, next: Vec<Annotation>, commit: Commit) {
        match commit {
            Commit::Step => self.history.push_snapshot(next),
            Commit::Coalesce => self.history.overwrite_current(next),
        }
    }
}
