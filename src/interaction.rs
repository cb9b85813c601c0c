use tracing::debug;

use crate::annotation::{
    Annotation, AnnotationId, DragPart, NEW_DIMENSION_LABEL, PLACEHOLDER_VALUE,
};
use crate::geometry::{
    derive_dimension_line, point_in_circle, point_to_segment_distance, snap_to_angle, Point,
    DEFAULT_SNAP_STEP_DEGREES,
};
use crate::render::{label_box, DrawPreview, HANDLE_RADIUS};
use crate::state::EditorState;
use crate::store::Commit;

/// Line hit slop in screen pixels, independent of zoom.
pub const LINE_HIT_THRESHOLD: f32 = 6.0;

/// Points placed so far in the three-click construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawStep {
    AwaitStart,
    AwaitEnd { start: Point },
    AwaitOffset { start: Point, end: Point },
}

impl DrawStep {
    pub fn index(&self) -> usize {
        match self {
            Self::AwaitStart => 0,
            Self::AwaitEnd { .. } => 1,
            Self::AwaitOffset { .. } => 2,
        }
    }

    pub fn placed(&self) -> Vec<Point> {
        match *self {
            Self::AwaitStart => Vec::new(),
            Self::AwaitEnd { start } => vec![start],
            Self::AwaitOffset { start, end } => vec![start, end],
        }
    }

    pub fn instructions(&self) -> &'static str {
        match self {
            Self::AwaitStart => "Click the start of the edge to measure",
            Self::AwaitEnd { .. } => "Click the end of the edge (hold Shift to snap the angle)",
            Self::AwaitOffset { .. } => "Click where the dimension line should sit",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragState {
    pub id: AnnotationId,
    pub part: DragPart,
    pub start: Point,
    /// Annotation as it was when the pointer went down; every frame applies the full delta to it.
    pub original: Annotation,
    /// Whether this gesture already owns a history entry.
    pub committed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InlineEdit {
    pub id: AnnotationId,
    pub buffer: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Mode {
    #[default]
    Idle,
    Drawing(DrawStep),
    Dragging(DragState),
    InlineEditing(InlineEdit),
}

impl Mode {
    /// Keeps in-progress construction points on the same image features after a refit.
    /// Drags are ended since their start snapshot no longer matches the store.
    pub fn rescale_points(&mut self, sx: f32, sy: f32) {
        match self {
            Mode::Drawing(step) => {
                *step = match *step {
                    DrawStep::AwaitStart => DrawStep::AwaitStart,
                    DrawStep::AwaitEnd { start } => DrawStep::AwaitEnd {
                        start: start.scale_xy(sx, sy),
                    },
                    DrawStep::AwaitOffset { start, end } => DrawStep::AwaitOffset {
                        start: start.scale_xy(sx, sy),
                        end: end.scale_xy(sx, sy),
                    },
                };
            }
            Mode::Dragging(_) => *self = Mode::Idle,
            Mode::Idle | Mode::InlineEditing(_) => {}
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Angle snapping, bound to Shift.
    pub snap: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorKey {
    Escape,
    Enter,
    Delete,
    Backspace,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    pub id: AnnotationId,
    pub part: DragPart,
}

impl EditorState {
    pub fn is_drawing(&self) -> bool {
        matches!(self.mode, Mode::Drawing(_))
    }

    pub fn drawing_step(&self) -> Option<DrawStep> {
        match self.mode {
            Mode::Drawing(step) => Some(step),
            _ => None,
        }
    }

    pub fn inline_edit(&self) -> Option<&InlineEdit> {
        match &self.mode {
            Mode::InlineEditing(edit) => Some(edit),
            _ => None,
        }
    }

    pub fn inline_edit_mut(&mut self) -> Option<&mut InlineEdit> {
        match &mut self.mode {
            Mode::InlineEditing(edit) => Some(edit),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.mode, Mode::Dragging(_))
    }

    /// Enters draw mode (dropping the selection) or leaves it, discarding placed points.
    pub fn toggle_drawing(&mut self) {
        if self.is_drawing() {
            self.mode = Mode::Idle;
        } else {
            self.commit_inline_edit();
            self.selection = None;
            self.mode = Mode::Drawing(DrawStep::AwaitStart);
        }
        debug!(drawing = self.is_drawing(), "draw mode toggled");
        self.mark_dirty();
    }

    pub fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) {
        let pos = self.viewport.screen_to_canvas(screen);
        self.pointer = Some(pos);

        match self.mode.clone() {
            Mode::Drawing(step) => self.place_point(step, pos, modifiers),
            Mode::Dragging(_) => {}
            Mode::InlineEditing(_) => {
                self.commit_inline_edit();
                self.begin_drag_or_deselect(pos);
            }
            Mode::Idle => self.begin_drag_or_deselect(pos),
        }
        self.mark_dirty();
    }

    fn place_point(&mut self, step: DrawStep, pos: Point, modifiers: Modifiers) {
        match step {
            DrawStep::AwaitStart => {
                self.mode = Mode::Drawing(DrawStep::AwaitEnd { start: pos });
            }
            DrawStep::AwaitEnd { start } => {
                let end = if modifiers.snap {
                    snap_to_angle(pos, start, DEFAULT_SNAP_STEP_DEGREES)
                } else {
                    pos
                };
                self.mode = Mode::Drawing(DrawStep::AwaitOffset { start, end });
            }
            DrawStep::AwaitOffset { start, end } => {
                let line = derive_dimension_line(start, end, pos);
                let id = self.store.next_annotation_id();
                let mut annotation = Annotation::new(
                    id.clone(),
                    NEW_DIMENSION_LABEL,
                    PLACEHOLDER_VALUE,
                    line.p1,
                    line.p2,
                );
                annotation.label_pos = line.label_pos;
                annotation.ext1 = Some(start);
                annotation.ext2 = Some(end);
                self.store.add(annotation);

                self.selection = Some(id.clone());
                self.mode = Mode::InlineEditing(InlineEdit {
                    id,
                    buffer: String::new(),
                });
            }
        }
    }

    fn begin_drag_or_deselect(&mut self, pos: Point) {
        let Some(hit) = self.hit_test(pos) else {
            self.selection = None;
            return;
        };
        let Some(original) = self.store.get(&hit.id).cloned() else {
            return;
        };
        self.selection = Some(hit.id.clone());
        self.mode = Mode::Dragging(DragState {
            id: hit.id,
            part: hit.part,
            start: pos,
            original,
            committed: false,
        });
    }

    pub fn pointer_move(&mut self, screen: Point, modifiers: Modifiers) {
        let pos = self.viewport.screen_to_canvas(screen);

        match &mut self.mode {
            Mode::Dragging(drag) => {
                let delta = pos.sub(drag.start);
                let next = drag.original.dragged(drag.part, delta, modifiers.snap);
                let commit = if drag.committed {
                    Commit::Coalesce
                } else {
                    Commit::Step
                };
                if self.store.update(next, commit) {
                    drag.committed = true;
                }
                self.pointer = Some(pos);
                self.mark_dirty();
            }
            Mode::Drawing(DrawStep::AwaitEnd { start }) if modifiers.snap => {
                self.pointer = Some(snap_to_angle(pos, *start, DEFAULT_SNAP_STEP_DEGREES));
                self.mark_dirty();
            }
            Mode::Drawing(_) => {
                self.pointer = Some(pos);
                self.mark_dirty();
            }
            Mode::Idle | Mode::InlineEditing(_) => self.pointer = Some(pos),
        }
    }

    /// Ends a drag; the selection stays on the dragged annotation. A drag that ends where it
    /// started leaves no history entry behind.
    pub fn pointer_up(&mut self) {
        if !self.is_dragging() {
            return;
        }
        if let Mode::Dragging(drag) = std::mem::take(&mut self.mode) {
            if drag.committed && self.store.get(&drag.id) == Some(&drag.original) {
                self.store.discard_last_step();
            }
        }
        self.mark_dirty();
    }

    pub fn pointer_leave(&mut self) {
        self.pointer_up();
        if self.pointer.take().is_some() && self.is_drawing() {
            self.mark_dirty();
        }
    }

    /// Opens the inline editor when the pointer is on a visible label box. Returns whether an
    /// edit was started.
    pub fn double_click(&mut self, screen: Point) -> bool {
        if !self.style.show_label_box || self.is_drawing() {
            return false;
        }
        let pos = self.viewport.screen_to_canvas(screen);
        let Some(annotation) = self
            .store
            .annotations()
            .iter()
            .rev()
            .find(|annotation| label_box(annotation, &self.style, &self.fonts).contains(pos))
            .cloned()
        else {
            return false;
        };

        if self.inline_edit().is_some_and(|edit| edit.id != annotation.id) {
            self.commit_inline_edit();
        }
        self.selection = Some(annotation.id.clone());
        self.mode = Mode::InlineEditing(InlineEdit {
            id: annotation.id,
            buffer: annotation.value_text,
        });
        self.mark_dirty();
        true
    }

    /// Writes the edit buffer back as its own undo step. Blank input and unchanged text leave
    /// the annotation alone.
    pub fn commit_inline_edit(&mut self) {
        let Mode::InlineEditing(edit) = std::mem::take(&mut self.mode) else {
            return;
        };
        let value = edit.buffer.trim();
        if value.is_empty() {
            return;
        }
        if let Some(annotation) = self.store.get(&edit.id) {
            if annotation.value_text != value {
                let mut updated = annotation.clone();
                updated.value_text = value.to_string();
                self.store.update(updated, Commit::Step);
            }
        }
        self.mark_dirty();
    }

    pub fn cancel_inline_edit(&mut self) {
        if self.inline_edit().is_some() {
            self.mode = Mode::Idle;
            self.mark_dirty();
        }
    }

    /// Drops any in-flight gesture without touching the store.
    pub fn cancel_gesture(&mut self) {
        if self.mode != Mode::Idle {
            self.mode = Mode::Idle;
            self.mark_dirty();
        }
    }

    /// Returns whether the key was consumed. `text_focus` is true while a text field owns the
    /// keyboard.
    pub fn key_pressed(&mut self, key: EditorKey, text_focus: bool) -> bool {
        match key {
            EditorKey::Escape => match self.mode {
                Mode::Drawing(_) => {
                    self.mode = Mode::Idle;
                    self.mark_dirty();
                    true
                }
                Mode::InlineEditing(_) => {
                    self.cancel_inline_edit();
                    true
                }
                Mode::Idle | Mode::Dragging(_) => false,
            },
            EditorKey::Enter => {
                if self.inline_edit().is_some() {
                    self.commit_inline_edit();
                    true
                } else {
                    false
                }
            }
            EditorKey::Delete | EditorKey::Backspace => {
                if text_focus || self.inline_edit().is_some() {
                    return false;
                }
                self.delete_selected()
            }
        }
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection.take() else {
            return false;
        };
        let deleted = self.store.delete(&id);
        let references_deleted = match &self.mode {
            Mode::Dragging(drag) => drag.id == id,
            Mode::InlineEditing(edit) => edit.id == id,
            Mode::Idle | Mode::Drawing(_) => false,
        };
        if references_deleted {
            self.mode = Mode::Idle;
        }
        self.mark_dirty();
        deleted
    }

    /// Topmost annotation first; within one annotation p1, p2, label handle, then line body.
    pub fn hit_test(&self, pos: Point) -> Option<Hit> {
        let radius = self.viewport.screen_distance(HANDLE_RADIUS);
        let threshold = self.viewport.screen_distance(LINE_HIT_THRESHOLD);

        self.store.annotations().iter().rev().find_map(|annotation| {
            let part = if point_in_circle(pos, annotation.p1, radius) {
                DragPart::P1
            } else if point_in_circle(pos, annotation.p2, radius) {
                DragPart::P2
            } else if point_in_circle(pos, annotation.label_pos, radius) {
                DragPart::Label
            } else if annotation.has_length()
                && point_to_segment_distance(pos, annotation.p1, annotation.p2) <= threshold
            {
                DragPart::Line
            } else {
                return None;
            };
            Some(Hit {
                id: annotation.id.clone(),
                part,
            })
        })
    }

    pub fn undo(&mut self) -> bool {
        self.step_history(|store| store.undo())
    }

    pub fn redo(&mut self) -> bool {
        self.step_history(|store| store.redo())
    }

    fn step_history(
        &mut self,
        step: impl FnOnce(&mut crate::store::AnnotationStore) -> bool,
    ) -> bool {
        if !matches!(self.mode, Mode::Drawing(_)) {
            self.mode = Mode::Idle;
        }
        let moved = step(&mut self.store);
        if moved {
            if let Some(id) = self.selection.as_deref() {
                if !self.store.contains(id) {
                    self.selection = None;
                }
            }
            self.mark_dirty();
        }
        moved
    }

    /// Removes every annotation as one undoable step.
    pub fn clear_annotations(&mut self) {
        if self.store.is_empty() {
            return;
        }
        if !self.is_drawing() {
            self.mode = Mode::Idle;
        }
        self.selection = None;
        self.store.clear();
        self.mark_dirty();
    }

    pub fn drawing_preview(&self) -> Option<DrawPreview> {
        let step = self.drawing_step()?;
        Some(DrawPreview {
            placed: step.placed(),
            pointer: self.pointer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::editor_with_image;
    use crate::state::EditorState;
    use crate::transform::Size;

    const PLAIN: Modifiers = Modifiers { snap: false };
    const SNAP: Modifiers = Modifiers { snap: true };

    fn editor() -> EditorState {
        let mut state = editor_with_image(800, 600);
        state.set_container_size(Size::new(800.0, 600.0));
        state
    }

    fn click(state: &mut EditorState, x: f32, y: f32) {
        state.pointer_down(Point::new(x, y), PLAIN);
        state.pointer_up();
    }

    fn draw(
        state: &mut EditorState,
        c1: (f32, f32),
        c2: (f32, f32),
        c3: (f32, f32),
    ) -> AnnotationId {
        state.toggle_drawing();
        click(state, c1.0, c1.1);
        click(state, c2.0, c2.1);
        click(state, c3.0, c3.1);
        state.selection.clone().expect("new annotation is selected")
    }

    #[test]
    fn three_clicks_create_offset_dimension() {
        let mut state = editor();
        let id = draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));

        let annotation = state.store.get(&id).expect("annotation");
        assert_eq!(annotation.p1, Point::new(100.0, 150.0));
        assert_eq!(annotation.p2, Point::new(300.0, 150.0));
        assert_eq!(annotation.label_pos, Point::new(200.0, 150.0));
        assert_eq!(annotation.ext1, Some(Point::new(100.0, 100.0)));
        assert_eq!(annotation.ext2, Some(Point::new(300.0, 100.0)));
        assert_eq!(annotation.value_text, PLACEHOLDER_VALUE);
        assert_eq!(annotation.label, NEW_DIMENSION_LABEL);
        assert_eq!(state.inline_edit().map(|edit| edit.id.as_str()), Some(id.as_str()));
    }

    #[test]
    fn clicks_respect_zoom_and_origin() {
        let mut state = editor();
        state.viewport.origin = Point::new(50.0, 20.0);
        state.viewport.set_zoom(2.0);
        let id = draw(&mut state, (250.0, 220.0), (650.0, 220.0), (450.0, 320.0));

        let annotation = state.store.get(&id).expect("annotation");
        assert_eq!(annotation.p1, Point::new(100.0, 150.0));
        assert_eq!(annotation.p2, Point::new(300.0, 150.0));
    }

    #[test]
    fn escape_discards_points_without_creating() {
        let mut state = editor();
        state.toggle_drawing();
        click(&mut state, 10.0, 10.0);
        click(&mut state, 90.0, 10.0);
        assert_eq!(state.drawing_step().map(|step| step.index()), Some(2));

        assert!(state.key_pressed(EditorKey::Escape, false));
        assert_eq!(state.mode, Mode::Idle);
        assert!(state.store.is_empty());
        assert!(!state.store.can_undo());
    }

    #[test]
    fn toggling_draw_mode_clears_selection() {
        let mut state = editor();
        let id = draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        state.commit_inline_edit();
        state.selection = Some(id);

        state.toggle_drawing();
        assert!(state.is_drawing());
        assert_eq!(state.selection, None);

        state.toggle_drawing();
        assert_eq!(state.mode, Mode::Idle);
    }

    #[test]
    fn second_click_snaps_with_modifier() {
        let mut state = editor();
        state.toggle_drawing();
        click(&mut state, 100.0, 100.0);
        state.pointer_down(Point::new(200.0, 104.0), SNAP);

        let Some(DrawStep::AwaitOffset { end, .. }) = state.drawing_step() else {
            panic!("expected offset step");
        };
        assert!((end.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn later_annotation_wins_overlapping_hit() {
        let mut state = editor();
        let first = draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        state.commit_inline_edit();
        let second = draw(&mut state, (104.0, 150.0), (104.0, 300.0), (104.0, 300.0));
        state.commit_inline_edit();
        assert_ne!(first, second);

        let hit = state.hit_test(Point::new(102.0, 151.0)).expect("hit");
        assert_eq!(hit.id, second);
        assert_eq!(hit.part, DragPart::P1);
    }

    #[test]
    fn hit_priority_within_one_annotation() {
        let mut state = editor();
        let id = draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 100.0));
        state.commit_inline_edit();

        let at = |state: &EditorState, x, y| state.hit_test(Point::new(x, y)).map(|hit| hit.part);
        assert_eq!(at(&state, 103.0, 100.0), Some(DragPart::P1));
        assert_eq!(at(&state, 297.0, 100.0), Some(DragPart::P2));
        assert_eq!(at(&state, 200.0, 104.0), Some(DragPart::Label));
        assert_eq!(at(&state, 150.0, 105.0), Some(DragPart::Line));
        assert_eq!(at(&state, 150.0, 107.0), None);
        assert!(state.store.contains(&id));
    }

    #[test]
    fn hit_radius_shrinks_in_canvas_units_when_zoomed() {
        let mut state = editor();
        draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 100.0));
        state.commit_inline_edit();
        state.viewport.set_zoom(2.0);

        assert!(state.hit_test(Point::new(150.0, 102.5)).is_some());
        assert!(state.hit_test(Point::new(150.0, 104.0)).is_none());
    }

    #[test]
    fn drag_is_one_undo_step() {
        let mut state = editor();
        let id = draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        state.commit_inline_edit();
        let before = state.store.get(&id).cloned().expect("annotation");
        let history = state.store.history_len();

        state.pointer_down(Point::new(150.0, 150.0), PLAIN);
        for step in 1..=10 {
            state.pointer_move(Point::new(150.0 + step as f32, 150.0 + step as f32 * 2.0), PLAIN);
        }
        state.pointer_up();

        let after = state.store.get(&id).expect("annotation");
        assert_eq!(after.p1, Point::new(110.0, 170.0));
        assert_eq!(after.ext1, Some(Point::new(110.0, 120.0)));
        assert_eq!(state.store.history_len(), history + 1);
        assert_eq!(state.selection.as_deref(), Some(id.as_str()));

        assert!(state.undo());
        assert_eq!(state.store.get(&id), Some(&before));
    }

    #[test]
    fn drag_back_to_start_records_nothing() {
        let mut state = editor();
        let id = draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        state.commit_inline_edit();
        let before = state.store.get(&id).cloned().expect("annotation");
        let history = state.store.history_len();
        let could_undo = state.store.can_undo();

        state.pointer_down(Point::new(150.0, 150.0), PLAIN);
        state.pointer_move(Point::new(170.0, 160.0), PLAIN);
        state.pointer_move(Point::new(150.0, 150.0), PLAIN);
        state.pointer_up();

        assert_eq!(state.store.history_len(), history);
        assert_eq!(state.store.can_undo(), could_undo);
        assert_eq!(state.store.get(&id), Some(&before));
        assert!(!state.store.can_redo());
    }

    #[test]
    fn click_without_movement_records_nothing() {
        let mut state = editor();
        draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        state.commit_inline_edit();
        let history = state.store.history_len();

        state.pointer_down(Point::new(150.0, 150.0), PLAIN);
        state.pointer_move(Point::new(150.0, 150.0), PLAIN);
        state.pointer_up();

        assert_eq!(state.store.history_len(), history);
    }

    #[test]
    fn endpoint_drag_recenters_label() {
        let mut state = editor();
        let id = draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        state.commit_inline_edit();

        state.pointer_down(Point::new(300.0, 150.0), PLAIN);
        state.pointer_move(Point::new(320.0, 170.0), PLAIN);
        state.pointer_up();

        let annotation = state.store.get(&id).expect("annotation");
        assert_eq!(annotation.p1, Point::new(100.0, 150.0));
        assert_eq!(annotation.p2, Point::new(320.0, 170.0));
        assert_eq!(annotation.label_pos, Point::new(210.0, 160.0));
    }

    #[test]
    fn clicking_empty_space_deselects() {
        let mut state = editor();
        draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        state.commit_inline_edit();

        click(&mut state, 600.0, 500.0);
        assert_eq!(state.selection, None);
        assert_eq!(state.mode, Mode::Idle);
    }

    #[test]
    fn pointer_down_commits_pending_edit() {
        let mut state = editor();
        let id = draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        if let Some(edit) = state.inline_edit_mut() {
            edit.buffer = "34.5".to_string();
        }

        click(&mut state, 600.0, 500.0);
        assert_eq!(state.store.get(&id).map(|a| a.value_text.as_str()), Some("34.5"));
        assert_eq!(state.selection, None);
    }

    #[test]
    fn inline_edit_commit_is_its_own_step() {
        let mut state = editor();
        let id = draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        let history = state.store.history_len();

        if let Some(edit) = state.inline_edit_mut() {
            edit.buffer = " 12.25 ".to_string();
        }
        assert!(state.key_pressed(EditorKey::Enter, true));

        assert_eq!(state.store.get(&id).map(|a| a.value_text.as_str()), Some("12.25"));
        assert_eq!(state.store.history_len(), history + 1);
        assert_eq!(state.selection.as_deref(), Some(id.as_str()));

        assert!(state.undo());
        assert_eq!(state.store.get(&id).map(|a| a.value_text.as_str()), Some(PLACEHOLDER_VALUE));
    }

    #[test]
    fn blank_or_unchanged_edit_keeps_value() {
        let mut state = editor();
        let id = draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        let history = state.store.history_len();

        if let Some(edit) = state.inline_edit_mut() {
            edit.buffer = "   ".to_string();
        }
        state.commit_inline_edit();
        assert_eq!(state.store.get(&id).map(|a| a.value_text.as_str()), Some(PLACEHOLDER_VALUE));
        assert_eq!(state.store.history_len(), history);
    }

    #[test]
    fn escape_cancels_inline_edit() {
        let mut state = editor();
        let id = draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        if let Some(edit) = state.inline_edit_mut() {
            edit.buffer = "99".to_string();
        }

        assert!(state.key_pressed(EditorKey::Escape, true));
        assert_eq!(state.mode, Mode::Idle);
        assert_eq!(state.store.get(&id).map(|a| a.value_text.as_str()), Some(PLACEHOLDER_VALUE));
    }

    #[test]
    fn double_click_on_label_box_opens_editor() {
        let mut state = editor();
        let id = draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        state.commit_inline_edit();
        state.selection = None;

        // inside the box but outside the label handle radius
        assert!(state.double_click(Point::new(214.0, 160.0)));
        assert_eq!(state.selection.as_deref(), Some(id.as_str()));
        assert_eq!(
            state.inline_edit(),
            Some(&InlineEdit {
                id,
                buffer: PLACEHOLDER_VALUE.to_string()
            })
        );
    }

    #[test]
    fn double_click_ignored_when_label_box_hidden() {
        let mut state = editor();
        draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        state.commit_inline_edit();
        state.set_show_label_box(false);

        assert!(!state.double_click(Point::new(200.0, 150.0)));
        assert_eq!(state.mode, Mode::Idle);
    }

    #[test]
    fn deleting_selection_clears_it() {
        let mut state = editor();
        let id = draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        state.commit_inline_edit();

        assert!(!state.key_pressed(EditorKey::Delete, true));
        assert!(state.store.contains(&id));

        assert!(state.key_pressed(EditorKey::Backspace, false));
        assert!(!state.store.contains(&id));
        assert_eq!(state.selection, None);
    }

    #[test]
    fn undo_drops_selection_of_vanished_annotation() {
        let mut state = editor();
        draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        state.commit_inline_edit();

        assert!(state.undo());
        assert!(state.store.is_empty());
        assert_eq!(state.selection, None);
        assert!(state.redo());
        assert_eq!(state.store.len(), 1);
    }

    #[test]
    fn clear_is_one_undoable_step() {
        let mut state = editor();
        draw(&mut state, (100.0, 100.0), (300.0, 100.0), (200.0, 150.0));
        state.commit_inline_edit();
        draw(&mut state, (100.0, 300.0), (300.0, 300.0), (200.0, 350.0));
        state.commit_inline_edit();

        state.clear_annotations();
        assert!(state.store.is_empty());
        assert_eq!(state.selection, None);
        assert!(state.undo());
        assert_eq!(state.store.len(), 2);
    }

    #[test]
    fn preview_follows_pointer_while_drawing() {
        let mut state = editor();
        state.toggle_drawing();
        click(&mut state, 100.0, 100.0);
        state.pointer_move(Point::new(180.0, 130.0), PLAIN);

        let preview = state.drawing_preview().expect("preview");
        assert_eq!(preview.placed, vec![Point::new(100.0, 100.0)]);
        assert_eq!(preview.pointer, Some(Point::new(180.0, 130.0)));

        state.pointer_leave();
        assert_eq!(state.drawing_preview().and_then(|p| p.pointer), None);
    }

    #[test]
    fn resize_mid_draw_keeps_points_anchored() {
        let mut state = editor();
        state.toggle_drawing();
        click(&mut state, 100.0, 100.0);
        state.set_container_size(Size::new(400.0, 300.0));

        assert_eq!(
            state.drawing_step(),
            Some(DrawStep::AwaitEnd {
                start: Point::new(50.0, 50.0)
            })
        );
    }
}
