//! Click-versus-drag disambiguation for pointer presses on elements.
//!
//! A press becomes a drag once the pointer travels more than
//! [`GestureConfig::movement_threshold`] on either axis, or once the press has
//! lasted [`GestureConfig::drag_threshold`]. A release before either happens
//! is a click and only selects the element.
//!
//! The host owns the clock. Every entry point takes `now`, and the armed
//! timer is a deadline that the host wakes the disambiguator up for via
//! [`GestureDisambiguator::tick`] (see [`GestureDisambiguator::next_deadline`]).
//! An expired deadline is also honoured lazily by the next move or release,
//! so events are always processed as if the timer had fired on time.

use crate::board::{Action, Dispatch};
use crate::elements::{Element, ElementId, ElementPatch, ElementTrait};
use crate::input::Instant;
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default press duration after which a press becomes a drag.
pub const DEFAULT_DRAG_THRESHOLD_MS: u64 = 150;
/// Default pointer travel (per axis) after which a press becomes a drag.
pub const DEFAULT_MOVEMENT_THRESHOLD: f64 = 5.0;

/// Thresholds separating a click from a drag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Press duration in milliseconds.
    pub drag_threshold_ms: u64,
    /// Pointer travel in pixels, compared per axis.
    pub movement_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold_ms: DEFAULT_DRAG_THRESHOLD_MS,
            movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
        }
    }
}

impl GestureConfig {
    pub fn drag_threshold(&self) -> Duration {
        Duration::from_millis(self.drag_threshold_ms)
    }
}

/// Handle for the document-level listeners of one gesture.
///
/// Returned by [`GestureDisambiguator::begin`]. Every exit path must hand it
/// back through [`GestureDisambiguator::pointer_up`] or
/// [`GestureDisambiguator::cancel`]. Events delivered through a handle whose
/// gesture was already torn down are ignored.
#[must_use = "a gesture must be ended with pointer_up or cancel"]
#[derive(Debug, PartialEq, Eq)]
pub struct Subscription {
    token: u64,
}

impl Subscription {
    pub fn token(&self) -> u64 {
        self.token
    }
}

/// Where an in-flight gesture stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    /// Pressed, not yet classified.
    Pending,
    /// Confirmed drag; moves reposition the element.
    Dragging,
}

/// How a gesture ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureOutcome {
    /// Released before the drag threshold; the element was selected.
    Click(ElementId),
    /// Released after dragging the element to `position`.
    Drag { id: ElementId, position: Point },
    /// The handle was stale; nothing happened.
    Ignored,
}

#[derive(Debug, Clone)]
struct ActiveGesture {
    token: u64,
    element_id: ElementId,
    /// Element size at press time.
    element_size: Size,
    /// Canvas size at press time; later resizes do not reclamp.
    canvas: Size,
    /// Pointer position at press time.
    origin: Point,
    /// Pointer position relative to the element's top-left corner.
    grab_offset: Vec2,
    /// Pending timer; `None` once fired or cancelled.
    deadline: Option<Instant>,
    phase: GesturePhase,
    /// Last position written to the store.
    position: Point,
}

impl ActiveGesture {
    /// Confirm the drag: select the element if needed, then start the drag.
    fn confirm<D: Dispatch + ?Sized>(&mut self, store: &mut D) {
        self.deadline = None;
        self.phase = GesturePhase::Dragging;
        log::debug!("Gesture {} on {} confirmed as drag", self.token, self.element_id);
        if !store.state().is_selected(&self.element_id) {
            store.dispatch(Action::SelectElement(Some(self.element_id.clone())));
        }
        store.dispatch(Action::StartDrag);
    }

    fn fire_if_expired<D: Dispatch + ?Sized>(&mut self, store: &mut D, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline && self.phase == GesturePhase::Pending => {
                self.confirm(store);
                true
            }
            _ => false,
        }
    }

    fn exceeds_movement(&self, pointer: Point, threshold: f64) -> bool {
        let delta = pointer - self.origin;
        delta.x.abs() > threshold || delta.y.abs() > threshold
    }
}

/// Keep an element of `size` fully inside `canvas`.
///
/// When the element is larger than the canvas the lower bound wins and the
/// element is pinned to 0 on that axis.
pub fn clamp_to_canvas(position: Point, size: Size, canvas: Size) -> Point {
    Point::new(
        position.x.min(canvas.width - size.width).max(0.0),
        position.y.min(canvas.height - size.height).max(0.0),
    )
}

/// Turns raw pointer presses on elements into clicks or drags.
///
/// At most one gesture is in flight; beginning a new one tears the previous
/// one down first.
#[derive(Debug, Clone, Default)]
pub struct GestureDisambiguator {
    config: GestureConfig,
    active: Option<ActiveGesture>,
    next_token: u64,
}

impl GestureDisambiguator {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            active: None,
            next_token: 0,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Whether a gesture is in flight.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn phase(&self) -> Option<GesturePhase> {
        self.active.as_ref().map(|gesture| gesture.phase)
    }

    /// Whether the in-flight gesture is a confirmed drag.
    pub fn is_dragging(&self) -> bool {
        self.phase() == Some(GesturePhase::Dragging)
    }

    /// When the host should call [`Self::tick`] next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.as_ref().and_then(|gesture| gesture.deadline)
    }

    /// Start a gesture for a press on `element` at `pointer`.
    ///
    /// Any gesture still in flight is torn down first.
    pub fn begin<D: Dispatch + ?Sized>(
        &mut self,
        store: &mut D,
        element: &Element,
        pointer: Point,
        canvas: Size,
        now: Instant,
    ) -> Subscription {
        self.teardown(store);

        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);
        let position = element.position();
        log::debug!("Gesture {} armed on {}", token, element.id());
        self.active = Some(ActiveGesture {
            token,
            element_id: element.id().clone(),
            element_size: element.size(),
            canvas,
            origin: pointer,
            grab_offset: pointer - position,
            deadline: Some(now + self.config.drag_threshold()),
            phase: GesturePhase::Pending,
            position,
        });
        Subscription { token }
    }

    /// Fire the drag timer if it has expired.
    ///
    /// Returns `true` if this call confirmed a drag.
    pub fn tick<D: Dispatch + ?Sized>(&mut self, store: &mut D, now: Instant) -> bool {
        match self.active.as_mut() {
            Some(gesture) => gesture.fire_if_expired(store, now),
            None => false,
        }
    }

    /// Handle a document-level pointer move.
    pub fn pointer_move<D: Dispatch + ?Sized>(
        &mut self,
        subscription: &Subscription,
        store: &mut D,
        pointer: Point,
        now: Instant,
    ) {
        let threshold = self.config.movement_threshold;
        let Some(gesture) = self.gesture_for(subscription) else {
            log::debug!("Ignoring move for stale gesture {}", subscription.token);
            return;
        };

        gesture.fire_if_expired(store, now);
        if gesture.phase == GesturePhase::Pending && gesture.exceeds_movement(pointer, threshold) {
            gesture.confirm(store);
        }
        if gesture.phase != GesturePhase::Dragging {
            return;
        }

        let position = clamp_to_canvas(pointer - gesture.grab_offset, gesture.element_size, gesture.canvas);
        log::trace!("Dragging {} to ({}, {})", gesture.element_id, position.x, position.y);
        gesture.position = position;
        store.dispatch(Action::UpdateElement {
            id: gesture.element_id.clone(),
            patch: ElementPatch::position(position),
        });
    }

    /// Handle the document-level pointer release that ends the gesture.
    pub fn pointer_up<D: Dispatch + ?Sized>(
        &mut self,
        subscription: Subscription,
        store: &mut D,
        now: Instant,
    ) -> GestureOutcome {
        if self.gesture_for(&subscription).is_none() {
            log::debug!("Ignoring release for stale gesture {}", subscription.token);
            return GestureOutcome::Ignored;
        }
        let Some(mut gesture) = self.active.take() else {
            return GestureOutcome::Ignored;
        };

        gesture.fire_if_expired(store, now);
        let outcome = match gesture.phase {
            GesturePhase::Pending => {
                log::debug!("Gesture {} on {} ended as click", gesture.token, gesture.element_id);
                GestureOutcome::Click(gesture.element_id.clone())
            }
            GesturePhase::Dragging => {
                log::debug!("Gesture {} on {} ended drag", gesture.token, gesture.element_id);
                store.dispatch(Action::StopDrag);
                GestureOutcome::Drag {
                    id: gesture.element_id.clone(),
                    position: gesture.position,
                }
            }
        };
        store.dispatch(Action::SelectElement(Some(gesture.element_id)));
        outcome
    }

    /// Abandon the gesture behind `subscription` without selecting anything.
    ///
    /// A confirmed drag is stopped so the board does not stay in drag mode.
    pub fn cancel<D: Dispatch + ?Sized>(&mut self, subscription: Subscription, store: &mut D) {
        if self.gesture_for(&subscription).is_some() {
            self.teardown(store);
        } else {
            log::debug!("Ignoring cancel for stale gesture {}", subscription.token);
        }
    }

    /// Tear down whatever gesture is in flight (e.g. when the surface unmounts).
    pub fn teardown<D: Dispatch + ?Sized>(&mut self, store: &mut D) {
        let Some(gesture) = self.active.take() else {
            return;
        };
        log::debug!("Gesture {} on {} torn down", gesture.token, gesture.element_id);
        if gesture.phase == GesturePhase::Dragging {
            store.dispatch(Action::StopDrag);
        }
    }

    fn gesture_for(&mut self, subscription: &Subscription) -> Option<&mut ActiveGesture> {
        self.active
            .as_mut()
            .filter(|gesture| gesture.token == subscription.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardState, BoardStore};
    use crate::elements::{ImageElement, ImageSource};

    /// Store wrapper that remembers every dispatched action.
    #[derive(Default)]
    struct Recorder {
        store: BoardStore,
        actions: Vec<Action>,
    }

    impl Dispatch for Recorder {
        fn dispatch(&mut self, action: Action) {
            self.actions.push(action.clone());
            self.store.dispatch(action);
        }

        fn state(&self) -> &BoardState {
            self.store.state()
        }
    }

    impl Recorder {
        fn names(&self) -> Vec<&'static str> {
            self.actions.iter().map(Action::name).collect()
        }
    }

    fn default_canvas() -> Size {
        Size::new(1000.0, 700.0)
    }

    fn setup(x: f64, y: f64, width: f64, height: f64) -> (Recorder, Element) {
        let source = ImageSource::from_reference("https://example.com/a.png").unwrap();
        let element = Element::Image(ImageElement::new(
            ElementId::from("a"),
            Point::new(x, y),
            source,
            Size::new(width, height),
        ));
        let mut recorder = Recorder::default();
        recorder.store.dispatch(Action::AddElement(element.clone()));
        (recorder, element)
    }

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    #[test]
    fn test_quick_release_is_click() {
        let (mut rec, element) = setup(100.0, 100.0, 200.0, 50.0);
        let mut gestures = GestureDisambiguator::default();
        let t0 = Instant::now();

        let sub = gestures.begin(&mut rec, &element, Point::new(110.0, 110.0), default_canvas(), t0);
        gestures.pointer_move(&sub, &mut rec, Point::new(113.0, 108.0), ms(t0, 20));
        let outcome = gestures.pointer_up(sub, &mut rec, ms(t0, 60));

        assert_eq!(outcome, GestureOutcome::Click(ElementId::from("a")));
        assert_eq!(rec.names(), vec!["select_element"]);
        assert_eq!(rec.state().selected_id(), Some(&ElementId::from("a")));
        assert_eq!(rec.state().get(&ElementId::from("a")).unwrap().position(), Point::new(100.0, 100.0));
        assert!(!gestures.is_active());
    }

    #[test]
    fn test_movement_confirms_drag_before_timer() {
        let (mut rec, element) = setup(100.0, 100.0, 200.0, 50.0);
        let mut gestures = GestureDisambiguator::default();
        let t0 = Instant::now();

        let sub = gestures.begin(&mut rec, &element, Point::new(110.0, 110.0), default_canvas(), t0);
        gestures.pointer_move(&sub, &mut rec, Point::new(120.0, 110.0), ms(t0, 10));

        assert_eq!(gestures.phase(), Some(GesturePhase::Dragging));
        assert_eq!(gestures.next_deadline(), None);
        assert_eq!(rec.names(), vec!["select_element", "start_drag", "update_element"]);
        assert!(rec.state().is_dragging());
        // Grab offset is preserved: the element follows the pointer by (+10, 0).
        assert_eq!(rec.state().get(&ElementId::from("a")).unwrap().position(), Point::new(110.0, 100.0));

        let outcome = gestures.pointer_up(sub, &mut rec, ms(t0, 40));
        assert_eq!(
            outcome,
            GestureOutcome::Drag {
                id: ElementId::from("a"),
                position: Point::new(110.0, 100.0),
            }
        );
        assert_eq!(&rec.names()[3..], &["stop_drag", "select_element"]);
        assert!(!rec.state().is_dragging());
        assert!(rec.state().is_panel_open());
    }

    #[test]
    fn test_timer_confirms_drag() {
        let (mut rec, element) = setup(0.0, 0.0, 100.0, 100.0);
        let mut gestures = GestureDisambiguator::default();
        let t0 = Instant::now();

        let sub = gestures.begin(&mut rec, &element, Point::new(50.0, 50.0), default_canvas(), t0);
        assert_eq!(gestures.next_deadline(), Some(ms(t0, 150)));
        assert!(!gestures.tick(&mut rec, ms(t0, 149)));
        assert!(gestures.tick(&mut rec, ms(t0, 150)));
        assert!(!gestures.tick(&mut rec, ms(t0, 300)));
        assert_eq!(rec.names(), vec!["select_element", "start_drag"]);
        assert!(!rec.state().is_panel_open());

        // Small moves now reposition the element.
        gestures.pointer_move(&sub, &mut rec, Point::new(52.0, 51.0), ms(t0, 200));
        assert_eq!(rec.state().get(&ElementId::from("a")).unwrap().position(), Point::new(2.0, 1.0));

        let outcome = gestures.pointer_up(sub, &mut rec, ms(t0, 250));
        assert!(matches!(outcome, GestureOutcome::Drag { .. }));
        assert_eq!(rec.names().last(), Some(&"select_element"));
    }

    #[test]
    fn test_expired_timer_honoured_on_release() {
        let (mut rec, element) = setup(0.0, 0.0, 100.0, 100.0);
        let mut gestures = GestureDisambiguator::default();
        let t0 = Instant::now();

        let sub = gestures.begin(&mut rec, &element, Point::new(10.0, 10.0), default_canvas(), t0);
        // Host never ticked; the release arrives after the deadline.
        let outcome = gestures.pointer_up(sub, &mut rec, ms(t0, 400));
        assert!(matches!(outcome, GestureOutcome::Drag { .. }));
        assert_eq!(rec.names(), vec!["select_element", "start_drag", "stop_drag", "select_element"]);
    }

    #[test]
    fn test_already_selected_element_is_not_reselected_on_confirm() {
        let (mut rec, element) = setup(0.0, 0.0, 100.0, 100.0);
        rec.store.dispatch(Action::SelectElement(Some(ElementId::from("a"))));
        let mut gestures = GestureDisambiguator::default();
        let t0 = Instant::now();

        let sub = gestures.begin(&mut rec, &element, Point::new(10.0, 10.0), default_canvas(), t0);
        gestures.pointer_move(&sub, &mut rec, Point::new(10.0, 30.0), ms(t0, 5));
        assert_eq!(rec.names(), vec!["start_drag", "update_element"]);
        gestures.cancel(sub, &mut rec);
    }

    #[test]
    fn test_drag_start_precedes_position_updates() {
        let (mut rec, element) = setup(300.0, 300.0, 50.0, 50.0);
        let mut gestures = GestureDisambiguator::default();
        let t0 = Instant::now();

        let sub = gestures.begin(&mut rec, &element, Point::new(310.0, 310.0), default_canvas(), t0);
        for step in 1..=10u64 {
            let p = Point::new(310.0 + step as f64 * 7.0, 310.0 - step as f64 * 3.0);
            gestures.pointer_move(&sub, &mut rec, p, ms(t0, step * 5));
        }
        let _ = gestures.pointer_up(sub, &mut rec, ms(t0, 80));

        let names = rec.names();
        let start = names.iter().position(|n| *n == "start_drag").unwrap();
        let first_update = names.iter().position(|n| *n == "update_element").unwrap();
        assert!(start < first_update);
        assert_eq!(names.iter().filter(|n| **n == "start_drag").count(), 1);
        assert_eq!(names.iter().filter(|n| **n == "stop_drag").count(), 1);
    }

    #[test]
    fn test_drag_clamps_to_right_edge() {
        let (mut rec, element) = setup(900.0, 100.0, 200.0, 50.0);
        let mut gestures = GestureDisambiguator::default();
        let canvas = Size::new(1000.0, 700.0);
        let t0 = Instant::now();

        let sub = gestures.begin(&mut rec, &element, Point::new(910.0, 110.0), canvas, t0);
        for (i, x) in [950.0, 1100.0, 1500.0, 4000.0].into_iter().enumerate() {
            gestures.pointer_move(&sub, &mut rec, Point::new(x, 110.0), ms(t0, 10 * (i as u64 + 1)));
            let position = rec.state().get(&ElementId::from("a")).unwrap().position();
            assert!(position.x <= 800.0);
            assert!(position.x >= 0.0);
        }
        let outcome = gestures.pointer_up(sub, &mut rec, ms(t0, 100));
        let GestureOutcome::Drag { position, .. } = outcome else {
            panic!("expected a drag");
        };
        assert!((position.x - 800.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clamp_bounds() {
        let canvas = Size::new(1000.0, 700.0);
        let size = Size::new(200.0, 50.0);
        assert_eq!(clamp_to_canvas(Point::new(-20.0, -5.0), size, canvas), Point::new(0.0, 0.0));
        assert_eq!(clamp_to_canvas(Point::new(850.0, 690.0), size, canvas), Point::new(800.0, 650.0));
        assert_eq!(clamp_to_canvas(Point::new(400.0, 300.0), size, canvas), Point::new(400.0, 300.0));
        // Element wider than the canvas is pinned to the left edge.
        assert_eq!(
            clamp_to_canvas(Point::new(30.0, 10.0), Size::new(1200.0, 50.0), canvas),
            Point::new(0.0, 10.0)
        );
    }

    #[test]
    fn test_new_press_tears_down_previous_gesture() {
        let (mut rec, element) = setup(0.0, 0.0, 100.0, 100.0);
        let source = ImageSource::from_reference("https://example.com/b.png").unwrap();
        let other = Element::Image(ImageElement::new(
            ElementId::from("b"),
            Point::new(400.0, 400.0),
            source,
            Size::new(100.0, 100.0),
        ));
        rec.store.dispatch(Action::AddElement(other.clone()));
        let mut gestures = GestureDisambiguator::default();
        let t0 = Instant::now();

        let first = gestures.begin(&mut rec, &element, Point::new(10.0, 10.0), default_canvas(), t0);
        gestures.pointer_move(&first, &mut rec, Point::new(40.0, 10.0), ms(t0, 5));
        assert!(rec.state().is_dragging());

        let second = gestures.begin(&mut rec, &other, Point::new(410.0, 410.0), default_canvas(), ms(t0, 10));
        // The confirmed drag of the first gesture was stopped.
        assert!(!rec.state().is_dragging());
        assert_eq!(gestures.phase(), Some(GesturePhase::Pending));
        assert_eq!(gestures.next_deadline(), Some(ms(t0, 160)));

        // Late events through the old handle do nothing.
        let before = rec.actions.len();
        gestures.pointer_move(&first, &mut rec, Point::new(90.0, 90.0), ms(t0, 12));
        assert_eq!(gestures.pointer_up(first, &mut rec, ms(t0, 13)), GestureOutcome::Ignored);
        assert_eq!(rec.actions.len(), before);
        assert!(gestures.is_active());

        let outcome = gestures.pointer_up(second, &mut rec, ms(t0, 20));
        assert_eq!(outcome, GestureOutcome::Click(ElementId::from("b")));
    }

    #[test]
    fn test_teardown_cancels_pending_timer() {
        let (mut rec, element) = setup(0.0, 0.0, 100.0, 100.0);
        let mut gestures = GestureDisambiguator::default();
        let t0 = Instant::now();

        let sub = gestures.begin(&mut rec, &element, Point::new(10.0, 10.0), default_canvas(), t0);
        gestures.teardown(&mut rec);
        assert!(!gestures.tick(&mut rec, ms(t0, 500)));
        assert!(rec.actions.is_empty());
        gestures.cancel(sub, &mut rec);
        assert!(rec.actions.is_empty());
    }

    #[test]
    fn test_zero_thresholds_make_every_press_a_drag() {
        let (mut rec, element) = setup(0.0, 0.0, 100.0, 100.0);
        let mut gestures = GestureDisambiguator::new(GestureConfig {
            drag_threshold_ms: 0,
            movement_threshold: 0.0,
        });
        let t0 = Instant::now();
        let sub = gestures.begin(&mut rec, &element, Point::new(10.0, 10.0), default_canvas(), t0);
        assert!(matches!(gestures.pointer_up(sub, &mut rec, t0), GestureOutcome::Drag { .. }));
    }

    #[test]
    fn test_canvas_resize_does_not_reclamp() {
        let (mut rec, element) = setup(700.0, 0.0, 200.0, 50.0);
        let mut gestures = GestureDisambiguator::default();
        let t0 = Instant::now();

        let sub = gestures.begin(&mut rec, &element, Point::new(710.0, 10.0), default_canvas(), t0);
        gestures.pointer_move(&sub, &mut rec, Point::new(790.0, 10.0), ms(t0, 5));
        let placed = rec.state().get(&ElementId::from("a")).unwrap().position();
        assert_eq!(placed, Point::new(780.0, 0.0));
        // The disambiguator keeps the press-time canvas; nothing reclamps the
        // element even if the host's canvas has shrunk since.
        let _ = gestures.pointer_up(sub, &mut rec, ms(t0, 10));
        assert_eq!(rec.state().get(&ElementId::from("a")).unwrap().position(), placed);
    }
}
