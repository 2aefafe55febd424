//! The interactive canvas: routes input events to the store and the gesture
//! disambiguator.

use crate::board::{Action, BoardState, BoardStore};
use crate::config::EditorConfig;
use crate::elements::{
    Element, ElementId, ElementKind, ElementPatch, ElementTrait, ImageElement, ImageSource,
    ImageSourceError, TextElement,
};
use crate::fields::GeometryField;
use crate::gesture::{GestureDisambiguator, GestureOutcome, Subscription};
use crate::input::{Instant, InputEvent, KeyEvent};
use crate::shortcuts::{Command, ShortcutRegistry};
use crate::tools::ToolKind;
use kurbo::{Point, Size};
use serde::Serialize;

/// What the canvas did with an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum Response {
    Handled,
    /// The event did not apply in the current state.
    Ignored,
    /// The image tool was clicked; the host should acquire an image and
    /// answer with [`InputEvent::ImageResolved`].
    AcquireImage { at: Point },
    /// A press on an element was released.
    Gesture { outcome: GestureOutcome },
    /// A new element was created and selected.
    ElementCreated { id: ElementId },
    ImagePlaced { id: ElementId },
    ImageRejected { error: ImageSourceError },
}

/// Editor runtime for one board.
#[derive(Debug)]
pub struct Canvas {
    store: BoardStore,
    gestures: GestureDisambiguator,
    /// Listeners of the gesture in flight.
    subscription: Option<Subscription>,
    config: EditorConfig,
    /// Current canvas area in pixels.
    canvas_size: Size,
    /// Where the image tool was clicked, awaiting a resolved source.
    pending_image: Option<Point>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Canvas {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_store(config, BoardStore::new())
    }

    /// Resume editing an existing board.
    pub fn with_store(config: EditorConfig, store: BoardStore) -> Self {
        Self {
            store,
            gestures: GestureDisambiguator::new(config.gesture),
            subscription: None,
            canvas_size: config.canvas,
            config,
            pending_image: None,
        }
    }

    pub fn state(&self) -> &BoardState {
        self.store.state()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    pub fn pending_image(&self) -> Option<Point> {
        self.pending_image
    }

    /// CSS cursor for the active tool.
    pub fn cursor(&self) -> &'static str {
        self.state().tool().cursor()
    }

    /// When the host should deliver the next [`InputEvent::Tick`].
    pub fn next_deadline(&self) -> Option<Instant> {
        self.gestures.next_deadline()
    }

    pub fn into_state(self) -> BoardState {
        self.store.into_state()
    }

    /// Route one input event.
    pub fn handle_event(&mut self, event: InputEvent, now: Instant) -> Response {
        match event {
            InputEvent::ElementDown { id, position } => self.element_down(&id, position, now),
            InputEvent::PointerMove { position } => self.pointer_move(position, now),
            InputEvent::PointerUp { .. } => self.pointer_up(now),
            InputEvent::CanvasClick { position } => self.canvas_click(position),
            InputEvent::Tick => self.tick(now),
            InputEvent::SelectTool { tool } => self.set_tool(tool),
            InputEvent::ClearBoard => self.clear(),
            InputEvent::Key(key) => self.key(&key),
            InputEvent::Resize { size } => self.resize(size),
            InputEvent::Edit { id, patch } => self.edit(id, patch),
            InputEvent::ContentMeasured { id, size } => self.content_measured(id, size),
            InputEvent::ImageResolved { reference } => self.place_image(&reference),
            InputEvent::Unmount => self.unmount(),
        }
    }

    /// Pointer pressed on an element (any tool).
    pub fn element_down(&mut self, id: &ElementId, position: Point, now: Instant) -> Response {
        self.end_gesture();
        let Some(element) = self.store.state().get(id).cloned() else {
            log::debug!("Press on unknown element {}", id);
            return Response::Ignored;
        };
        let subscription = self
            .gestures
            .begin(&mut self.store, &element, position, self.canvas_size, now);
        self.subscription = Some(subscription);
        Response::Handled
    }

    pub fn pointer_move(&mut self, position: Point, now: Instant) -> Response {
        let Some(subscription) = &self.subscription else {
            return Response::Ignored;
        };
        self.gestures
            .pointer_move(subscription, &mut self.store, position, now);
        Response::Handled
    }

    pub fn pointer_up(&mut self, now: Instant) -> Response {
        let Some(subscription) = self.subscription.take() else {
            return Response::Ignored;
        };
        let outcome = self.gestures.pointer_up(subscription, &mut self.store, now);
        Response::Gesture { outcome }
    }

    /// The host's timer fired.
    pub fn tick(&mut self, now: Instant) -> Response {
        if self.gestures.tick(&mut self.store, now) {
            Response::Handled
        } else {
            Response::Ignored
        }
    }

    /// Click on empty canvas.
    pub fn canvas_click(&mut self, position: Point) -> Response {
        if self.store.state().is_dragging() || self.gestures.is_dragging() {
            log::debug!("Ignoring canvas click during drag");
            return Response::Ignored;
        }
        match self.store.state().tool() {
            ToolKind::Text => {
                let id = ElementId::generate(ElementKind::Text.id_prefix());
                let text = TextElement::from_defaults(id.clone(), position, &self.config.text_defaults);
                log::info!("Placing text {} at ({}, {})", id, position.x, position.y);
                self.insert(text.into());
                Response::ElementCreated { id }
            }
            ToolKind::Image => {
                self.pending_image = Some(position);
                Response::AcquireImage { at: position }
            }
            ToolKind::Select => {
                self.store.dispatch(Action::SelectElement(None));
                Response::Handled
            }
        }
    }

    /// Place an image from a reference resolved by the host.
    ///
    /// The image lands where the image tool was last clicked, or at the
    /// origin when there was no click.
    pub fn place_image(&mut self, reference: &str) -> Response {
        let source = match ImageSource::from_reference(reference) {
            Ok(source) => source,
            Err(error) => {
                log::warn!("Rejected image reference: {}", error);
                return Response::ImageRejected { error };
            }
        };
        let position = self.pending_image.take().unwrap_or(Point::ZERO);
        let id = ElementId::generate(ElementKind::Image.id_prefix());
        log::info!("Placing image {} at ({}, {})", id, position.x, position.y);
        let image = ImageElement::new(id.clone(), position, source, self.config.image_defaults.size);
        self.insert(image.into());
        Response::ImagePlaced { id }
    }

    /// Add, select and return to the select tool.
    fn insert(&mut self, element: Element) {
        let id = element.id().clone();
        self.store.dispatch(Action::AddElement(element));
        self.store.dispatch(Action::SelectElement(Some(id)));
        self.store.dispatch(Action::SetTool(ToolKind::Select));
    }

    pub fn set_tool(&mut self, tool: ToolKind) -> Response {
        if tool != ToolKind::Image {
            self.pending_image = None;
        }
        self.store.dispatch(Action::SetTool(tool));
        Response::Handled
    }

    pub fn clear(&mut self) -> Response {
        self.end_gesture();
        self.pending_image = None;
        log::info!("Clearing board ({} elements)", self.store.state().len());
        self.store.dispatch(Action::ClearBoard);
        Response::Handled
    }

    /// Keyboard shortcuts acting on the selection.
    pub fn key(&mut self, event: &KeyEvent) -> Response {
        let Some(command) = ShortcutRegistry::lookup(event) else {
            return Response::Ignored;
        };
        let Some(selected) = self.store.state().selected().cloned() else {
            return Response::Ignored;
        };
        match command {
            Command::DeleteSelected => {
                self.store.dispatch(Action::DeleteElement {
                    id: selected.id().clone(),
                });
                Response::Handled
            }
            Command::DuplicateSelected => {
                let action = Action::duplicate(&selected, self.config.duplicate_offset());
                let Action::DuplicateElement { new_id, .. } = &action else {
                    return Response::Ignored;
                };
                let id = new_id.clone();
                self.store.dispatch(action);
                Response::ElementCreated { id }
            }
            Command::ClearSelection => {
                self.store.dispatch(Action::SelectElement(None));
                Response::Handled
            }
        }
    }

    pub fn resize(&mut self, size: Size) -> Response {
        if !(size.width > 0.0 && size.height > 0.0) {
            log::warn!("Ignoring canvas resize to {}x{}", size.width, size.height);
            return Response::Ignored;
        }
        self.canvas_size = size;
        Response::Handled
    }

    /// Property-panel edit of any element field.
    pub fn edit(&mut self, id: ElementId, patch: ElementPatch) -> Response {
        if patch.is_empty() || self.store.state().get(&id).is_none() {
            return Response::Ignored;
        }
        self.store.dispatch(Action::UpdateElement { id, patch });
        Response::Handled
    }

    /// Position/size edit of the selected element, kept inside the canvas.
    pub fn edit_geometry(&mut self, field: GeometryField, value: f64) -> Response {
        let Some(selected) = self.store.state().selected() else {
            return Response::Ignored;
        };
        if field.is_size() && selected.is_auto_sized() {
            log::debug!("Size of {} follows its content", selected.id());
            return Response::Ignored;
        }
        let value = field.clamp(value, selected.frame(), self.canvas_size, self.config.min_panel_size);
        let id = selected.id().clone();
        self.store.dispatch(Action::UpdateElement {
            id,
            patch: field.patch(value),
        });
        Response::Handled
    }

    pub fn content_measured(&mut self, id: ElementId, size: Size) -> Response {
        match self.store.state().get(&id) {
            Some(element) if element.is_auto_sized() => {
                self.store.dispatch(Action::MeasureContent { id, size });
                Response::Handled
            }
            _ => Response::Ignored,
        }
    }

    /// The surface is going away: drop listeners and stop any drag.
    pub fn unmount(&mut self) -> Response {
        self.end_gesture();
        self.pending_image = None;
        Response::Handled
    }

    fn end_gesture(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.gestures.cancel(subscription, &mut self.store);
        }
    }
}
