//! Board state and the store that mutates it.
//!
//! All changes to the board go through [`Action`]s. [`BoardState::reduce`] is
//! a pure function of the old state and the action payload, so any sequence
//! of actions can be replayed deterministically.

use crate::elements::{Element, ElementId, ElementPatch, ElementTrait};
use crate::tools::ToolKind;
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// A named transition of the board state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Action {
    /// Append a fully-formed element. Shows the panel.
    AddElement(Element),
    /// Remove an element. Clears the selection and hides the panel when the
    /// removed element was selected.
    DeleteElement { id: ElementId },
    /// Merge field changes into an element.
    UpdateElement { id: ElementId, patch: ElementPatch },
    /// Select an element by id, or clear the selection.
    SelectElement(Option<ElementId>),
    /// Switch the active tool.
    SetTool(ToolKind),
    /// A drag gesture took over. Hides the panel.
    StartDrag,
    /// The drag gesture ended. Shows the panel if something is selected.
    StopDrag,
    /// Remove every element.
    ClearBoard,
    /// Size reported by the layout of an auto-sized element.
    MeasureContent { id: ElementId, size: Size },
    /// Copy an element under `new_id`, shifted by `offset`, and select it.
    DuplicateElement {
        id: ElementId,
        new_id: ElementId,
        offset: Vec2,
    },
}

impl Action {
    /// Build a duplicate action with a freshly generated id.
    pub fn duplicate(element: &Element, offset: Vec2) -> Self {
        Action::DuplicateElement {
            id: element.id().clone(),
            new_id: ElementId::generate(element.kind().id_prefix()),
            offset,
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddElement(_) => "add_element",
            Action::DeleteElement { .. } => "delete_element",
            Action::UpdateElement { .. } => "update_element",
            Action::SelectElement(_) => "select_element",
            Action::SetTool(_) => "set_tool",
            Action::StartDrag => "start_drag",
            Action::StopDrag => "stop_drag",
            Action::ClearBoard => "clear_board",
            Action::MeasureContent { .. } => "measure_content",
            Action::DuplicateElement { .. } => "duplicate_element",
        }
    }
}

/// Snapshot of everything the editor shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    /// Elements back to front.
    elements: Vec<Element>,
    /// Copy of the selected element, kept equal to its list entry.
    selected: Option<Element>,
    tool: ToolKind,
    dragging: bool,
    panel_open: bool,
}

impl BoardState {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements in z-order (back to front).
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|element| element.id() == id)
    }

    pub fn selected(&self) -> Option<&Element> {
        self.selected.as_ref()
    }

    pub fn selected_id(&self) -> Option<&ElementId> {
        self.selected.as_ref().map(|element| element.id())
    }

    pub fn is_selected(&self, id: &ElementId) -> bool {
        self.selected_id() == Some(id)
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Topmost element under a canvas point.
    pub fn element_at(&self, point: Point) -> Option<&Element> {
        self.elements.iter().rev().find(|element| element.hit_test(point))
    }

    fn index_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|element| element.id() == id)
    }

    /// Re-copy the selection from the list if it points at `id`.
    fn refresh_selection(&mut self, id: &ElementId) {
        if self.is_selected(id) {
            self.selected = self.get(id).cloned();
        }
    }

    /// Apply an action, producing the next state.
    pub fn reduce(mut self, action: Action) -> Self {
        match action {
            Action::AddElement(element) => {
                if self.index_of(element.id()).is_some() {
                    log::debug!("Ignoring add of duplicate element id {}", element.id());
                    return self;
                }
                self.elements.push(element);
                self.panel_open = true;
            }
            Action::DeleteElement { id } => {
                let Some(index) = self.index_of(&id) else {
                    log::debug!("Ignoring delete of unknown element {}", id);
                    return self;
                };
                self.elements.remove(index);
                if self.is_selected(&id) {
                    self.selected = None;
                    self.panel_open = false;
                }
            }
            Action::UpdateElement { id, patch } => {
                let Some(index) = self.index_of(&id) else {
                    log::debug!("Ignoring update of unknown element {}", id);
                    return self;
                };
                self.elements[index].apply_patch(&patch);
                self.refresh_selection(&id);
            }
            Action::MeasureContent { id, size } => {
                let Some(index) = self.index_of(&id) else {
                    log::debug!("Ignoring measurement of unknown element {}", id);
                    return self;
                };
                if self.elements[index].measure_content(size) {
                    self.refresh_selection(&id);
                }
            }
            Action::SelectElement(id) => {
                self.selected = id.and_then(|id| {
                    let element = self.get(&id).cloned();
                    if element.is_none() {
                        log::debug!("Cannot select unknown element {}", id);
                    }
                    element
                });
            }
            Action::SetTool(tool) => {
                self.tool = tool;
            }
            Action::StartDrag => {
                self.dragging = true;
                self.panel_open = false;
            }
            Action::StopDrag => {
                self.dragging = false;
                self.panel_open = self.selected.is_some();
            }
            Action::ClearBoard => {
                self.elements.clear();
                self.selected = None;
                self.panel_open = false;
            }
            Action::DuplicateElement { id, new_id, offset } => {
                if self.index_of(&new_id).is_some() {
                    log::debug!("Ignoring duplicate into existing id {}", new_id);
                    return self;
                }
                let Some(source) = self.get(&id) else {
                    log::debug!("Ignoring duplicate of unknown element {}", id);
                    return self;
                };
                let copy = source.duplicate(new_id, offset);
                self.selected = Some(copy.clone());
                self.elements.push(copy);
                self.panel_open = true;
            }
        }
        self
    }
}

/// Entry point for anything that mutates the board.
pub trait Dispatch {
    /// Apply an action.
    fn dispatch(&mut self, action: Action);

    /// Current state after the last dispatched action.
    fn state(&self) -> &BoardState;
}

/// Caller-owned container for one editing session's board state.
#[derive(Debug, Clone, Default)]
pub struct BoardStore {
    state: BoardState,
}

impl BoardStore {
    /// Create a store with an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store starting from an existing state.
    pub fn with_state(state: BoardState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Apply an action to the board.
    pub fn dispatch(&mut self, action: Action) {
        log::debug!("Dispatching {}", action.name());
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action);
    }

    /// End the session and keep the final state.
    pub fn into_state(self) -> BoardState {
        self.state
    }
}

impl Dispatch for BoardStore {
    fn dispatch(&mut self, action: Action) {
        BoardStore::dispatch(self, action);
    }

    fn state(&self) -> &BoardState {
        BoardStore::state(self)
    }
}
