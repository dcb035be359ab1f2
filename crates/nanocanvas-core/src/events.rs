//! Outbound editor events for the host UI.

use crate::generation::{GenerationMode, ModelId};
use crate::selection::SelectedProperties;
use crate::shapes::ObjectId;
use crate::tools::ToolKind;
use serde::Serialize;

/// Events the editor emits, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    SelectionChanged(SelectedProperties),
    ToolChanged { tool: ToolKind },
    /// Screen coordinates of the secondary click.
    ContextMenuRequested { x: f64, y: f64, has_selection: bool },
    /// Transient menus and popups should close.
    PopupsClosed,
    PromptPopupRequested { x: f64, y: f64, prompt: String },
    GenerationStarted { mode: GenerationMode, model: ModelId },
    GenerationSucceeded { id: ObjectId },
    GenerationFailed { message: String },
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&EditorEvent)>;

/// Synchronous observer list. Each event reaches every listener once, in subscription order.
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&EditorEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was not found.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: EditorEvent) {
        log::trace!("Event: {:?}", event);
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
