//! Tile loading control: one "ready" flag for all raster layers of a map
//!
//! Every raster layer reports `LoadStarted`/`LoadFinished`; the control keeps a single
//! counter of loads in flight. The counter is allowed to go below zero (finish events of
//! loads started before the control was attached), anything `<= 0` reads as ready.

use crate::events::SubscriptionId;
use crate::map::{Layer, LayerId, Map, TileEvent};
use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Class of the control's root element
pub const CONTROL_CLASS: &str = "tile-loading-control";

/// Name of the readiness data attribute (`data-ready`)
pub const READY_ATTRIBUTE: &str = "ready";

/// Aggregate loading state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Tiles are being fetched
    Settling,
    /// No tile load in flight
    Ready,
}

/// Root visual element of the control, read by loading indicators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlElement {
    pub class_name: String,
    /// `data-*` attributes
    pub dataset: BTreeMap<String, String>,
}

impl ControlElement {
    fn new() -> Self {
        Self {
            class_name: CONTROL_CLASS.to_string(),
            dataset: BTreeMap::new(),
        }
    }

    fn set_ready(&mut self, ready: bool) {
        self.dataset
            .insert(READY_ATTRIBUTE.to_string(), ready.to_string());
    }

    /// Value of `data-ready`, `None` before the control is attached
    pub fn ready(&self) -> Option<bool> {
        self.dataset
            .get(READY_ATTRIBUTE)
            .map(|value| value == "true")
    }
}

#[derive(Debug)]
struct ControlState {
    counter: i64,
    element: ControlElement,
    /// Load-event subscriptions, one per raster layer
    subscriptions: BTreeMap<LayerId, SubscriptionId>,
}

impl ControlState {
    fn on_event(&mut self, event: TileEvent) {
        match event {
            TileEvent::LoadStarted => self.counter += 1,
            TileEvent::LoadFinished => self.counter -= 1,
        }
        self.element.set_ready(self.counter <= 0);
        tracing::trace!(counter = self.counter, ?event, "Tile load event");
    }
}

/// Subscribe `state` to a raster layer unless it already is. Other layers are ignored.
fn subscribe_layer(state: &Rc<RefCell<ControlState>>, id: LayerId, layer: &mut Layer) {
    let Some(tiles) = layer.as_tile_mut() else {
        return;
    };
    if state.borrow().subscriptions.contains_key(&id) {
        return;
    }
    let handler_state = Rc::clone(state);
    let subscription = tiles.subscribe(Box::new(move |event| {
        handler_state.borrow_mut().on_event(event);
    }));
    state.borrow_mut().subscriptions.insert(id, subscription);
    tracing::debug!(layer = %tiles.name, "Tracking tile loads");
}

/// Release the subscription `state` holds on a layer leaving the map
fn unsubscribe_layer(state: &Rc<RefCell<ControlState>>, id: LayerId, layer: &mut Layer) {
    let Some(subscription) = state.borrow_mut().subscriptions.remove(&id) else {
        return;
    };
    if let Some(tiles) = layer.as_tile_mut() {
        tiles.unsubscribe(subscription);
        tracing::debug!(layer = %tiles.name, "No longer tracking tile loads");
    }
}

/// Map-level hooks held while attached
#[derive(Debug, Clone, Copy)]
struct MapHooks {
    layer_added: SubscriptionId,
    layer_removed: SubscriptionId,
}

/// Tracks tile loading across every raster layer of a map
#[derive(Debug)]
pub struct TileLoadingControl {
    state: Rc<RefCell<ControlState>>,
    hooks: Option<MapHooks>,
}

impl Default for TileLoadingControl {
    fn default() -> Self {
        Self::new()
    }
}

impl TileLoadingControl {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ControlState {
                counter: 0,
                element: ControlElement::new(),
                subscriptions: BTreeMap::new(),
            })),
            hooks: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.hooks.is_some()
    }

    /// Subscribe to every raster layer of `map`, and to layers added later. Layers removed
    /// from the map are forgotten.
    /// Attaching an attached control does nothing.
    pub fn attach(&mut self, map: &mut Map) {
        if self.is_attached() {
            tracing::debug!("Tile loading control already attached");
            return;
        }
        for (id, layer) in map.layers_mut() {
            subscribe_layer(&self.state, id, layer);
        }
        let added_state = Rc::clone(&self.state);
        let removed_state = Rc::clone(&self.state);
        self.hooks = Some(MapHooks {
            layer_added: map.on_layer_added(Box::new(move |id, layer| {
                subscribe_layer(&added_state, id, layer);
            })),
            layer_removed: map.on_layer_removed(Box::new(move |id, layer| {
                unsubscribe_layer(&removed_state, id, layer);
            })),
        });

        let mut state = self.state.borrow_mut();
        let ready = state.counter <= 0;
        state.element.set_ready(ready);
    }

    /// Release every subscription made on `map`. Detaching a detached control does nothing.
    pub fn detach(&mut self, map: &mut Map) {
        let Some(hooks) = self.hooks.take() else {
            return;
        };
        map.off_layer_added(hooks.layer_added);
        map.off_layer_removed(hooks.layer_removed);

        let subscriptions = std::mem::take(&mut self.state.borrow_mut().subscriptions);
        for (id, subscription) in subscriptions {
            if let Some(tiles) = map.layer_mut(id).and_then(Layer::as_tile_mut) {
                tiles.unsubscribe(subscription);
            }
        }
        tracing::debug!("Tile loading control detached");
    }

    pub fn on_load_started(&self) {
        self.state.borrow_mut().on_event(TileEvent::LoadStarted);
    }

    pub fn on_load_finished(&self) {
        self.state.borrow_mut().on_event(TileEvent::LoadFinished);
    }

    /// Raw counter of loads in flight (may be negative)
    pub fn counter(&self) -> i64 {
        self.state.borrow().counter
    }

    pub fn state(&self) -> LoadState {
        if self.counter() <= 0 {
            LoadState::Ready
        } else {
            LoadState::Settling
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LoadState::Ready
    }

    pub fn element(&self) -> Ref<'_, ControlElement> {
        Ref::map(self.state.borrow(), |state| &state.element)
    }

    /// Number of raster layers currently subscribed to
    pub fn subscribed_layers(&self) -> usize {
        self.state.borrow().subscriptions.len()
    }
}
