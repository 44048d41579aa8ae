//! Handler registry with explicit subscription handles

/// Handle returned by [`Listeners::subscribe`], needed to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Ordered set of boxed handlers of type `F` (usually `dyn FnMut(..)`)
pub struct Listeners<F: ?Sized> {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Box<F>)>,
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self {
            next_id: 0,
            handlers: Vec::new(),
        }
    }
}

impl<F: ?Sized> std::fmt::Debug for Listeners<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.handlers.len())
            .finish()
    }
}

impl<F: ?Sized> Listeners<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: Box<F>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, handler));
        id
    }

    /// Remove a handler. Returns `false` if it was not registered here.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(handler_id, _)| *handler_id != id);
        self.handlers.len() != before
    }

    /// Drop every handler
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.handlers.iter().any(|(handler_id, _)| *handler_id == id)
    }

    /// Handlers in subscription order
    pub fn handlers_mut(&mut self) -> impl Iterator<Item = &mut Box<F>> {
        self.handlers.iter_mut().map(|(_, handler)| handler)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
