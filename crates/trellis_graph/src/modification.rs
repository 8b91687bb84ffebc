// SPDX-License-Identifier: MIT OR Apache-2.0
//! Modification scope counting and the observers notified at its edges.
//!
//! Every mutation is bracketed by a begin/end pair. Brackets nest; observers
//! only hear about the outermost one, so a multi-step edit (destroying a node
//! and everything that cascades from it) reads as a single change.

use crate::id::GraphId;

/// Notification fired when the outermost modification scope opens or closes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModificationEvent {
    /// Depth went from 0 to 1
    Began {
        /// Root graph of the document
        root: GraphId,
    },
    /// Depth went from 1 to 0
    Ended {
        /// Root graph of the document
        root: GraphId,
    },
}

/// Handle returned by [`ModificationEvents::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&ModificationEvent)>;

/// Nesting counter plus observer list, owned by one editing session
#[derive(Default)]
pub struct ModificationEvents {
    depth: u32,
    next_subscription: u64,
    observers: Vec<(SubscriptionId, Observer)>,
}

impl std::fmt::Debug for ModificationEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModificationEvents")
            .field("depth", &self.depth)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ModificationEvents {
    /// Create an idle bus with no observers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer
    pub fn subscribe(&mut self, observer: impl FnMut(&ModificationEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer; returns whether it was registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Current nesting depth
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether any modification scope is open
    pub fn is_modifying(&self) -> bool {
        self.depth > 0
    }

    /// Open a scope, notifying observers if it is the outermost one
    pub fn begin(&mut self, root: GraphId) {
        self.depth += 1;
        if self.depth == 1 {
            self.notify(&ModificationEvent::Began { root });
        }
    }

    /// Close a scope, notifying observers if it was the outermost one.
    ///
    /// # Panics
    ///
    /// Panics if no scope is open.
    pub fn end(&mut self, root: GraphId) {
        assert!(self.depth > 0, "end_modification without a matching begin_modification");
        self.depth -= 1;
        if self.depth == 0 {
            self.notify(&ModificationEvent::Ended { root });
        }
    }

    fn notify(&mut self, event: &ModificationEvent) {
        for (_, observer) in &mut self.observers {
            observer(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_nested_scopes_notify_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut events = ModificationEvents::new();
        let sink = Rc::clone(&log);
        events.subscribe(move |e| sink.borrow_mut().push(*e));

        let root = GraphId::new();
        events.begin(root);
        events.begin(root);
        events.begin(root);
        events.end(root);
        events.end(root);
        assert_eq!(log.borrow().len(), 1);
        events.end(root);

        assert_eq!(
            *log.borrow(),
            vec![ModificationEvent::Began { root }, ModificationEvent::Ended { root }]
        );
        assert!(!events.is_modifying());
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut events = ModificationEvents::new();
        let sink = Rc::clone(&count);
        let id = events.subscribe(move |_| *sink.borrow_mut() += 1);
        assert!(events.unsubscribe(id));
        assert!(!events.unsubscribe(id));

        let root = GraphId::new();
        events.begin(root);
        events.end(root);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    #[should_panic(expected = "without a matching")]
    fn test_unbalanced_end_panics() {
        ModificationEvents::new().end(GraphId::new());
    }
}
