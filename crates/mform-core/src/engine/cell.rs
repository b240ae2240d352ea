//! Observable views over a session's state.
//!
//! All cells of one session share an [`EngineCore`]. Every mutation goes
//! through [`EngineCore::mutate`], which releases the state borrow and then
//! notifies every listener with the new state in the same call, so readers
//! never observe a half-applied write.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use mform_domain::{FieldValue, InputKind};

use super::state::{coerce_value, FormState};

type Listener = Rc<dyn Fn(&FormState)>;

#[derive(Default)]
pub(crate) struct EngineCore {
    state: RefCell<FormState>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_id: Cell<u64>,
}

impl EngineCore {
    pub(crate) fn read<T>(&self, read: impl FnOnce(&FormState) -> T) -> T {
        read(&self.state.borrow())
    }

    pub(crate) fn mutate<T>(&self, mutate: impl FnOnce(&mut FormState) -> T) -> T {
        let output = mutate(&mut self.state.borrow_mut());
        self.notify();
        output
    }

    fn notify(&self) {
        let snapshot = self.state.borrow().clone();
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    pub(crate) fn subscribe(self: &Rc<Self>, listener: Listener) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, listener));
        Subscription {
            core: Rc::downgrade(self),
            id,
        }
    }

    fn unsubscribe(&self, id: u64) {
        self.listeners
            .borrow_mut()
            .retain(|(listener_id, _)| *listener_id != id);
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

/// Keeps a listener registered until dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    core: Weak<EngineCore>,
    id: u64,
}

impl Subscription {
    /// Leaves the listener registered for the lifetime of the session.
    pub fn detach(mut self) {
        self.core = Weak::new();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(core) = self.core.upgrade() {
            core.unsubscribe(self.id);
        }
    }
}

/// Read-only value computed from the session state.
pub struct Derived<T> {
    core: Rc<EngineCore>,
    derive: Rc<dyn Fn(&FormState) -> T>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
            derive: Rc::clone(&self.derive),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Derived<T> {
    pub(crate) fn new(core: Rc<EngineCore>, derive: impl Fn(&FormState) -> T + 'static) -> Self {
        Self {
            core,
            derive: Rc::new(derive),
        }
    }

    pub fn get(&self) -> T {
        self.core.read(|state| (self.derive)(state))
    }

    /// Calls `callback` with the current value now, then again whenever it
    /// changes.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let current = self.get();
        callback(&current);
        let last = RefCell::new(current);
        let derive = Rc::clone(&self.derive);
        self.core.subscribe(Rc::new(move |state: &FormState| {
            let next = derive(state);
            if *last.borrow() != next {
                last.replace(next.clone());
                callback(&next);
            }
        }))
    }
}

/// Two-way binding to one field's value.
///
/// Writes go through the engine: numeric kinds are coerced and the field's
/// errors are cleared.
#[derive(Clone)]
pub struct ValueCell {
    core: Rc<EngineCore>,
    name: String,
    kind: InputKind,
}

impl ValueCell {
    pub(crate) fn new(core: Rc<EngineCore>, name: String, kind: InputKind) -> Self {
        Self { core, name, kind }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn get(&self) -> Option<FieldValue> {
        self.core.read(|state| state.value(&self.name).cloned())
    }

    pub fn set(&self, value: impl Into<FieldValue>) {
        self.write(Some(coerce_value(self.kind, value.into())));
    }

    pub fn clear(&self) {
        self.write(None);
    }

    pub fn update(&self, update: impl FnOnce(Option<FieldValue>) -> Option<FieldValue>) {
        let next = update(self.get()).map(|value| coerce_value(self.kind, value));
        self.write(next);
    }

    /// In-place list edit; an absent or non-list value starts as `[]`.
    pub fn update_list(&self, update: impl FnOnce(&mut Vec<String>)) {
        let mut items = match self.get() {
            Some(FieldValue::List(items)) => items,
            _ => Vec::new(),
        };
        update(&mut items);
        self.write(Some(FieldValue::List(items)));
    }

    pub fn push_item(&self, item: impl Into<String>) {
        let item = item.into();
        self.update_list(|items| items.push(item));
    }

    pub fn remove_item(&self, item: &str) {
        self.update_list(|items| items.retain(|existing| existing != item));
    }

    pub fn subscribe(&self, callback: impl Fn(&Option<FieldValue>) + 'static) -> Subscription {
        self.as_derived().subscribe(callback)
    }

    pub fn as_derived(&self) -> Derived<Option<FieldValue>> {
        let name = self.name.clone();
        Derived::new(Rc::clone(&self.core), move |state| {
            state.value(&name).cloned()
        })
    }

    fn write(&self, value: Option<FieldValue>) {
        let name = self.name.as_str();
        let known = self.core.mutate(|state| state.set_value(name, value));
        if !known {
            tracing::warn!(field = name, "write to a field that is not registered");
        }
    }
}
