//! Deselect-all broadcasting for clickable scene elements.
//!
//! The scene owns one [`SelectionBus`] and hands a clone to every
//! [`Selectable`] it creates.  A selectable subscribes a listener that clears
//! its own `active` flag; [`SelectionBus::deselect_all`] fires every live
//! listener.  Dropping a selectable unsubscribes it.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`); the bus lives on the
//! console's event loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

pub type ListenerId = u64;

type Listener = Box<dyn FnMut()>;

#[derive(Default)]
struct Registry {
    next_id:   ListenerId,
    listeners: Vec<(ListenerId, Listener)>,
    /// Ids taken out for the broadcast in flight.
    in_flight: Vec<ListenerId>,
    /// In-flight ids unsubscribed before the broadcast finished.
    removed:   Vec<ListenerId>,
}

// ════════════════════════════════════════════════════════════════════════════
// SelectionBus
// ════════════════════════════════════════════════════════════════════════════

/// Cheap-to-clone handle to a shared listener registry.
#[derive(Clone, Default)]
pub struct SelectionBus {
    inner: Rc<RefCell<Registry>>,
}

impl SelectionBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl FnMut() + 'static) -> ListenerId {
        let mut reg = self.inner.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut reg = self.inner.borrow_mut();
        let before = reg.listeners.len();
        reg.listeners.retain(|(lid, _)| *lid != id);
        if reg.listeners.len() != before { return true; }

        // Running right now: drop it once the broadcast hands the list back.
        match reg.in_flight.iter().position(|lid| *lid == id) {
            Some(i) => {
                reg.in_flight.swap_remove(i);
                reg.removed.push(id);
                true
            }
            None => false,
        }
    }

    /// Notify every subscriber.  Returns how many were notified.
    ///
    /// Listeners run with the registry unlocked, so one may subscribe or
    /// unsubscribe while the broadcast is in flight.  A newcomer is not
    /// notified this round; a listener unsubscribed mid-round still counts
    /// as notified if its turn already came.
    pub fn deselect_all(&self) -> usize {
        let mut taken = {
            let mut reg = self.inner.borrow_mut();
            reg.in_flight = reg.listeners.iter().map(|(id, _)| *id).collect();
            std::mem::take(&mut reg.listeners)
        };
        let mut notified = 0;
        for (id, listener) in taken.iter_mut() {
            if self.inner.borrow().removed.contains(id) { continue; }
            listener();
            notified += 1;
        }

        let mut reg = self.inner.borrow_mut();
        let removed = std::mem::take(&mut reg.removed);
        reg.in_flight.clear();
        taken.retain(|(id, _)| !removed.contains(id));
        taken.append(&mut reg.listeners);
        reg.listeners = taken;
        debug!(notified, "deselect all");
        notified
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl std::fmt::Debug for SelectionBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Selectable
// ════════════════════════════════════════════════════════════════════════════

/// A scene element that toggles on click and clears on deselect-all.
pub struct Selectable {
    active:  Rc<Cell<bool>>,
    hovered: bool,
    bus:     SelectionBus,
    id:      ListenerId,
}

impl Selectable {
    pub fn new(bus: &SelectionBus) -> Self {
        let active = Rc::new(Cell::new(false));
        let flag = Rc::clone(&active);
        let id = bus.subscribe(move || flag.set(false));
        Selectable { active, hovered: false, bus: bus.clone(), id }
    }

    /// Click handler.  Returns the new state.
    pub fn toggle(&mut self) -> bool {
        let now = !self.active.get();
        self.active.set(now);
        now
    }

    pub fn is_active(&self) -> bool { self.active.get() }

    pub fn set_hovered(&mut self, hovered: bool) { self.hovered = hovered; }
    pub fn is_hovered(&self) -> bool { self.hovered }
}

impl Drop for Selectable {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}

impl std::fmt::Debug for Selectable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selectable")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .field("hovered", &self.hovered)
            .finish()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
