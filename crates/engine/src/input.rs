//! Input events and scoped global listeners.
//!
//! A host owns one [`InputBus`] and routes global events (the undo chord,
//! pointer release outside the grid) only while something is subscribed.
//! Editor sessions hold [`Subscription`]s; dropping one unregisters it, so
//! listeners never outlive the session on any exit path.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use auditgrid_core::{CellPos, CellValue};

/// Events an editor session reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// The undo chord was pressed anywhere in the window.
    Undo,
    PointerDown(CellPos),
    PointerMove(CellPos),
    /// Pointer released, possibly outside the grid.
    PointerUp,
    /// A committed cell edit.
    Edit { pos: CellPos, value: CellValue },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobalListener {
    UndoKey,
    PointerRelease,
}

#[derive(Debug, Default)]
struct BusInner {
    next_id: u64,
    active: Vec<(u64, GlobalListener)>,
}

/// Registry of live global listeners. Single-threaded by construction.
#[derive(Debug, Clone, Default)]
pub struct InputBus {
    inner: Rc<RefCell<BusInner>>,
}

impl InputBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, kind: GlobalListener) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.active.push((id, kind));
        log::debug!("listener {id} ({kind:?}) registered");
        Subscription {
            id,
            kind,
            bus: Rc::downgrade(&self.inner),
        }
    }

    pub fn is_listening(&self, kind: GlobalListener) -> bool {
        self.listener_count(kind) > 0
    }

    pub fn listener_count(&self, kind: GlobalListener) -> usize {
        self.inner
            .borrow()
            .active
            .iter()
            .filter(|(_, k)| *k == kind)
            .count()
    }

    pub fn total_listeners(&self) -> usize {
        self.inner.borrow().active.len()
    }
}

/// A registered listener. Unregisters itself on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    kind: GlobalListener,
    bus: Weak<RefCell<BusInner>>,
}

impl Subscription {
    pub fn kind(&self) -> GlobalListener {
        self.kind
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            inner.borrow_mut().active.retain(|(id, _)| *id != self.id);
            log::debug!("listener {} ({:?}) released", self.id, self.kind);
        }
    }
}
