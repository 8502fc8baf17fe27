//! Building blocks shared by every view

use std::sync::atomic::{AtomicU64, Ordering};

/// Loading state of a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Failed(String),
}

/// One-line feedback shown after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Result of entering a view through the guard
#[derive(Debug)]
pub enum Entry<V> {
    Entered(V),
    Redirected(&'static str),
}

impl<V> Entry<V> {
    pub fn entered(self) -> Option<V> {
        match self {
            Entry::Entered(view) => Some(view),
            Entry::Redirected(_) => None,
        }
    }

    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            Entry::Entered(_) => None,
            Entry::Redirected(target) => Some(*target),
        }
    }
}

/// Asks the person at the keyboard before something destructive happens
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Outcome of deleting one entry from a locally held list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// The confirmation was declined, nothing was sent
    Cancelled,
    /// A request for this entry is already outstanding
    Busy,
    /// The entry is not in the list
    NotFound,
    Failed(String),
    /// The view was left before the answer arrived
    Discarded,
}

/// Generation counters that let a view ignore answers meant for an older state
///
/// Leaving the view invalidates every outstanding ticket. Starting a newer
/// load only invalidates older loads; a mutation the server confirmed is
/// still applied.
#[derive(Debug, Default)]
pub struct ViewEpoch {
    mount: AtomicU64,
    load: AtomicU64,
}

/// Snapshot of a [`ViewEpoch`] taken when a request was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ticket {
    Load { mount: u64, load: u64 },
    Mutation { mount: u64 },
}

impl ViewEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load, superseding any load still outstanding
    pub fn begin_load(&self) -> Ticket {
        let load = self.load.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket::Load {
            mount: self.mount.load(Ordering::SeqCst),
            load,
        }
    }

    pub fn mutation(&self) -> Ticket {
        Ticket::Mutation {
            mount: self.mount.load(Ordering::SeqCst),
        }
    }

    /// The view is gone; nothing outstanding may touch its state
    pub fn leave(&self) {
        self.mount.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        let mount = self.mount.load(Ordering::SeqCst);
        match ticket {
            Ticket::Load { mount: m, load } => {
                m == mount && load == self.load.load(Ordering::SeqCst)
            }
            Ticket::Mutation { mount: m } => m == mount,
        }
    }
}
