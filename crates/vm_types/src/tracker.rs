//! Per-execution tracker of live compound values.
//!
//! Every array/struct registers on construction and releases its slot when the
//! last handle is dropped. `discard` empties every container still alive, which
//! is how a finished execution reclaims cyclic graphs.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::compound::CompoundCell;
use crate::error::{Result, VmError};
use crate::limits::ExecutionEngineLimits;

pub struct ResourceTracker {
    limit: usize,
    live: Cell<usize>,
    peak: Cell<usize>,
    registry: RefCell<Vec<Weak<CompoundCell>>>,
}

impl ResourceTracker {
    pub fn new(limit: usize) -> Rc<Self> {
        Rc::new(Self {
            limit,
            live: Cell::new(0),
            peak: Cell::new(0),
            registry: RefCell::new(Vec::new()),
        })
    }

    pub fn with_limits(limits: &ExecutionEngineLimits) -> Rc<Self> {
        Self::new(limits.max_stack_size as usize)
    }

    /// Compound values currently alive.
    pub fn count(&self) -> usize {
        self.live.get()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Highest count observed since creation.
    pub fn peak(&self) -> usize {
        self.peak.get()
    }

    pub(crate) fn register(&self, cell: &Rc<CompoundCell>) -> Result<()> {
        let live = self.live.get();
        if live >= self.limit {
            tracing::debug!(live, limit = self.limit, "compound registration refused");
            return Err(VmError::limit(format!("more than {} live compound values", self.limit)));
        }
        self.live.set(live + 1);
        self.peak.set(self.peak.get().max(live + 1));

        let mut registry = self.registry.borrow_mut();
        if registry.len() >= 2 * (live + 1) + 64 {
            registry.retain(|w| w.strong_count() > 0);
        }
        registry.push(Rc::downgrade(cell));
        Ok(())
    }

    pub(crate) fn unregister(&self) {
        self.live.set(self.live.get().saturating_sub(1));
    }

    /// Empty every container still alive; returns how many were emptied.
    ///
    /// Handles held outside stay valid but see empty containers afterwards.
    pub fn discard(&self) -> usize {
        let cells: Vec<Rc<CompoundCell>> = {
            let mut registry = self.registry.borrow_mut();
            let alive = registry.iter().filter_map(Weak::upgrade).collect();
            registry.clear();
            alive
        };
        let emptied = cells.len();
        // Drained items are dropped only after every cell is empty, so no drop recurses.
        let drained: Vec<_> = cells.iter().map(|c| c.take_items()).collect();
        drop(drained);
        drop(cells);
        tracing::trace!(emptied, live = self.live.get(), "execution graph discarded");
        emptied
    }
}

impl std::fmt::Debug for ResourceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceTracker")
            .field("live", &self.live.get())
            .field("peak", &self.peak.get())
            .field("limit", &self.limit)
            .finish()
    }
}
