//! Shared representation of compound values.
//!
//! `Array` and `Struct` are two handle types over the same `CompoundCell`:
//! an ordered, mutable element list registered with a `ResourceTracker`.
//! Handles are cheap to clone; cloning a handle shares identity.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::{Result, VmError};
use crate::item::StackItem;
use crate::tracker::ResourceTracker;

pub struct CompoundCell {
    items: RefCell<Vec<StackItem>>,
    tracker: Rc<ResourceTracker>,
    registered: Cell<bool>,
}

impl CompoundCell {
    pub(crate) fn create(tracker: &Rc<ResourceTracker>, items: Vec<StackItem>) -> Result<Rc<Self>> {
        let cell = Rc::new(Self {
            items: RefCell::new(items),
            tracker: Rc::clone(tracker),
            registered: Cell::new(false),
        });
        tracker.register(&cell)?;
        cell.registered.set(true);
        Ok(cell)
    }

    pub(crate) fn take_items(&self) -> Vec<StackItem> {
        std::mem::take(&mut *self.items.borrow_mut())
    }
}

impl Drop for CompoundCell {
    fn drop(&mut self) {
        if self.registered.get() {
            self.tracker.unregister();
        }
        // Hoist children we solely own so a deep chain is freed in a loop.
        let mut pending = std::mem::take(self.items.get_mut());
        while let Some(item) = pending.pop() {
            if let Some(cell) = item.compound_cell() {
                if Rc::strong_count(cell) == 1 {
                    if let Ok(mut children) = cell.items.try_borrow_mut() {
                        pending.append(&mut children);
                    }
                }
            }
        }
    }
}

/// Operations common to both compound flavours.
pub trait Compound {
    fn cell(&self) -> &Rc<CompoundCell>;

    fn len(&self) -> usize {
        self.cell().items.borrow().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Result<StackItem> {
        let items = self.cell().items.borrow();
        items
            .get(index)
            .cloned()
            .ok_or(VmError::IndexOutOfRange { index, len: items.len() })
    }

    fn set(&self, index: usize, item: StackItem) -> Result<()> {
        let mut items = self.cell().items.borrow_mut();
        let len = items.len();
        let slot = items.get_mut(index).ok_or(VmError::IndexOutOfRange { index, len })?;
        // the old value is dropped after the borrow ends
        let old = std::mem::replace(slot, item);
        drop(items);
        drop(old);
        Ok(())
    }

    fn push(&self, item: StackItem) {
        self.cell().items.borrow_mut().push(item);
    }

    fn remove(&self, index: usize) -> Result<StackItem> {
        let mut items = self.cell().items.borrow_mut();
        if index >= items.len() {
            return Err(VmError::IndexOutOfRange { index, len: items.len() });
        }
        Ok(items.remove(index))
    }

    fn clear(&self) {
        let old = self.cell().take_items();
        drop(old);
    }

    /// Element handles in order, detached from the container borrow.
    fn items(&self) -> Vec<StackItem> {
        self.cell().items.borrow().clone()
    }

    fn tracker(&self) -> &Rc<ResourceTracker> {
        &self.cell().tracker
    }

    /// Reference identity: both handles name the same container.
    fn same_as(&self, other: &dyn Compound) -> bool {
        Rc::ptr_eq(self.cell(), other.cell())
    }
}

// Borrow helpers for the bounded algorithms, which iterate without cloning the list.
impl CompoundCell {
    pub(crate) fn with_items<R>(&self, f: impl FnOnce(&[StackItem]) -> R) -> R {
        f(&self.items.borrow())
    }

    pub(crate) fn push_item(&self, item: StackItem) {
        self.items.borrow_mut().push(item);
    }
}

/// Reference-equal compound value.
#[derive(Clone)]
pub struct Array(pub(crate) Rc<CompoundCell>);

impl Array {
    pub fn new(tracker: &Rc<ResourceTracker>, items: Vec<StackItem>) -> Result<Self> {
        Ok(Self(CompoundCell::create(tracker, items)?))
    }
}

impl Compound for Array {
    fn cell(&self) -> &Rc<CompoundCell> {
        &self.0
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Array {}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // shallow: the graph may be cyclic
        write!(f, "Array({:p}, len={})", Rc::as_ptr(&self.0), self.len())
    }
}
