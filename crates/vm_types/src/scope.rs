//! One execution's value-model state: its limits and its tracker.
//!
//! Hosts running several executions create one scope each. Values are `!Send`,
//! so a graph cannot leak into another thread's scope. Dropping the scope
//! discards whatever graph is left, cycles included.

use std::rc::Rc;

use crate::compound::Array;
use crate::error::Result;
use crate::item::{StackItem, StackItemType};
use crate::limits::ExecutionEngineLimits;
use crate::structure::Struct;
use crate::tracker::ResourceTracker;

pub struct ExecutionScope {
    limits: ExecutionEngineLimits,
    tracker: Rc<ResourceTracker>,
}

impl ExecutionScope {
    pub fn new(limits: ExecutionEngineLimits) -> Result<Self> {
        limits.validate()?;
        Ok(Self { tracker: ResourceTracker::with_limits(&limits), limits })
    }

    pub fn limits(&self) -> &ExecutionEngineLimits {
        &self.limits
    }

    pub fn tracker(&self) -> &Rc<ResourceTracker> {
        &self.tracker
    }

    pub fn new_array(&self, items: Vec<StackItem>) -> Result<Array> {
        Array::new(&self.tracker, items)
    }

    pub fn new_struct(&self, items: Vec<StackItem>) -> Result<Struct> {
        Struct::new(&self.tracker, items)
    }

    pub fn clone_struct(&self, s: &Struct) -> Result<Struct> {
        s.clone_bounded(&self.limits)
    }

    pub fn equals(&self, a: &StackItem, b: &StackItem) -> Result<bool> {
        a.equals(b, &self.limits)
    }

    pub fn convert(&self, item: &StackItem, to: StackItemType) -> Result<StackItem> {
        item.convert_to(to)
    }
}

impl Drop for ExecutionScope {
    fn drop(&mut self) {
        self.tracker.discard();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compound::Compound;
    use crate::integer::Integer;

    #[test]
    fn scope_end_discards_cyclic_graph() {
        let scope = ExecutionScope::new(ExecutionEngineLimits::default()).unwrap();
        let tracker = Rc::clone(scope.tracker());
        let s = scope.new_struct(vec![StackItem::from(Integer::from(1u8))]).unwrap();
        s.push(StackItem::Struct(s.clone()));
        drop(s);
        assert_eq!(tracker.count(), 1);
        drop(scope);
        assert_eq!(tracker.count(), 0);
    }

    #[test]
    fn scopes_are_independent() {
        let small = ExecutionScope::new(ExecutionEngineLimits::new(1, 16).unwrap()).unwrap();
        let other = ExecutionScope::new(ExecutionEngineLimits::default()).unwrap();
        let _a = small.new_array(vec![]).unwrap();
        assert!(small.new_array(vec![]).unwrap_err().is_resource_limit());
        assert!(other.new_array(vec![]).is_ok());
        assert_eq!(other.tracker().count(), 0);
    }

    #[test]
    fn rejects_invalid_limits() {
        let bad = ExecutionEngineLimits { max_stack_size: 0, ..Default::default() };
        assert!(ExecutionScope::new(bad).is_err());
    }
}
