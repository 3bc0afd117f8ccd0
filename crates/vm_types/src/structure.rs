//! Value-semantics compound: bounded clone and bounded structural equality.
//!
//! Both walks are iterative and charge one unit of budget per step, so work
//! is bounded by `max_stack_size` no matter how deep, wide or cyclic the
//! input graph is. Identity short-circuits are what keep cycles finite in
//! `equals_bounded`; in `clone_bounded` a cycle simply runs out of budget.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::compound::{Array, Compound, CompoundCell};
use crate::error::{Result, VmError};
use crate::item::StackItem;
use crate::limits::ExecutionEngineLimits;
use crate::tracker::ResourceTracker;

/// Compound value with value-style copy and comparison.
///
/// Deliberately not `PartialEq`: content comparison goes through
/// [`Struct::equals_bounded`] only.
#[derive(Clone)]
pub struct Struct(pub(crate) Rc<CompoundCell>);

impl Struct {
    pub fn new(tracker: &Rc<ResourceTracker>, items: Vec<StackItem>) -> Result<Self> {
        Ok(Self(CompoundCell::create(tracker, items)?))
    }

    /// Copy with every nested struct duplicated and every other element shared.
    ///
    /// Breadth-first over (destination, source) pairs. One unit of the
    /// `max_stack_size - 1` budget is spent per element visited.
    pub fn clone_bounded(&self, limits: &ExecutionEngineLimits) -> Result<Struct> {
        let tracker = self.tracker();
        let mut budget = i64::from(limits.max_stack_size) - 1;
        let result = Struct::new(tracker, Vec::new())?;
        let mut queue: VecDeque<(Struct, Struct)> = VecDeque::new();
        queue.push_back((result.clone(), self.clone()));

        while let Some((dst, src)) = queue.pop_front() {
            // Snapshot the handles so `src == dst` aliasing can never hold a borrow across a push.
            let children = src.items();
            for item in children {
                budget -= 1;
                if budget < 0 {
                    tracing::debug!(max_stack_size = limits.max_stack_size, "struct clone budget exhausted");
                    return Err(VmError::limit("struct clone exceeds max_stack_size"));
                }
                match item {
                    StackItem::Struct(child) => {
                        let copy = Struct::new(tracker, Vec::new())?;
                        dst.0.push_item(StackItem::Struct(copy.clone()));
                        queue.push_back((copy, child));
                    }
                    other => dst.0.push_item(other),
                }
            }
        }
        Ok(result)
    }

    /// Structural equality with a work budget of `max_stack_size` steps.
    ///
    /// Non-struct `other` is unequal without spending budget. Identical
    /// references are equal without being expanded. Pending work is held to
    /// the remaining budget, so memory stays bounded however wide a struct is.
    pub fn equals_bounded(&self, other: &StackItem, limits: &ExecutionEngineLimits) -> Result<bool> {
        let other = match other {
            StackItem::Struct(s) => s,
            _ => return Ok(false),
        };
        let mut left: Vec<StackItem> = vec![StackItem::Struct(self.clone())];
        let mut right: Vec<StackItem> = vec![StackItem::Struct(other.clone())];
        let mut budget = limits.max_stack_size;

        while let Some(a) = left.pop() {
            if budget == 0 {
                tracing::debug!(max_stack_size = limits.max_stack_size, "struct comparison budget exhausted");
                return Err(VmError::limit("too many struct items to compare"));
            }
            budget -= 1;
            // stacks grow in lockstep, so `right` cannot be shorter
            let Some(b) = right.pop() else { return Ok(false) };

            if a.same_ref(&b) {
                continue;
            }
            match (&a, &b) {
                (StackItem::Struct(sa), StackItem::Struct(sb)) => {
                    if sa.len() != sb.len() {
                        return Ok(false);
                    }
                    // Only the top `budget + 1` entries can still be reached
                    // before the budget runs out, so deeper ones are never kept.
                    let reach = budget as usize + 1;
                    sa.0.with_items(|items| left.extend(items[items.len().saturating_sub(reach)..].iter().cloned()));
                    sb.0.with_items(|items| right.extend(items[items.len().saturating_sub(reach)..].iter().cloned()));
                    if left.len() > reach {
                        let excess = left.len() - reach;
                        left.drain(..excess);
                        right.drain(..excess);
                    }
                }
                (StackItem::Struct(_), _) | (_, StackItem::Struct(_)) => return Ok(false),
                _ => {
                    if !a.leaf_equals(&b, limits)? {
                        return Ok(false);
                    }
                }
            }
        }
        Ok(true)
    }

    /// New array identity over the same element handles.
    pub fn to_array(&self) -> Result<Array> {
        Array::new(self.tracker(), self.items())
    }
}

impl Compound for Struct {
    fn cell(&self) -> &Rc<CompoundCell> {
        &self.0
    }
}

impl fmt::Debug for Struct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Struct({:p}, len={})", Rc::as_ptr(&self.0), self.len())
    }
}
