//! Code pointers and the scripts they point into.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Opaque executable bytecode. Identity is the allocation, not the content.
pub struct Script {
    code: Box<[u8]>,
}

impl Script {
    pub fn new(code: impl Into<Vec<u8>>) -> Rc<Self> {
        Rc::new(Self { code: code.into().into_boxed_slice() })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = &self.code[..self.code.len().min(8)];
        write!(f, "Script({:p}, len={}, head={})", self as *const Self, self.code.len(), hex::encode(head))
    }
}

/// Jump target: a position inside a specific script instance.
#[derive(Clone)]
pub struct Pointer {
    script: Rc<Script>,
    position: usize,
}

impl Pointer {
    pub fn new(script: &Rc<Script>, position: usize) -> Self {
        Self { script: Rc::clone(script), position }
    }

    pub fn script(&self) -> &Rc<Script> {
        &self.script
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn get_boolean(&self) -> bool {
        true
    }
}

impl PartialEq for Pointer {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && Rc::ptr_eq(&self.script, &other.script)
    }
}

impl Eq for Pointer {}

impl Hash for Pointer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.script) as usize).hash(state);
        self.position.hash(state);
    }
}

impl fmt::Debug for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pointer({:p}@{})", Rc::as_ptr(&self.script), self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_script_same_position_is_equal() {
        let s = Script::new(vec![0x11, 0x40]);
        assert_eq!(Pointer::new(&s, 1), Pointer::new(&s, 1));
        assert_ne!(Pointer::new(&s, 0), Pointer::new(&s, 1));
    }

    #[test]
    fn identical_content_distinct_script_is_unequal() {
        let s1 = Script::new(vec![0x11, 0x40]);
        let s2 = Script::new(vec![0x11, 0x40]);
        assert_eq!(s1.as_bytes(), s2.as_bytes());
        assert_ne!(Pointer::new(&s1, 1), Pointer::new(&s2, 1));
    }

    #[test]
    fn always_truthy() {
        let s = Script::new(Vec::new());
        assert!(s.is_empty());
        assert!(Pointer::new(&s, 0).get_boolean());
    }
}
