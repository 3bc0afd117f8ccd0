//! Execution limits consumed by the bounded algorithms and the resource tracker.
//!
//! Limits are a plain record: they describe budgets, enforcement happens in the
//! tracker and in `Struct::clone_bounded` / `Struct::equals_bounded`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VmError};

pub const DEFAULT_MAX_STACK_SIZE: u32 = 2 * 1024;
pub const DEFAULT_MAX_COMPARABLE_SIZE: u32 = 65_536;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExecutionEngineLimits {
    /// Upper bound on live compound values and on the work of one clone/compare.
    pub max_stack_size: u32,
    /// Largest byte string that may take part in an equality check.
    pub max_comparable_size: u32,
}

impl Default for ExecutionEngineLimits {
    fn default() -> Self {
        Self {
            max_stack_size: DEFAULT_MAX_STACK_SIZE,
            max_comparable_size: DEFAULT_MAX_COMPARABLE_SIZE,
        }
    }
}

impl ExecutionEngineLimits {
    pub fn new(max_stack_size: u32, max_comparable_size: u32) -> Result<Self> {
        let limits = Self { max_stack_size, max_comparable_size };
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_stack_size == 0 {
            return Err(VmError::InvalidLimits("max_stack_size must be at least 1".into()));
        }
        if self.max_comparable_size == 0 {
            return Err(VmError::InvalidLimits("max_comparable_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let limits: Self = serde_json::from_str(s)
            .map_err(|e| VmError::InvalidLimits(format!("json: {e}")))?;
        limits.validate()?;
        Ok(limits)
    }

    /// Build from `VM_MAX_STACK_SIZE` / `VM_MAX_COMPARABLE_SIZE`, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut limits = Self::default();
        if let Some(v) = get("VM_MAX_STACK_SIZE") {
            limits.max_stack_size = v
                .trim()
                .parse()
                .map_err(|_| VmError::InvalidLimits(format!("VM_MAX_STACK_SIZE: '{v}'")))?;
        }
        if let Some(v) = get("VM_MAX_COMPARABLE_SIZE") {
            limits.max_comparable_size = v
                .trim()
                .parse()
                .map_err(|_| VmError::InvalidLimits(format!("VM_MAX_COMPARABLE_SIZE: '{v}'")))?;
        }
        limits.validate()?;
        Ok(limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let l = ExecutionEngineLimits::default();
        assert_eq!(l.max_stack_size, 2048);
        assert_eq!(l.max_comparable_size, 65_536);
        assert!(l.validate().is_ok());
    }

    #[test]
    fn json_partial_uses_defaults() {
        let l = ExecutionEngineLimits::from_json_str(r#"{"max_stack_size": 16}"#).unwrap();
        assert_eq!(l.max_stack_size, 16);
        assert_eq!(l.max_comparable_size, DEFAULT_MAX_COMPARABLE_SIZE);
    }

    #[test]
    fn json_rejects_unknown_and_zero() {
        assert!(ExecutionEngineLimits::from_json_str(r#"{"max_stak_size": 16}"#).is_err());
        let err = ExecutionEngineLimits::from_json_str(r#"{"max_stack_size": 0}"#).unwrap_err();
        assert!(matches!(err, VmError::InvalidLimits(_)));
    }

    #[test]
    fn env_lookup() {
        let vars: HashMap<&str, &str> =
            [("VM_MAX_STACK_SIZE", "64"), ("VM_MAX_COMPARABLE_SIZE", " 128 ")].into();
        let l = ExecutionEngineLimits::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(l, ExecutionEngineLimits::new(64, 128).unwrap());

        let bad: HashMap<&str, &str> = [("VM_MAX_STACK_SIZE", "lots")].into();
        assert!(ExecutionEngineLimits::from_lookup(|k| bad.get(k).map(|v| v.to_string())).is_err());
    }
}
