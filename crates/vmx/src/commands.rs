use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::io::{self, Read};
use vm_payload::{
    verify_witness_bindings, ExtensiblePayload, Inventory, MemorySnapshot, Serializable, Verifiable,
};
use vm_types::{ExecutionEngineLimits, ExecutionScope, Integer, StackItem, Struct};

/// Limits from `--limits <file>` when given, otherwise from the environment.
pub fn load_limits(path: Option<&str>) -> Result<ExecutionEngineLimits> {
    match path {
        Some(p) => {
            let raw = fs::read_to_string(p).with_context(|| format!("read limits {p}"))?;
            Ok(ExecutionEngineLimits::from_json_str(&raw)?)
        }
        None => Ok(ExecutionEngineLimits::from_env()?),
    }
}

fn read_payload(arg: &str) -> Result<ExtensiblePayload> {
    let text = if arg == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("read stdin")?;
        buf
    } else {
        arg.to_string()
    };
    let text = text.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    let bytes = hex::decode(text).map_err(vm_payload::PayloadError::from)?;
    Ok(ExtensiblePayload::from_bytes(&bytes)?)
}

// ── limits ──────────────────────────────────────────────────────

pub fn limits(limits: &ExecutionEngineLimits) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(limits)?);
    Ok(())
}

// ── hash ────────────────────────────────────────────────────────

pub fn hash(arg: &str) -> Result<()> {
    let payload = read_payload(arg)?;
    println!("{} {}", "Hash:     ".dimmed(), payload.hash().to_string().cyan());
    println!("{} {:?}", "Type:     ".dimmed(), payload.inventory_type());
    println!("{} {}", "Category: ".dimmed(), payload.category);
    println!("{} {}", "Sender:   ".dimmed(), payload.sender);
    println!(
        "{} {}..{}",
        "Valid:    ".dimmed(),
        payload.valid_block_start,
        payload.valid_block_end
    );
    println!("{} {} bytes", "Data:     ".dimmed(), payload.data.len());
    println!("{} {}", "Witnesses:".dimmed(), payload.witnesses().len());
    Ok(())
}

// ── verify ──────────────────────────────────────────────────────

pub fn verify(arg: &str, snapshot: Option<&str>) -> Result<()> {
    let payload = read_payload(arg)?;
    let snapshot = match snapshot {
        Some(p) => {
            let raw = fs::read_to_string(p).with_context(|| format!("read snapshot {p}"))?;
            MemorySnapshot::from_json_str(&raw)?
        }
        None => MemorySnapshot::new(),
    };

    println!("{} {}", "Hash:".dimmed(), payload.hash().to_string().cyan());
    for (i, h) in payload.script_hashes_for_verifying(&snapshot)?.iter().enumerate() {
        println!("{} [{i}] {h}", "Account:".dimmed());
    }

    match verify_witness_bindings(&payload, &snapshot) {
        Ok(()) => {
            println!("{}", "✓ witnesses bound to their accounts".green().bold());
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗ witness binding rejected".red().bold());
            Err(e.into())
        }
    }
}

// ── stress ──────────────────────────────────────────────────────

/// Build a chain of `depth` structs, each holding `width` integers and the next level.
fn nested(scope: &ExecutionScope, depth: usize, width: usize) -> Result<Struct> {
    let mut inner: Option<Struct> = None;
    for level in 0..depth {
        let mut items: Vec<StackItem> = (0..width)
            .map(|i| StackItem::from(Integer::from(level * width + i)))
            .collect();
        if let Some(child) = inner.take() {
            items.push(StackItem::Struct(child));
        }
        inner = Some(scope.new_struct(items).with_context(|| format!("build level {level}"))?);
    }
    match inner {
        Some(s) => Ok(s),
        None => Ok(scope.new_struct(Vec::new())?),
    }
}

pub fn stress(limits: &ExecutionEngineLimits, depth: usize, width: usize) -> Result<()> {
    let scope = ExecutionScope::new(*limits)?;
    let original = nested(&scope, depth, width)?;
    println!(
        "{} depth={depth} width={width} live={}",
        "Built: ".dimmed(),
        scope.tracker().count()
    );

    let copy = scope.clone_struct(&original).context("bounded clone")?;
    println!("{} live={}", "Cloned:".dimmed(), scope.tracker().count());

    let equal = scope
        .equals(&StackItem::Struct(original), &StackItem::Struct(copy))
        .context("bounded equality")?;
    println!("{} {}", "Equal: ".dimmed(), if equal { "yes".green() } else { "no".red() });
    println!(
        "{} peak={} limit={}",
        "Tracker:".dimmed(),
        scope.tracker().peak(),
        scope.tracker().limit()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vm_payload::UInt160;

    fn limits(stack: u32) -> ExecutionEngineLimits {
        ExecutionEngineLimits::new(stack, 1024).unwrap()
    }

    #[test]
    fn stress_fits_default_limits() {
        assert!(stress(&ExecutionEngineLimits::default(), 8, 3).is_ok());
    }

    #[test]
    fn stress_refuses_when_clone_budget_runs_out() {
        // 10 levels of 4 entries each: the clone visits 39 elements after the root.
        let err = stress(&limits(30), 10, 3).unwrap_err();
        let vm = err.downcast_ref::<vm_types::VmError>().unwrap();
        assert!(vm.is_resource_limit());
    }

    #[test]
    fn hash_reads_hex_with_prefix() {
        let verification = vec![0x0c, 0x21];
        let mut p = ExtensiblePayload::new("cli", 1, 2, UInt160::script_hash(&verification), vec![7]);
        p.witnesses_mut().push(vm_payload::Witness::new(vec![], verification));
        let arg = format!("0x{}", hex::encode(p.to_bytes()));
        assert_eq!(read_payload(&arg).unwrap(), p);
        assert!(hash(&arg).is_ok());
        assert!(verify(&arg, None).is_ok());
    }

    #[test]
    fn garbage_hex_is_an_input_error() {
        let err = read_payload("zz").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<vm_payload::PayloadError>(),
            Some(vm_payload::PayloadError::Hex(_))
        ));
    }
}
