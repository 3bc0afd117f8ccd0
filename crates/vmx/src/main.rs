use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;
use tracing::Level;
use vm_payload::PayloadError;
use vm_types::VmError;

mod commands;

/// 0 = OK, 2 = input error, 3 = limit refusal, 1 = other.
#[allow(dead_code)]
const EXIT_OK: i32 = 0;
const EXIT_OTHER: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_LIMIT: i32 = 3;

#[derive(Parser)]
#[command(name = "vmx", version, about = "VM value-model CLI: limits, payload hashing, witness checks")]
struct Cli {
    /// Limits JSON file (default: VM_MAX_* environment, then built-in defaults)
    #[arg(long, env = "VM_LIMITS")]
    limits: Option<String>,

    /// Log bounded-walk and binding decisions
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective execution limits as JSON
    Limits,
    /// Decode a signed extensible payload and print its hash
    Hash {
        /// Payload bytes as hex (or - for stdin)
        #[arg(default_value = "-")]
        hex: String,
    },
    /// Check witness bindings of a signed extensible payload
    Verify {
        /// Payload bytes as hex (or - for stdin)
        hex: String,
        /// Snapshot JSON file with deployed contracts and stored blocks
        #[arg(long)]
        snapshot: Option<String>,
    },
    /// Build a nested struct and run the bounded clone and equality on it
    Stress {
        /// Nesting depth
        #[arg(long, default_value_t = 16)]
        depth: usize,
        /// Leaves per level
        #[arg(long, default_value_t = 4)]
        width: usize,
    },
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<VmError>() {
        return match e {
            e if e.is_resource_limit() => EXIT_LIMIT,
            VmError::InvalidLimits(_) => EXIT_INPUT,
            _ => EXIT_OTHER,
        };
    }
    if let Some(e) = err.downcast_ref::<PayloadError>() {
        return match e {
            PayloadError::UnexpectedEof { .. }
            | PayloadError::NonCanonicalVarInt
            | PayloadError::LengthExceeded { .. }
            | PayloadError::TrailingBytes(_)
            | PayloadError::InvalidFormat(_)
            | PayloadError::Hex(_)
            | PayloadError::Json(_) => EXIT_INPUT,
            _ => EXIT_OTHER,
        };
    }
    if err.downcast_ref::<std::io::Error>().is_some() {
        return EXIT_INPUT;
    }
    EXIT_OTHER
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let result = commands::load_limits(cli.limits.as_deref()).and_then(|limits| match cli.command {
        Commands::Limits => commands::limits(&limits),
        Commands::Hash { hex } => commands::hash(&hex),
        Commands::Verify { hex, snapshot } => commands::verify(&hex, snapshot.as_deref()),
        Commands::Stress { depth, width } => commands::stress(&limits, depth, width),
    });

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        process::exit(exit_code_for(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let limit = anyhow::Error::new(VmError::limit("clone budget"));
        assert_eq!(exit_code_for(&limit), EXIT_LIMIT);

        let bad_limits = anyhow::Error::new(VmError::InvalidLimits("zero".into()));
        assert_eq!(exit_code_for(&bad_limits), EXIT_INPUT);

        let trailing = anyhow::Error::new(PayloadError::TrailingBytes(2));
        assert_eq!(exit_code_for(&trailing), EXIT_INPUT);

        let mismatch = anyhow::Error::new(PayloadError::WitnessCountMismatch { expected: 1, actual: 0 });
        assert_eq!(exit_code_for(&mismatch), EXIT_OTHER);

        let ctx = anyhow::Error::new(VmError::limit("x")).context("stress");
        assert_eq!(exit_code_for(&ctx), EXIT_LIMIT);
    }
}
