//! The `artifact` tool: read-only queries against a compiled artifact.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::artifact::{CompiledArtifact, EntryPointKind};
use super::digest::Felt;
use crate::capture::OutputCapture;
use crate::handlers::{ArgumentVector, ToolError, ToolMain};

#[derive(Debug, Parser)]
#[command(name = "artifact", about = "Inspect compiled contract artifacts")]
struct ArtifactCli {
    #[command(subcommand)]
    command: ArtifactCommand,
}

#[derive(Debug, Subcommand)]
enum ArtifactCommand {
    /// Print the ABI as JSON.
    Abi {
        /// Compiled artifact to read.
        #[arg(long)]
        contract: PathBuf,
    },
    /// List entry points as `KIND SELECTOR OFFSET` lines.
    EntryPoints {
        /// Compiled artifact to read.
        #[arg(long)]
        contract: PathBuf,
        /// Restrict the listing to one kind.
        #[arg(long, value_enum)]
        kind: Option<EntryPointKind>,
    },
    /// Print the selector for an entry point name.
    Selector {
        /// Entry point name.
        name: String,
    },
    /// Print the artifact identifier.
    ClassHash {
        /// Compiled artifact to read.
        #[arg(long)]
        contract: PathBuf,
    },
}

/// Synchronous `artifact` entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtifactTool;

impl ToolMain for ArtifactTool {
    fn run(&self, argv: &ArgumentVector, capture: &mut OutputCapture) -> Result<i32, ToolError> {
        let cli = ArtifactCli::try_parse_from(argv.iter())?;
        let out = capture.stdout();
        match cli.command {
            ArtifactCommand::Abi { contract } => {
                let artifact = CompiledArtifact::read(&contract)?;
                serde_json::to_writer_pretty(&mut *out, &artifact.abi)?;
                writeln!(out)?;
            }
            ArtifactCommand::EntryPoints { contract, kind } => {
                let artifact = CompiledArtifact::read(&contract)?;
                let kinds = kind.map_or_else(|| EntryPointKind::ALL.to_vec(), |only| vec![only]);
                for listed in kinds {
                    for entry in artifact.entry_points_by_type.of_kind(listed) {
                        writeln!(
                            out,
                            "{} {} {}",
                            listed.as_str(),
                            entry.selector,
                            entry.offset
                        )?;
                    }
                }
            }
            ArtifactCommand::Selector { name } => {
                writeln!(out, "{}", Felt::selector(&name).to_hex())?;
            }
            ArtifactCommand::ClassHash { contract } => {
                let artifact = CompiledArtifact::read(&contract)?;
                writeln!(out, "{}", artifact.class_hash()?.to_hex())?;
            }
        }
        Ok(0)
    }
}
