//! The `artifact-compile` tool: turns a contract definition into a compiled
//! artifact.
//!
//! A contract definition pairs an assembled program with its ABI. Compiling
//! derives one entry point per callable ABI entry, resolving its offset from
//! the program's `identifiers` table and its selector from the entry name.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use clap::Parser;
use serde::{Deserialize, Serialize};

use super::artifact::{
    AbiEntry, ArtifactError, CompiledArtifact, EntryPoint, EntryPointKind, EntryPointsByType,
    Program,
};
use super::digest::Felt;
use crate::capture::OutputCapture;
use crate::handlers::{ArgumentVector, AsyncToolMain, ToolError};

#[derive(Debug, Parser)]
#[command(
    name = "artifact-compile",
    about = "Compile a contract definition into an artifact"
)]
struct CompileArgs {
    /// Contract definition to compile.
    source: PathBuf,
    /// Write the artifact here instead of standard output.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Also write the ABI to this path.
    #[arg(long)]
    abi: Option<PathBuf>,
}

/// Input to the compiler: a program and the ABI describing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractDefinition {
    /// Interface description.
    #[serde(default)]
    pub abi: Vec<AbiEntry>,
    /// Assembled program.
    pub program: Program,
}

impl ContractDefinition {
    /// Reads a definition without blocking the runtime.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, ArtifactError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ArtifactError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&text).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Derives entry points and produces the compiled artifact.
    ///
    /// Entry points are ordered by selector within each kind. Entries whose
    /// name is missing from `identifiers` get offset zero.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] when a callable ABI entry has
    /// no name.
    pub fn compile(self) -> Result<CompiledArtifact, ToolError> {
        let mut resolved: Vec<(EntryPointKind, Felt, u64)> = Vec::new();
        for entry in &self.abi {
            let Some(kind) = EntryPointKind::from_abi_type(&entry.kind) else {
                continue;
            };
            let Some(name) = entry.name.as_deref() else {
                return Err(ToolError::invalid_arguments(format!(
                    "ABI entry of type '{}' has no name",
                    entry.kind
                )));
            };
            let offset = self.program.entry_offset(name).unwrap_or(0);
            resolved.push((kind, Felt::selector(name), offset));
        }
        resolved.sort_by_key(|(_, selector, _)| *selector);

        let mut entry_points = EntryPointsByType::default();
        for (kind, selector, offset) in resolved {
            entry_points.of_kind_mut(kind).push(EntryPoint {
                selector: selector.to_hex(),
                offset,
            });
        }
        Ok(CompiledArtifact {
            abi: self.abi,
            entry_points_by_type: entry_points,
            program: self.program,
        })
    }
}

/// Asynchronous `artifact-compile` entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileTool;

#[async_trait]
impl AsyncToolMain for CompileTool {
    async fn run(
        &self,
        argv: &ArgumentVector,
        capture: &mut OutputCapture,
    ) -> Result<i32, ToolError> {
        let args = CompileArgs::try_parse_from(argv.iter())?;
        let definition = ContractDefinition::load(&args.source).await?;
        let artifact = definition.compile()?;

        if let Some(path) = &args.abi {
            write_json(path, &artifact.abi).await?;
        }
        match &args.output {
            Some(path) => write_json(path, &artifact).await?,
            None => {
                let out = capture.stdout();
                serde_json::to_writer_pretty(&mut *out, &artifact)?;
                writeln!(out)?;
            }
        }
        Ok(0)
    }
}

async fn write_json<T: Serialize + Sync>(path: &Path, value: &T) -> Result<(), ToolError> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    tokio::fs::write(path, text)
        .await
        .map_err(|source| ToolError::WriteFile {
            path: path.to_path_buf(),
            source,
        })
}
