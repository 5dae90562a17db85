//! Compiled artifact model, loader and identifier derivation.
//!
//! A compiled artifact is the JSON document produced by the compile tool:
//!
//! ```json
//! {
//!   "abi": [{"type": "function", "name": "get_balance", "inputs": [], "outputs": []}],
//!   "entry_points_by_type": {
//!     "EXTERNAL": [{"selector": "0x2b5...", "offset": 12}],
//!     "L1_HANDLER": [],
//!     "CONSTRUCTOR": []
//!   },
//!   "program": {"builtins": ["range_check"], "data": ["0x40780017fff7fff", "0x1"]}
//! }
//! ```

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::digest::Felt;

/// Errors raised while loading or hashing an artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The file could not be read.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The file contents are not a valid artifact.
    #[error("failed to parse '{path}': {source}")]
    Parse {
        /// Path whose contents were rejected.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A program data word is not a hexadecimal literal.
    #[error("program data word {index} is not hexadecimal: '{word}'")]
    InvalidProgramData {
        /// Position of the word within `program.data`.
        index: usize,
        /// The offending text.
        word: String,
    },
    /// Canonical encoding for hashing failed.
    #[error("failed to encode artifact for hashing: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Kind of callable entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntryPointKind {
    /// Callable by transactions.
    External,
    /// Invoked by messages from L1.
    L1Handler,
    /// Runs once on deployment.
    Constructor,
}

impl EntryPointKind {
    /// All kinds in the order they appear in an artifact.
    pub const ALL: [Self; 3] = [Self::External, Self::L1Handler, Self::Constructor];

    /// Key used in `entry_points_by_type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::External => "EXTERNAL",
            Self::L1Handler => "L1_HANDLER",
            Self::Constructor => "CONSTRUCTOR",
        }
    }

    /// Maps an ABI entry type to the entry point kind it declares.
    #[must_use]
    pub fn from_abi_type(kind: &str) -> Option<Self> {
        match kind {
            "function" => Some(Self::External),
            "l1_handler" => Some(Self::L1Handler),
            "constructor" => Some(Self::Constructor),
            _ => None,
        }
    }
}

/// One ABI entry. Only `type` and `name` are interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiEntry {
    /// Entry type, for example `function`, `event` or `struct`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Declared name, absent for some entry types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Remaining fields, preserved verbatim.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Entry point resolved to a selector and a program offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    /// Hexadecimal selector.
    pub selector: String,
    /// Offset of the entry point within the program.
    pub offset: u64,
}

/// Entry points grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPointsByType {
    /// External entry points.
    #[serde(rename = "EXTERNAL", default)]
    pub external: Vec<EntryPoint>,
    /// L1 handler entry points.
    #[serde(rename = "L1_HANDLER", default)]
    pub l1_handler: Vec<EntryPoint>,
    /// Constructor entry points.
    #[serde(rename = "CONSTRUCTOR", default)]
    pub constructor: Vec<EntryPoint>,
}

impl EntryPointsByType {
    /// Entry points of one kind.
    #[must_use]
    pub fn of_kind(&self, kind: EntryPointKind) -> &[EntryPoint] {
        match kind {
            EntryPointKind::External => &self.external,
            EntryPointKind::L1Handler => &self.l1_handler,
            EntryPointKind::Constructor => &self.constructor,
        }
    }

    pub(crate) fn of_kind_mut(&mut self, kind: EntryPointKind) -> &mut Vec<EntryPoint> {
        match kind {
            EntryPointKind::External => &mut self.external,
            EntryPointKind::L1Handler => &mut self.l1_handler,
            EntryPointKind::Constructor => &mut self.constructor,
        }
    }
}

/// Program section: bytecode words plus whatever metadata the compiler kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Builtins the program links against.
    #[serde(default)]
    pub builtins: Vec<String>,
    /// Bytecode words as hexadecimal literals.
    pub data: Vec<String>,
    /// Remaining fields such as `identifiers`, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Program {
    /// Program counter recorded for `__main__.<name>` in `identifiers`.
    #[must_use]
    pub fn entry_offset(&self, name: &str) -> Option<u64> {
        self.extra
            .get("identifiers")?
            .get(format!("__main__.{name}"))?
            .get("pc")?
            .as_u64()
    }
}

/// In-memory form of a compiled artifact file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledArtifact {
    /// Interface description.
    #[serde(default)]
    pub abi: Vec<AbiEntry>,
    /// Callable entry points.
    pub entry_points_by_type: EntryPointsByType,
    /// Compiled program.
    pub program: Program,
}

impl CompiledArtifact {
    /// Parses artifact JSON; `path` is only used for error context.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Parse`] when the text is not a valid artifact.
    pub fn from_json(text: &str, path: &Path) -> Result<Self, ArtifactError> {
        serde_json::from_str(text).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads and parses an artifact, blocking the current thread.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn read(path: &Path) -> Result<Self, ArtifactError> {
        let text = std::fs::read_to_string(path).map_err(|source| ArtifactError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// Reads and parses an artifact without blocking the runtime.
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
        Self::from_json(&text, path)
    }

    /// Identifier of the whole artifact: ABI, entry points and program.
    ///
    /// The canonical encoding is compact JSON with object keys sorted, so
    /// formatting differences in the source file do not change the value.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Encode`] if canonical encoding fails.
    pub fn class_hash(&self) -> Result<Felt, ArtifactError> {
        let canonical = serde_json::to_value(self).map_err(ArtifactError::Encode)?;
        let bytes = serde_json::to_vec(&canonical).map_err(ArtifactError::Encode)?;
        Ok(Felt::truncated_digest(&bytes))
    }

    /// Identifier of the program bytecode alone.
    ///
    /// Words are normalised (prefix stripped, lower case, leading zeros
    /// removed) before hashing.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::InvalidProgramData`] for non-hexadecimal words.
    pub fn compiled_class_hash(&self) -> Result<Felt, ArtifactError> {
        let mut encoded = Vec::new();
        for (index, word) in self.program.data.iter().enumerate() {
            let normalised = normalise_word(word).ok_or_else(|| {
                ArtifactError::InvalidProgramData {
                    index,
                    word: word.clone(),
                }
            })?;
            if index > 0 {
                encoded.push(b',');
            }
            encoded.extend_from_slice(normalised.as_bytes());
        }
        Ok(Felt::truncated_digest(&encoded))
    }
}

fn normalise_word(word: &str) -> Option<String> {
    let trimmed = word.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let significant = digits.trim_start_matches('0').to_ascii_lowercase();
    Some(if significant.is_empty() {
        "0".to_owned()
    } else {
        significant
    })
}
