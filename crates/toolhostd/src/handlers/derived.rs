//! Handlers that compute a single identifier from an artifact on disk.

use std::io::Write;
use std::path::Path;

use async_trait::async_trait;

use super::{OperationHandler, ToolError};
use crate::capture::OutputCapture;
use crate::tools::{CompiledArtifact, Felt};

/// Identifier printed by a [`DerivedValueHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedValue {
    /// Artifact identifier, printed as `0x`-prefixed hexadecimal.
    ClassHash,
    /// Bytecode identifier, printed as decimal.
    CompiledClassHash,
}

impl DerivedValue {
    fn derive(self, artifact: &CompiledArtifact) -> Result<Felt, ToolError> {
        let value = match self {
            Self::ClassHash => artifact.class_hash()?,
            Self::CompiledClassHash => artifact.compiled_class_hash()?,
        };
        Ok(value)
    }

    fn render(self, value: &Felt) -> String {
        match self {
            Self::ClassHash => value.to_hex(),
            Self::CompiledClassHash => value.to_decimal(),
        }
    }
}

/// Reads the artifact named by the only argument and prints one identifier.
#[derive(Debug, Clone, Copy)]
pub struct DerivedValueHandler {
    value: DerivedValue,
}

impl DerivedValueHandler {
    /// Creates a handler printing `value`.
    #[must_use]
    pub const fn new(value: DerivedValue) -> Self {
        Self { value }
    }

    async fn run(&self, args: &[String], capture: &mut OutputCapture) -> Result<i32, ToolError> {
        let [path] = args else {
            return Err(ToolError::invalid_arguments(format!(
                "expected exactly one artifact path, got {}",
                args.len()
            )));
        };
        let artifact = CompiledArtifact::load(Path::new(path)).await?;
        let value = self.value.derive(&artifact)?;
        writeln!(capture.stdout(), "{}", self.value.render(&value))?;
        Ok(0)
    }
}

#[async_trait]
impl OperationHandler for DerivedValueHandler {
    async fn handle(&self, args: Vec<String>, capture: &mut OutputCapture) -> i32 {
        let outcome = self.run(&args, capture).await;
        super::settle(outcome, capture)
    }
}
