//! Native tool entry points and the artifact model they share.

mod artifact;
mod compile;
mod digest;
mod inspect;

pub use self::artifact::{
    AbiEntry, ArtifactError, CompiledArtifact, EntryPoint, EntryPointKind, EntryPointsByType,
    Program,
};
pub use self::compile::{CompileTool, ContractDefinition};
pub use self::digest::Felt;
pub use self::inspect::ArtifactTool;
