//! Versioned command tables.
//!
//! Each table version is a fixed set of registrations. Newer versions add
//! commands and may rename older ones.

use std::sync::Arc;

use toolhost_config::CommandTableVersion;

use super::{CommandRegistry, RegistryError};
use crate::handlers::{AsyncMainHandler, DerivedValue, DerivedValueHandler, MainHandler};
use crate::tools::{ArtifactTool, CompileTool};

/// Builds the registry for `version`, presenting `program_name` as argv zero
/// to forwarded tools.
///
/// # Errors
///
/// Returns [`RegistryError::DuplicateCommand`] if a table lists a name twice.
pub fn command_table(
    version: CommandTableVersion,
    program_name: &str,
) -> Result<CommandRegistry, RegistryError> {
    let program: Arc<str> = Arc::from(program_name);
    let artifact = MainHandler::new(Arc::clone(&program), ArtifactTool);
    let compile = AsyncMainHandler::new(Arc::clone(&program), CompileTool);
    let class_hash = DerivedValueHandler::new(DerivedValue::ClassHash);
    let compiled_class_hash = DerivedValueHandler::new(DerivedValue::CompiledClassHash);

    let builder = CommandRegistry::builder().register("artifact", artifact)?;
    let registry = match version {
        CommandTableVersion::V1 => builder.register("artifact-compile", compile)?,
        CommandTableVersion::V2 => builder
            .register("artifact-compile", compile)?
            .register("get-class-hash", class_hash)?,
        CommandTableVersion::V3 => builder
            .register("artifact-compile-deprecated", compile)?
            .register("get-class-hash", class_hash)?
            .register("get-compiled-class-hash", compiled_class_hash)?,
    };
    Ok(registry.build())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(CommandTableVersion::V1, &["artifact", "artifact-compile"])]
    #[case(
        CommandTableVersion::V2,
        &["artifact", "artifact-compile", "get-class-hash"]
    )]
    #[case(
        CommandTableVersion::V3,
        &[
            "artifact",
            "artifact-compile-deprecated",
            "get-class-hash",
            "get-compiled-class-hash",
        ]
    )]
    fn tables_list_their_commands(
        #[case] version: CommandTableVersion,
        #[case] expected: &[&str],
    ) {
        let registry = command_table(version, "toolhostd").expect("table builds");
        assert_eq!(registry.commands(), expected);
    }

    #[rstest]
    fn default_table_drops_the_old_compile_name() {
        let registry =
            command_table(CommandTableVersion::default(), "toolhostd").expect("table builds");
        assert!(registry.resolve("artifact-compile").is_err());
        assert!(registry.resolve("artifact-compile-deprecated").is_ok());
    }
}
