//! Wrapped tools driven through the HTTP surface.

use std::fs;
use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};
use tempfile::TempDir;
use toolhost_config::CommandTableVersion;

use super::support::{DEFINITION, execute};
use crate::test_support::TestServer;
use crate::tools::{CompiledArtifact, Felt};

struct Contract {
    dir: TempDir,
    source: PathBuf,
}

impl Contract {
    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    fn source(&self) -> String {
        self.source.display().to_string()
    }
}

#[fixture]
fn contract() -> Contract {
    let dir = TempDir::new().expect("temp dir");
    let source = dir.path().join("definition.json");
    fs::write(&source, DEFINITION).expect("write definition");
    Contract { dir, source }
}

async fn compile(server: &TestServer, command: &str, contract: &Contract) -> String {
    let output = contract.path("compiled.json");
    let source = contract.source();
    let response = execute(server, command, &[&source, "--output", &output]).await;
    assert_eq!(response.status_code, 0, "stderr: {}", response.stderr);
    output
}

#[rstest]
#[tokio::test]
async fn class_hash_is_stable_across_requests(contract: Contract) {
    let server = TestServer::start(CommandTableVersion::V3)
        .await
        .expect("start server");
    let compiled = compile(&server, "artifact-compile-deprecated", &contract).await;

    let first = execute(&server, "get-class-hash", &[&compiled]).await;
    let second = execute(&server, "get-class-hash", &[&compiled]).await;

    assert_eq!(first, second);
    assert_eq!(first.status_code, 0);
    let expected = CompiledArtifact::read(Path::new(&compiled))
        .and_then(|artifact| artifact.class_hash())
        .expect("hash");
    assert_eq!(first.stdout, format!("{}\n", expected.to_hex()));
    assert!(first.stderr.is_empty());
    server.stop().await;
}

#[rstest]
#[tokio::test]
async fn compiled_class_hash_is_decimal(contract: Contract) {
    let server = TestServer::start(CommandTableVersion::V3)
        .await
        .expect("start server");
    let compiled = compile(&server, "artifact-compile-deprecated", &contract).await;

    let response = execute(&server, "get-compiled-class-hash", &[&compiled]).await;

    assert_eq!(response.status_code, 0);
    let expected = CompiledArtifact::read(Path::new(&compiled))
        .and_then(|artifact| artifact.compiled_class_hash())
        .expect("hash");
    assert_eq!(response.stdout, format!("{}\n", expected.to_decimal()));
    server.stop().await;
}

#[rstest]
#[tokio::test]
async fn missing_artifact_is_status_one_with_diagnostic() {
    let server = TestServer::start(CommandTableVersion::V3)
        .await
        .expect("start server");

    let response = execute(&server, "get-class-hash", &["/nonexistent/contract.json"]).await;

    assert_eq!(response.status_code, 1);
    assert!(response.stdout.is_empty());
    assert!(!response.stderr.is_empty());
    server.stop().await;
}

#[rstest]
#[tokio::test]
async fn artifact_tool_reads_the_compiled_output(contract: Contract) {
    let server = TestServer::start(CommandTableVersion::V1)
        .await
        .expect("start server");
    let compiled = compile(&server, "artifact-compile", &contract).await;

    let listing = execute(
        &server,
        "artifact",
        &["entry-points", "--contract", &compiled, "--kind", "l1-handler"],
    )
    .await;
    let selector = execute(&server, "artifact", &["selector", "deposit"]).await;

    let deposit = Felt::selector("deposit").to_hex();
    assert_eq!(listing.stdout, format!("L1_HANDLER {deposit} 7\n"));
    assert_eq!(selector.stdout, format!("{deposit}\n"));
    server.stop().await;
}

#[rstest]
#[tokio::test]
async fn tool_help_is_printed_to_stdout() {
    let server = TestServer::start(CommandTableVersion::V3)
        .await
        .expect("start server");

    let response = execute(&server, "artifact", &["--help"]).await;

    assert_eq!(response.status_code, 0);
    assert!(response.stdout.contains("entry-points"));
    assert!(response.stderr.is_empty());
    server.stop().await;
}
