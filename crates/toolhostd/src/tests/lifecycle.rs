//! Order of the lifecycle events a server reports.

use std::sync::Arc;

use rstest::rstest;
use toolhost_config::Config;

use super::support::{HealthEvent, RecordingReporter};
use crate::bootstrap::bootstrap_with;

fn quiet_config() -> Config {
    let mut config = Config::with_port(0);
    config.bind_host = "127.0.0.1".to_owned();
    config.log_filter = "off".to_owned();
    config
}

#[rstest]
fn invalid_filter_fails_without_announcing_a_start() {
    let reporter = Arc::new(RecordingReporter::default());
    let mut config = quiet_config();
    config.log_filter = "toolhostd=[".to_owned();

    let result = bootstrap_with(config, reporter.clone());

    assert!(result.is_err());
    let events = reporter.events();
    assert!(
        matches!(events.as_slice(), [HealthEvent::BootstrapFailed(message)]
            if message.starts_with("failed to initialise telemetry")),
        "events: {events:?}"
    );
}

#[rstest]
#[tokio::test]
async fn start_is_announced_once_logging_is_installed() {
    let reporter = Arc::new(RecordingReporter::default());

    let server = bootstrap_with(quiet_config(), reporter.clone()).expect("bootstrap");
    assert!(tracing::dispatcher::has_been_set());
    let bound = server.bind().await.expect("bind");
    bound.serve(std::future::ready(())).await;

    assert_eq!(
        reporter.events(),
        [
            HealthEvent::BootstrapStarting,
            HealthEvent::BootstrapSucceeded,
            HealthEvent::Listening,
            HealthEvent::ShutdownComplete,
        ]
    );
}
