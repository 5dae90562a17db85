//! Free port discovery for spawned tool hosts.

use std::io;

use tokio::net::TcpStream;

use crate::errors::ClientError;

/// First candidate port.
pub const FIRST_CANDIDATE_PORT: u16 = 6050;

/// Distance between candidate ports.
pub const CANDIDATE_PORT_STEP: usize = 1000;

/// Finds a loopback port nothing is listening on.
///
/// Candidates are 6050, 7050, 8050 and so on up to 65535. A port counts as
/// free when a connection attempt is refused.
///
/// # Errors
///
/// Returns [`ClientError::NoFreePort`] when every candidate answers, or
/// [`ClientError::PortCheck`] when a check fails for another reason.
pub async fn find_free_port() -> Result<u16, ClientError> {
    first_free_port(
        "127.0.0.1",
        (FIRST_CANDIDATE_PORT..=u16::MAX).step_by(CANDIDATE_PORT_STEP),
    )
    .await
}

/// Returns the first of `candidates` on `host` that refuses connections.
///
/// # Errors
///
/// Returns [`ClientError::NoFreePort`] when no candidate is free, or
/// [`ClientError::PortCheck`] when a check fails for another reason.
pub async fn first_free_port<I>(host: &str, candidates: I) -> Result<u16, ClientError>
where
    I: IntoIterator<Item = u16>,
{
    for port in candidates {
        if is_free(host, port).await? {
            return Ok(port);
        }
    }
    Err(ClientError::NoFreePort)
}

async fn is_free(host: &str, port: u16) -> Result<bool, ClientError> {
    match TcpStream::connect((host, port)).await {
        Ok(_stream) => Ok(false),
        Err(error) if error.kind() == io::ErrorKind::ConnectionRefused => Ok(true),
        Err(source) => Err(ClientError::PortCheck { port, source }),
    }
}
