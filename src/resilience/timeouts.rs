//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap dependency probes with a deadline
//! - Turn an elapsed deadline into an ordinary I/O error
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors (`ErrorKind::TimedOut`)

use std::future::Future;
use std::time::Duration;

/// Run `fut` with a deadline, mapping expiry to `io::ErrorKind::TimedOut`.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> std::io::Result<T>
where
    F: Future<Output = std::io::Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            format!("timed out after {:?}", limit),
        )),
    }
}
