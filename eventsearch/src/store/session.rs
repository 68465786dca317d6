//! Time-bounded query sessions
//!
//! Every store round-trip runs under a deadline. The pooled connection is
//! owned by the future, so it goes back to the pool whether the query
//! finishes, fails or is dropped on timeout.

use std::future::Future;
use std::time::Duration;

use crate::error::{DatabaseError, DatabaseOperation};

/// Deadline applied to a search when none is configured
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(20);

/// Run a store operation with a deadline
pub(crate) async fn run<F, T>(
    operation: DatabaseOperation,
    deadline: Duration,
    fut: F,
) -> Result<T, DatabaseError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result.map_err(DatabaseError::from),
        Err(_) => Err(DatabaseError::timeout(
            operation,
            format!("deadline of {:?} exceeded", deadline),
        )),
    }
}
