//! Projection Lifecycle
//!
//! Binds an ephemeral projection to one unit of work:
//!
//! ```text
//! Unopened --create ok--> Open --scope exit (any reason)--> drop issued --> Closed
//! ```
//!
//! There is no way back to `Open`. If creation fails no guard exists, so no
//! drop is attempted.
//!
//! Teardown runs exactly once: through [`ProjectionGuard::close`] on the
//! normal path, or from `Drop` when the guard is discarded without closing
//! (a panic in the body, or the surrounding future being cancelled). The
//! `Drop` path cannot await, so it spawns the drop request on the current
//! tokio runtime.

use crate::db::GraphStore;
use crate::projection::{Direction, ProjectionBuilder, ProjectionError, ProjectionStats};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Opaque reference to a live projection
///
/// Algorithm calls take a handle rather than a raw name so that nothing can
/// run against a graph that was never opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionHandle {
    graph_name: Arc<str>,
}

impl ProjectionHandle {
    pub fn graph_name(&self) -> &str {
        &self.graph_name
    }
}

async fn teardown(store: &dyn GraphStore, graph_name: &str) -> Result<(), ProjectionError> {
    match store.drop_projection(graph_name).await {
        Ok(()) => {
            debug!("Dropped projection '{}'", graph_name);
            Ok(())
        }
        Err(e) => {
            let err = ProjectionError::drop_failed(graph_name, e);
            warn!("{}", err);
            Err(err)
        }
    }
}

/// Owns an open projection until it is closed or dropped
pub struct ProjectionGuard {
    store: Arc<dyn GraphStore>,
    handle: ProjectionHandle,
    stats: ProjectionStats,
    closed: bool,
}

impl ProjectionGuard {
    pub(crate) fn new(store: Arc<dyn GraphStore>, graph_name: String, stats: ProjectionStats) -> Self {
        Self {
            store,
            handle: ProjectionHandle {
                graph_name: graph_name.into(),
            },
            stats,
            closed: false,
        }
    }

    pub fn handle(&self) -> &ProjectionHandle {
        &self.handle
    }

    pub fn stats(&self) -> &ProjectionStats {
        &self.stats
    }

    /// Issue the drop request and transition to `Closed`
    ///
    /// A failure is logged and returned; callers running a body should not
    /// let it replace the body's own outcome.
    pub async fn close(mut self) -> Result<(), ProjectionError> {
        self.closed = true;
        teardown(self.store.as_ref(), self.handle.graph_name()).await
    }
}

impl Drop for ProjectionGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        let graph_name = self.handle.graph_name().to_string();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                warn!(
                    "Projection '{}' released without close, scheduling teardown",
                    graph_name
                );
                let store = self.store.clone();
                runtime.spawn(async move {
                    let _ = teardown(store.as_ref(), &graph_name).await;
                });
            }
            Err(_) => {
                error!(
                    "Projection '{}' released outside a tokio runtime; it was not dropped",
                    graph_name
                );
            }
        }
    }
}

/// Run `body` against a fresh projection and drop it afterwards
///
/// The drop request is issued once `body` has fully finished, whether it
/// succeeded or failed, and a drop failure never replaces the body's result.
/// Probe and creation errors are returned before `body` runs.
///
/// # Examples
///
/// ```rust,no_run
/// # use gds_mcp_core::db::{GraphStore, Statement, StoreError};
/// # use gds_mcp_core::projection::{with_projection, Direction, ProjectionError};
/// # use std::sync::Arc;
/// # #[derive(Debug)] enum Error { P(ProjectionError), S(StoreError) }
/// # impl From<ProjectionError> for Error { fn from(e: ProjectionError) -> Self { Error::P(e) } }
/// # async fn example(store: Arc<dyn GraphStore>) -> Result<(), Error> {
/// let rows = with_projection(&store, Direction::Directed, |graph| {
///     let store = store.clone();
///     async move {
///         let statement = Statement::new("CALL gds.pageRank.stream($graphName)")
///             .param("graphName", graph.graph_name());
///         store.query(statement).await.map_err(Error::S)
///     }
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn with_projection<F, Fut, T, E>(
    store: &Arc<dyn GraphStore>,
    direction: Direction,
    body: F,
) -> Result<T, E>
where
    F: FnOnce(ProjectionHandle) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<ProjectionError>,
{
    let guard = ProjectionBuilder::new(store.clone()).open(direction).await?;

    let outcome = body(guard.handle().clone()).await;

    // Already logged by `close`; the body's outcome is what the caller sees.
    let _ = guard.close().await;

    outcome
}

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_test;
