//! Scoped ownership of a mesh session
//!
//! [`scoped`] owns a connected session for the lifetime of a body future and
//! disconnects it exactly once on every exit path: normal completion, an error
//! returned by the body, or the interrupt future firing first.

use std::future::Future;

use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::transport::MeshSession;
use crate::{MeshSendError, Result};

/// Run `body` against `session`, then disconnect
///
/// If `interrupt` completes before the body, the body is dropped and the
/// result is [`MeshSendError::Interrupted`]. A failed disconnect is logged and
/// never replaces the body's result.
pub async fn scoped<S, T, I, F>(mut session: S, interrupt: I, body: F) -> Result<T>
where
    S: MeshSession,
    T: Send,
    I: Future<Output = ()>,
    F: for<'s> FnOnce(&'s mut S) -> BoxFuture<'s, Result<T>>,
{
    let outcome = {
        let work = body(&mut session);
        tokio::select! {
            result = work => result,
            _ = interrupt => {
                warn!("Interrupted, closing session");
                Err(MeshSendError::Interrupted)
            }
        }
    };

    match session.disconnect().await {
        Ok(()) => debug!("Session disconnected"),
        Err(e) => warn!("Failed to disconnect session: {}", e),
    }

    outcome
}
