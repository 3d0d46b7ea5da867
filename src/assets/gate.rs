use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{Result, DubError};

/// Held for the lifetime of one external generator session
#[derive(Debug)]
pub struct SessionPermit {
    _permit: Option<OwnedSemaphorePermit>,
}

impl SessionPermit {
    /// Permit that guards nothing
    pub fn unguarded() -> Self {
        Self { _permit: None }
    }
}

/// Admission control around an external session that cannot run concurrently
#[async_trait]
pub trait SessionGate: Send + Sync {
    /// Wait until a session may start
    async fn acquire(&self) -> Result<SessionPermit>;

    /// Whether a session is currently running
    fn is_busy(&self) -> bool;
}

/// Allows a single session at a time; later callers queue in arrival order
#[derive(Debug, Clone)]
pub struct ExclusiveGate {
    semaphore: Arc<Semaphore>,
}

impl ExclusiveGate {
    pub fn new() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
        }
    }
}

impl Default for ExclusiveGate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionGate for ExclusiveGate {
    async fn acquire(&self) -> Result<SessionPermit> {
        let permit = self.semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| DubError::Asset("Session gate closed".to_string()))?;

        Ok(SessionPermit { _permit: Some(permit) })
    }

    fn is_busy(&self) -> bool {
        self.semaphore.available_permits() == 0
    }
}

/// Gate that never blocks
#[derive(Debug, Clone, Default)]
pub struct NoopGate;

#[async_trait]
impl SessionGate for NoopGate {
    async fn acquire(&self) -> Result<SessionPermit> {
        Ok(SessionPermit::unguarded())
    }

    fn is_busy(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_exclusive_gate_admits_one_session() {
        let gate = ExclusiveGate::new();
        assert!(!gate.is_busy());

        let first = gate.acquire().await.unwrap();
        assert!(gate.is_busy());

        let blocked = timeout(Duration::from_millis(50), gate.acquire()).await;
        assert!(blocked.is_err(), "second session must wait");

        drop(first);
        assert!(!gate.is_busy());

        let second = timeout(Duration::from_millis(500), gate.acquire()).await;
        assert!(matches!(second, Ok(Ok(_))));
    }

    #[tokio::test]
    async fn test_clones_share_the_same_gate() {
        let gate = ExclusiveGate::new();
        let other = gate.clone();

        let _permit = gate.acquire().await.unwrap();
        assert!(other.is_busy());
    }

    #[tokio::test]
    async fn test_noop_gate_never_blocks() {
        let gate = NoopGate;
        let _a = gate.acquire().await.unwrap();
        let _b = timeout(Duration::from_millis(50), gate.acquire()).await.unwrap().unwrap();
        assert!(!gate.is_busy());
    }
}
