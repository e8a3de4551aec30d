use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative stop signal shared between a control side and a polling loop.
///
/// Loops observe the flag at the top of each iteration, bounded by their
/// poll timeout, so a request is honored within one poll interval.
#[derive(Clone, Debug, Default)]
pub struct ShutdownToken {
    requested: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            tracing::debug!("Shutdown requested");
        }
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_starts_clear() {
        let token = ShutdownToken::new();
        assert!(!token.is_requested());
    }

    #[test]
    fn request_is_visible_to_clones() {
        let token = ShutdownToken::new();
        let observer = token.clone();
        token.request();
        assert!(observer.is_requested());
    }

    #[test]
    fn repeated_requests_stay_requested() {
        let token = ShutdownToken::new();
        token.request();
        token.request();
        assert!(token.is_requested());
    }
}
