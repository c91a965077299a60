use log::{debug, warn};

/// Component-scoped wrapper over the `log` facade.
#[derive(Debug, Clone, Copy)]
pub struct LogManager {
    scope: &'static str,
}

impl LogManager {
    pub fn new(scope: &'static str) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn record(&self, message: &str) {
        debug!(target: "geomagcore", "[{}] {}", self.scope, message);
    }

    pub fn warn(&self, message: &str) {
        warn!(target: "geomagcore", "[{}] {}", self.scope, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("geomagcore")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_manager_keeps_scope() {
        let logger = LogManager::new("frames");
        logger.record("converted 4 samples");
        assert_eq!(logger.scope(), "frames");
        assert_eq!(LogManager::default().scope(), "geomagcore");
    }
}
