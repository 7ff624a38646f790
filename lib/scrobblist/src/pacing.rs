use std::time::Duration;
use tracing::debug;

/// Pause between consecutive requests to the history service.
pub const HISTORY_PACING: Duration = Duration::from_millis(200);

/// Pause between consecutive catalog searches.
pub const CATALOG_PACING: Duration = Duration::from_millis(100);

/// Inserts a fixed pause before every request except the first.
///
/// The pause is a `tokio` sleep, so other runs keep making progress on the
/// same runtime while this one waits. A pacer belongs to a single run and is
/// never shared.
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    issued: u32,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, issued: 0 }
    }

    pub async fn wait(&mut self) {
        if self.issued > 0 && !self.delay.is_zero() {
            debug!("Pacing {}ms before request #{}", self.delay.as_millis(), self.issued + 1);
            tokio::time::sleep(self.delay).await;
        }
        self.issued += 1;
    }

    pub fn issued(&self) -> u32 {
        self.issued
    }
}
