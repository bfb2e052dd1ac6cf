use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Delay applied before every masked authentication failure, to blunt
/// timing and enumeration attacks. Injected so tests can substitute a
/// deterministic implementation.
#[async_trait]
pub trait FailureDelay: Send + Sync {
    async fn delay(&self);
}

pub struct RandomDelay {
    min_ms: u64,
    max_ms: u64,
}

impl RandomDelay {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }
}

#[async_trait]
impl FailureDelay for RandomDelay {
    async fn delay(&self) {
        let ms = rand::thread_rng().gen_range(self.min_ms..=self.max_ms);
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_random_delay_stays_in_range() {
        let delay = RandomDelay::new(10, 20);

        let start = Instant::now();
        delay.delay().await;
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(10));
        // Generous upper bound to absorb scheduler slack.
        assert!(elapsed < Duration::from_millis(500));
    }
}
