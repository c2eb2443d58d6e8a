use std::{
    cell::Cell,
    thread,
    time::{Duration, Instant},
};

/// Enforces a minimum delay between two consecutive requests.
#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last_request: Cell<Option<Instant>>,
}

impl Throttle {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: Cell::new(None),
        }
    }

    /// Block until the next request is allowed.
    pub fn wait(&self) {
        if let Some(last) = self.last_request.get() {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                thread::sleep(self.delay - elapsed);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_is_not_delayed() {
        let throttle = Throttle::new(Duration::from_secs(60));
        let start = Instant::now();
        throttle.wait();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn delay_consecutive_requests() {
        let throttle = Throttle::new(Duration::from_millis(50));
        let start = Instant::now();
        throttle.wait();
        throttle.wait();
        throttle.wait();
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
