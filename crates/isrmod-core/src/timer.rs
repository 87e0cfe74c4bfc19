//! Time source and transport timing configuration

/// Monotonic millisecond clock with a blocking delay
///
/// Transports sleep through this trait so tests and emulators can run
/// against simulated time.
pub trait Timer {
    /// Milliseconds since an arbitrary fixed point
    fn now_ms(&self) -> u64;

    /// Block for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);

    /// Milliseconds elapsed since `start` (a previous [`Timer::now_ms`] value)
    fn elapsed_ms(&self, start: u64) -> u64 {
        self.now_ms().saturating_sub(start)
    }
}

impl<T: Timer + ?Sized> Timer for &mut T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

/// Delays and timeouts used by the transports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Wait after every register write so the module can process it
    pub write_settle_ms: u32,
    /// Wait between a read request and fetching the response
    pub read_settle_ms: u32,
    /// Stream transport: give up collecting a response after this long
    pub read_timeout_ms: u32,
    /// Stream transport: sleep between availability polls (at least 1 ms)
    pub poll_interval_ms: u32,
    /// Wait after the bring-up write before the module accepts commands
    pub init_settle_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            write_settle_ms: 500,
            read_settle_ms: 50,
            read_timeout_ms: 200,
            poll_interval_ms: 1,
            init_settle_ms: 1000,
        }
    }
}

impl Timing {
    /// No settle delays, for emulated peripherals and tests.
    ///
    /// The stream read timeout is kept so a silent peer still ends the read.
    pub fn immediate() -> Self {
        Self {
            write_settle_ms: 0,
            read_settle_ms: 0,
            init_settle_ms: 0,
            ..Self::default()
        }
    }

    /// Set the post-write settle delay
    pub fn with_write_settle(mut self, ms: u32) -> Self {
        self.write_settle_ms = ms;
        self
    }

    /// Set the read request to response delay
    pub fn with_read_settle(mut self, ms: u32) -> Self {
        self.read_settle_ms = ms;
        self
    }

    /// Set the stream read timeout
    pub fn with_read_timeout(mut self, ms: u32) -> Self {
        self.read_timeout_ms = ms;
        self
    }

    /// Set the stream poll interval
    pub fn with_poll_interval(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the bring-up settle delay
    pub fn with_init_settle(mut self, ms: u32) -> Self {
        self.init_settle_ms = ms;
        self
    }
}

#[cfg(feature = "std")]
pub use self::std_timer::StdTimer;

#[cfg(feature = "std")]
mod std_timer {
    use super::Timer;
    use std::time::{Duration, Instant};

    /// Wall-clock timer backed by `std::time::Instant` and `thread::sleep`
    #[derive(Debug, Clone, Copy)]
    pub struct StdTimer {
        origin: Instant,
    }

    impl StdTimer {
        /// Create a timer whose zero is now
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
            }
        }
    }

    impl Default for StdTimer {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Timer for StdTimer {
        fn now_ms(&self) -> u64 {
            self.origin.elapsed().as_millis() as u64
        }

        fn delay_ms(&mut self, ms: u32) {
            if ms > 0 {
                std::thread::sleep(Duration::from_millis(ms as u64));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing() {
        let timing = Timing::default();
        assert_eq!(timing.write_settle_ms, 500);
        assert_eq!(timing.read_settle_ms, 50);
        assert_eq!(timing.read_timeout_ms, 200);
        assert_eq!(timing.init_settle_ms, 1000);
    }

    #[test]
    fn test_immediate_keeps_timeout() {
        let timing = Timing::immediate().with_read_timeout(20);
        assert_eq!(timing.write_settle_ms, 0);
        assert_eq!(timing.read_settle_ms, 0);
        assert_eq!(timing.read_timeout_ms, 20);
    }
}
