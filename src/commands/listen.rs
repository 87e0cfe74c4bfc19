//! Recognition polling

use std::thread;
use std::time::Duration;

use isrmod_core::device::{IsrModule, Recognition};
use isrmod_core::transport::RegisterTransport;

/// Poll the result register and print every wake word or command word
///
/// Runs until `count` results were printed, or forever without a count.
/// A failed read looks the same as silence and is skipped.
pub fn run_listen<T: RegisterTransport>(
    module: &mut IsrModule<T>,
    interval: Duration,
    count: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!("Listening (poll interval {} ms)", interval.as_millis());
    let mut heard = 0u32;

    loop {
        if count.is_some_and(|limit| heard >= limit) {
            break;
        }

        match module.recognition() {
            Recognition::NoMatch => {}
            Recognition::WakeWord => {
                println!("wake word");
                heard += 1;
            }
            Recognition::Command(id) => {
                println!("command {}", id);
                heard += 1;
            }
        }

        thread::sleep(interval);
    }

    Ok(())
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::commands::open_module;

    #[test]
    fn test_zero_count_returns_immediately() {
        let mut module = open_module("dummy").unwrap();
        run_listen(&mut module, Duration::from_millis(1), Some(0)).unwrap();
    }
}
