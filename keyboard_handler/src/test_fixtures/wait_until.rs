// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{thread,
          time::{Duration, Instant}};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Polls `condition` until it holds or `timeout` runs out. Returns whether it held.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(POLL_INTERVAL);
    }
}
