// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::time::Duration;

/// How long the Windows capture loop sleeps when no key is waiting.
pub const DEFAULT_CONSOLE_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Construction options shared by both controllers. Fields that don't apply to the
/// current platform are ignored.
///
/// A plain `bool` converts into options with that value for
/// [`install_signal_handler`](Self::install_signal_handler):
///
/// ```no_run
/// # #[cfg(unix)]
/// # fn main() -> miette::Result<()> {
/// use keyboard_handler::KeyboardHandler;
/// let handler = KeyboardHandler::with_options(false)?;
/// # Ok(())
/// # }
/// # #[cfg(not(unix))]
/// # fn main() {}
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardHandlerOptions {
    /// Unix only. Install a `SIGINT` handler that restores the terminal mode before the
    /// process dies. When `false`, call
    /// [`restore_buffer_mode_for_stdin`](crate::restore_buffer_mode_for_stdin) from
    /// your own termination path instead.
    pub install_signal_handler: bool,
    /// Windows only. Sleep between polls of the console.
    pub console_poll_interval: Duration,
}

impl Default for KeyboardHandlerOptions {
    fn default() -> Self {
        Self {
            install_signal_handler: true,
            console_poll_interval: DEFAULT_CONSOLE_POLL_INTERVAL,
        }
    }
}

impl From<bool> for KeyboardHandlerOptions {
    fn from(install_signal_handler: bool) -> Self {
        Self {
            install_signal_handler,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_bool() {
        let options = KeyboardHandlerOptions::from(false);
        assert!(!options.install_signal_handler);
        assert_eq!(options.console_poll_interval, DEFAULT_CONSOLE_POLL_INTERVAL);
        assert_eq!(KeyboardHandlerOptions::from(true), KeyboardHandlerOptions::default());
    }
}
