// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! `tracing` setup for binaries that embed a keyboard handler.
//!
//! The library itself only emits events; nothing is printed until a subscriber is
//! installed, e.g. with [`try_initialize_logging_global`]. Logging is off by default.
//!
//! Stdout is usually the wrong place while a handler is active, since callbacks tend to
//! print there. Prefer [`DisplayPreference::Stderr`] or a file.

// Private modules (hide internal structure).
mod rolling_file_appender_impl;
mod tracing_config;
mod tracing_init;

// Re-export.
pub use tracing_config::*;
pub use tracing_init::*;
