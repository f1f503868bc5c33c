// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use tracing_core::LevelFilter;

/// Where log output goes and how much of it. Anything that converts into this (a
/// [`tracing::Level`], a [`LevelFilter`], a [`WriterConfig`], a [`DisplayPreference`])
/// can be passed to [`try_initialize_logging_global`](crate::try_initialize_logging_global).
///
/// ```
/// use keyboard_handler::{DisplayPreference, TracingConfig};
/// use tracing_core::LevelFilter;
/// let config = TracingConfig::new_display(DisplayPreference::Stderr, LevelFilter::DEBUG);
/// assert_eq!(config.get_level_filter(), LevelFilter::DEBUG);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level_filter: LevelFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    /// Path of the log file, e.g. `/tmp/keyboard_handler.log`.
    File(String),
    DisplayAndFile(DisplayPreference, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
}

/// Logging off, with stderr as the writer once a level is set.
impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            writer_config: WriterConfig::Display(DisplayPreference::Stderr),
            level_filter: LevelFilter::OFF,
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn new_display(display_preference: DisplayPreference, level: LevelFilter) -> Self {
        Self {
            writer_config: WriterConfig::Display(display_preference),
            level_filter: level,
        }
    }

    #[must_use]
    pub fn new_file(path: impl Into<String>, level: LevelFilter) -> Self {
        Self {
            writer_config: WriterConfig::File(path.into()),
            level_filter: level,
        }
    }

    #[must_use]
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config.clone() }

    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { self.level_filter }
}

impl From<tracing::Level> for TracingConfig {
    fn from(level: tracing::Level) -> Self { LevelFilter::from_level(level).into() }
}

impl From<LevelFilter> for TracingConfig {
    fn from(level_filter: LevelFilter) -> Self {
        Self {
            level_filter,
            ..Default::default()
        }
    }
}

impl From<WriterConfig> for TracingConfig {
    fn from(writer_config: WriterConfig) -> Self {
        Self {
            writer_config,
            ..Default::default()
        }
    }
}

impl From<DisplayPreference> for TracingConfig {
    fn from(display_preference: DisplayPreference) -> Self {
        WriterConfig::Display(display_preference).into()
    }
}
