// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::IntoDiagnostic;
use tracing::subscriber::DefaultGuard;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, Registry,
                         layer::SubscriberExt,
                         registry::LookupSpan,
                         util::SubscriberInitExt};

use super::{DisplayPreference, TracingConfig, WriterConfig, rolling_file_appender_impl};

/// Shared `fmt` layer settings. A macro rather than a function so the builder's type
/// never has to be spelled out.
macro_rules! create_fmt {
    () => {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(true)
    };
}

pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Installs a global subscriber built from `options`. Does nothing when the level filter
/// is [`LevelFilter::OFF`].
///
/// # Errors
///
/// When the log file can't be created, or a global subscriber is already set.
pub fn try_initialize_logging_global(
    options: impl Into<TracingConfig>,
) -> miette::Result<()> {
    let tracing_config: TracingConfig = options.into();
    if tracing_config.get_level_filter() == LevelFilter::OFF {
        return Ok(());
    }

    let layers = try_create_layers(tracing_config)?;
    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .into_diagnostic()
}

/// Like [`try_initialize_logging_global`], but only for the calling thread, and only
/// until the returned guard drops. Returns [`None`] when logging is off.
///
/// # Errors
///
/// When the log file can't be created.
pub fn try_initialize_logging_thread_local(
    options: impl Into<TracingConfig>,
) -> miette::Result<Option<DefaultGuard>> {
    let tracing_config: TracingConfig = options.into();
    if tracing_config.get_level_filter() == LevelFilter::OFF {
        return Ok(None);
    }

    let layers = try_create_layers(tracing_config)?;
    let subscriber = tracing_subscriber::registry().with(layers);
    Ok(Some(tracing::subscriber::set_default(subscriber)))
}

/// Builds the layers for `tracing_config` without installing anything. A subscriber is
/// assembled from them with `tracing_subscriber::registry().with(layers)`.
///
/// # Errors
///
/// When the log file can't be created.
pub fn try_create_layers(
    tracing_config: TracingConfig,
) -> miette::Result<Vec<Box<DynLayer<Registry>>>> {
    let level_filter = tracing_config.get_level_filter();
    let writer_config = tracing_config.get_writer_config();

    let mut layers: Vec<Box<DynLayer<Registry>>> = vec![Box::new(level_filter)];

    if let Some(layer) = try_create_display_layer(level_filter, writer_config.clone())? {
        layers.push(layer);
    }
    if let Some(layer) = try_create_file_layer(level_filter, writer_config)? {
        layers.push(layer);
    }

    Ok(layers)
}

/// Returns [`None`] if `writer_config` doesn't write to stdout or stderr.
///
/// # Errors
///
/// Never at the moment. Fallible to match [`try_create_file_layer`].
pub fn try_create_display_layer<S>(
    level_filter: LevelFilter,
    writer_config: WriterConfig,
) -> miette::Result<Option<Box<DynLayer<S>>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = create_fmt!();

    Ok(match writer_config {
        WriterConfig::DisplayAndFile(display_pref, _)
        | WriterConfig::Display(display_pref) => match display_pref {
            DisplayPreference::Stdout => Some(Box::new(
                fmt_layer
                    .with_writer(std::io::stdout)
                    .with_filter(level_filter),
            )),
            DisplayPreference::Stderr => Some(Box::new(
                fmt_layer
                    .with_writer(std::io::stderr)
                    .with_filter(level_filter),
            )),
        },
        WriterConfig::None | WriterConfig::File(_) => None,
    })
}

/// Returns [`None`] if `writer_config` doesn't write to a file. The file is created
/// right away.
///
/// # Errors
///
/// When the log file path is unusable.
pub fn try_create_file_layer<S>(
    level_filter: LevelFilter,
    writer_config: WriterConfig,
) -> miette::Result<Option<Box<DynLayer<S>>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let fmt_layer = create_fmt!().with_ansi(false);

    Ok(match writer_config {
        WriterConfig::DisplayAndFile(_, log_file_path)
        | WriterConfig::File(log_file_path) => {
            let file = rolling_file_appender_impl::try_create(log_file_path.as_str())?;
            Some(Box::new(
                fmt_layer.with_writer(file).with_filter(level_filter),
            ))
        }
        WriterConfig::None | WriterConfig::Display(_) => None,
    })
}
