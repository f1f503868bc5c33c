// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::Path;

/// A file appender that never rotates, writing to exactly `path_str`.
///
/// # Errors
///
/// When the path has no parent directory or no file name.
pub fn try_create(
    path_str: &str,
) -> miette::Result<tracing_appender::rolling::RollingFileAppender> {
    let path = Path::new(path_str);

    let parent = path.parent().ok_or_else(|| {
        miette::miette!("Log file path {} has no parent directory", path.display())
    })?;

    let file_name = path.file_name().ok_or_else(|| {
        miette::miette!("Log file path {} has no file name", path.display())
    })?;

    Ok(tracing_appender::rolling::never(parent, file_name))
}
