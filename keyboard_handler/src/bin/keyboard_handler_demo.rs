// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Prints every key press with its modifiers until `q` is pressed.
//!
//! ```sh
//! cargo run --bin keyboard_handler_demo -- --log-level debug --log-file /tmp/kh.log
//! ```

use clap::{Parser, ValueEnum};
use keyboard_handler::{CallbackHandle, HandlerState, KeyCode, KeyModifiers,
                       KeyboardHandler, KeyboardHandlerApi, KeyboardHandlerOptions,
                       TracingConfig, WriterConfig, DisplayPreference,
                       try_initialize_logging_global};
use std::sync::mpsc;
use strum::IntoEnumIterator;
use tracing_core::LevelFilter;

/// More info: <https://docs.rs/clap/latest/clap/_derive/#overview>
#[derive(Debug, Parser)]
#[command(bin_name = "keyboard_handler_demo")]
#[command(about = "Prints each key press with its modifiers. Press `q` to quit.")]
#[command(version)]
struct CLIArg {
    #[arg(
        long,
        help = "Don't hook SIGINT. Ctrl+C then leaves the terminal in raw mode; quit with `q` instead"
    )]
    no_signal_handler: bool,

    #[arg(long, value_enum, default_value_t = LogLevel::Off, help = "Log verbosity")]
    log_level: LogLevel,

    #[arg(
        long,
        value_name = "PATH",
        help = "Write logs to this file instead of stderr"
    )]
    log_file: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<&CLIArg> for TracingConfig {
    fn from(cli_arg: &CLIArg) -> Self {
        let writer_config = match &cli_arg.log_file {
            Some(path) => WriterConfig::File(path.clone()),
            None => WriterConfig::Display(DisplayPreference::Stderr),
        };
        TracingConfig {
            writer_config,
            level_filter: cli_arg.log_level.into(),
        }
    }
}

/// Modifier combinations the decoders can report for a single key press.
const WATCHED_MODIFIERS: [KeyModifiers; 4] = [
    KeyModifiers::NONE,
    KeyModifiers::SHIFT,
    KeyModifiers::ALT,
    KeyModifiers::CTRL,
];

fn main() -> miette::Result<()> {
    let cli_arg = CLIArg::parse();
    try_initialize_logging_global(&cli_arg)?;

    let options = KeyboardHandlerOptions::from(!cli_arg.no_signal_handler);
    let handler = KeyboardHandler::with_options(options)?;

    if handler.state() == HandlerState::Disabled {
        eprintln!("stdin is not an interactive terminal, nothing to capture");
        return Ok(());
    }

    let (quit_sender, quit_receiver) = mpsc::channel::<()>();
    let handles = register_all(&handler, &quit_sender);
    tracing::info!(message = "demo ready", callbacks = handles.len());
    println!("Press keys to see them decoded. Press `q` to quit.");

    // Blocks until `q`.
    let _unused = quit_receiver.recv();

    for handle in handles {
        handler.delete_key_press_callback(handle);
    }
    println!("Bye.");
    Ok(())
}

fn register_all(
    handler: &KeyboardHandler,
    quit_sender: &mpsc::Sender<()>,
) -> Vec<CallbackHandle> {
    let mut handles = vec![];
    for key_code in KeyCode::iter().filter(|it| *it != KeyCode::Unknown) {
        for modifiers in WATCHED_MODIFIERS {
            let quit_sender = quit_sender.clone();
            let handle = handler.add_key_press_callback(
                move |key_code, modifiers| {
                    println!("{modifiers} + {key_code}");
                    if key_code == KeyCode::Q && modifiers == KeyModifiers::NONE {
                        let _unused = quit_sender.send(());
                    }
                },
                key_code,
                modifiers,
            );
            if handle.is_valid() {
                handles.push(handle);
            }
        }
    }
    handles
}
