use console::{style, StyledObject};
use std::{
    fmt::Arguments,
    sync::atomic::{AtomicBool, Ordering},
};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Show `debug!` messages from now on
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Success,
    DueTo,
}

fn prefix(level: Level) -> StyledObject<&'static str> {
    match level {
        Level::Debug => style("DEBUG").dim(),
        Level::Info => style("INFO ").on_blue().bright(),
        Level::Warn => style("WARN ").on_yellow().bright(),
        Level::Error => style("ERROR").on_red().bright(),
        Level::Success => style(" OK  ").on_green().bright(),
        Level::DueTo => style("DUE TO").yellow(),
    }
}

/// Log lines go to stderr so `show` output on stdout stays clean
pub fn write_log(level: Level, args: Arguments) {
    if level == Level::Debug && !is_verbose() {
        return;
    }
    eprintln!("{} {}", prefix(level), args);
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        $crate::cli::write_log($crate::cli::Level::Debug, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::cli::write_log($crate::cli::Level::Info, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::cli::write_log($crate::cli::Level::Warn, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::cli::write_log($crate::cli::Level::Error, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::cli::write_log($crate::cli::Level::Success, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! due_to {
    ($($arg:tt)+) => {
        $crate::cli::write_log($crate::cli::Level::DueTo, format_args!($($arg)+))
    };
}
