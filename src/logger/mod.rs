//! Logger module
//!
//! Provides logging utilities for the portal including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Leveled error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::http::format_allow;
use crate::routing::Router;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

/// Log severity, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config
        .logging
        .level
        .parse::<LogLevel>()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    writer::init(
        level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write(level: LogLevel, message: &str) {
    match writer::get() {
        Some(w) => w.write(level, message),
        None if level >= LogLevel::Warn => eprintln!("{message}"),
        None if level == LogLevel::Info => println!("{message}"),
        None => {}
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, router: &Router) {
    write(LogLevel::Info, "======================================");
    write(LogLevel::Info, "Career portal started");
    write(LogLevel::Info, &format!("Listening on: http://{addr}"));
    write(LogLevel::Info, &format!("Routes registered: {}", router.len()));
    for route in router.routes() {
        log_debug(&format!("  {} [{}]", route.pattern, format_allow(&route.methods)));
    }
    write(
        LogLevel::Info,
        &format!("Templates: {}", config.site.templates_dir),
    );
    write(
        LogLevel::Info,
        &format!(
            "Static assets: {} -> {}",
            config.site.static_prefix, config.site.static_dir
        ),
    );
    write(LogLevel::Info, &format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write(LogLevel::Info, &format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write(LogLevel::Info, &format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write(LogLevel::Info, &format!("Error log: {path}"));
    }
    write(LogLevel::Info, "======================================\n");
}

pub fn log_info(message: &str) {
    write(LogLevel::Info, message);
}

pub fn log_debug(message: &str) {
    write(LogLevel::Debug, &format!("[DEBUG] {message}"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl fmt::Debug) {
    write(
        LogLevel::Error,
        &format!("[ERROR] Failed to serve connection: {err:?}"),
    );
}

pub fn log_error(message: &str) {
    write(LogLevel::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write(LogLevel::Warn, &format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

pub fn log_shutdown_requested(signal: &str) {
    write(
        LogLevel::Info,
        &format!("\n[Shutdown] {signal} received, no longer accepting connections"),
    );
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        write(LogLevel::Info, "[Shutdown] All connections closed");
    } else {
        log_warning(&format!(
            "[Shutdown] Drain window elapsed with {remaining} connection(s) still open"
        ));
    }
}
