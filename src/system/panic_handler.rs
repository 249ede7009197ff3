//! Panic handler
//!
//! A panic inside a job run is reported on stderr and appended to a crash
//! log, so that an external scheduler (cron, systemd timer) leaves a trace
//! even when stdout is discarded.

use std::fs::OpenOptions;
use std::io::Write;
use std::panic;
use std::path::PathBuf;

use chrono::Utc;

/// Install custom panic hook writing to `crash_log`
pub fn install_panic_hook(crash_log: PathBuf) {
    panic::set_hook(Box::new(move |panic_info| {
        let payload = panic_info.payload();
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "Unknown location".to_string());

        let backtrace = std::backtrace::Backtrace::force_capture();
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

        if let Err(e) = write_crash_log(&crash_log, &timestamp, &message, &location, &backtrace) {
            eprintln!("Failed to write crash log: {}", e);
        }

        display_panic(&message, &location, &crash_log);
    }));
}

fn display_panic(message: &str, location: &str, crash_log: &std::path::Path) {
    use colored::Colorize;

    eprintln!();
    eprintln!("{} {}", "PANIC".red().bold(), message.white());
    eprintln!("{} {}", "Location:".yellow().bold(), location.white());
    eprintln!(
        "{}",
        format!("Details saved to {}", crash_log.display()).cyan()
    );
    eprintln!();
}

fn write_crash_log(
    path: &std::path::Path,
    timestamp: &str,
    message: &str,
    location: &str,
    backtrace: &std::backtrace::Backtrace,
) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    writeln!(file, "==========================================")?;
    writeln!(file, "Crash Report - {}", timestamp)?;
    writeln!(file, "==========================================")?;
    writeln!(file, "Message: {}", message)?;
    writeln!(file, "Location: {}", location)?;
    writeln!(file, "\nBacktrace:")?;
    writeln!(file, "{:?}", backtrace)?;
    writeln!(file, "==========================================\n")?;

    Ok(())
}
