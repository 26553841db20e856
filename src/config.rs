//! Configuration and CLI argument handling

use clap::Parser;

use crate::services::{AppSettings, GlobalFlags, WindowHandle};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "magpie-shell")]
#[command(about = "Scale-activation shell for a screen magnifier")]
#[command(version)]
pub struct Config {
    /// Port for the local control API
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Countdown length in seconds before automatic activation
    #[arg(short, long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=5))]
    pub down_count: u32,

    /// Remember the magnified window and magnify it again when it regains focus
    #[arg(long)]
    pub auto_restore: bool,

    /// Host window (raw HWND) whose sizing border is restored after magnification
    #[arg(long, value_parser = parse_window_handle)]
    pub host_window: Option<WindowHandle>,

    #[arg(long)]
    pub breakpoint_mode: bool,

    #[arg(long)]
    pub disable_effect_cache: bool,

    #[arg(long)]
    pub save_effect_sources: bool,

    #[arg(long)]
    pub warnings_are_errors: bool,

    #[arg(long)]
    pub simulate_exclusive_fullscreen: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_window_handle(s: &str) -> Result<WindowHandle, String> {
    let raw = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    }
    .map_err(|e| format!("invalid window handle {:?}: {}", s, e))?;

    WindowHandle::from_raw(raw).ok_or_else(|| "window handle must not be 0".to_string())
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            breakpoint_mode: self.breakpoint_mode,
            disable_effect_cache: self.disable_effect_cache,
            save_effect_sources: self.save_effect_sources,
            warnings_are_errors: self.warnings_are_errors,
            simulate_exclusive_fullscreen: self.simulate_exclusive_fullscreen,
        }
    }

    /// Build the runtime settings store from the command line
    pub fn app_settings(&self) -> AppSettings {
        AppSettings::new(self.down_count, self.auto_restore, self.global_flags())
    }
}
