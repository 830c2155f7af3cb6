//! TextStar Display Control Tool
//!
//! CLI for driving a TextStar serial display directly over its serial port.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use textstar_hw::{
    BarGraphStyle, CursorMove, CursorStyle, Display, ScrollDirection, SerialTransport,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;

#[derive(Parser)]
#[command(name = "textstarctl")]
#[command(about = "Control tool for TextStar serial displays")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial port (overrides the configuration file)
    #[arg(short, long)]
    port: Option<String>,

    /// Baud rate (overrides the configuration file)
    #[arg(short, long)]
    baud: Option<u32>,

    /// Key poll timeout in milliseconds (overrides the configuration file)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Log rejected commands and transport errors as warnings
    #[arg(long)]
    diagnostics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write text at the cursor position
    Text {
        /// Text to show (umlauts and ° are mapped to the display font)
        text: String,
    },
    /// Clear the display
    Clear,
    /// Set the cursor style
    Cursor {
        /// Style: none, block, block-flash, underline, underline-flash (or 0-4)
        style: CursorStyle,
    },
    /// Move the cursor to a line and optional column
    Position {
        /// Virtual line (1-16)
        line: u8,
        /// Column (1-16, omit for the line start)
        column: Option<u8>,
    },
    /// Scroll the visible window one line
    Scroll {
        /// Direction: up or down
        direction: ScrollDirection,
    },
    /// Draw a bar graph at the cursor position
    Bar {
        /// Style: capped (b) or uncapped (B)
        style: BarGraphStyle,
        /// Length in characters (1-16)
        length: u8,
        /// Fill percentage (0-100)
        percent: u8,
    },
    /// Move the cursor to the top left
    Home,
    /// Move the cursor one step
    Move {
        /// Direction: up, down, forward, back
        direction: CursorMove,
    },
    /// Print key events until interrupted
    Keys {
        /// Stop after this many events
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Write a configuration file with the current settings
    Init {
        /// Output file path
        #[arg(default_value = "textstar.toml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = resolve_config(&cli)?;

    let command = match cli.command {
        Commands::Init { output } => {
            config.save(&output)?;
            println!("Configuration written to: {}", output.display());
            return Ok(());
        }
        command => command,
    };

    let mut display = Display::open(&config.port, config.serial_settings())
        .with_context(|| format!("Failed to open display on {}", config.port))?
        .with_diagnostics(config.diagnostics);

    match command {
        Commands::Text { text } => display.send_text(&text)?,
        Commands::Clear => display.clear()?,
        Commands::Cursor { style } => display.set_cursor_style(style)?,
        Commands::Position { line, column } => display.set_cursor_position(line, column)?,
        Commands::Scroll { direction } => display.scroll(direction)?,
        Commands::Bar {
            style,
            length,
            percent,
        } => display.draw_bar_graph(style, length, percent)?,
        Commands::Home => display.cursor_home()?,
        Commands::Move { direction } => display.move_cursor(direction)?,
        Commands::Keys { count } => watch_keys(display, count).await?,
        Commands::Init { .. } => {}
    }

    Ok(())
}

/// Loads the configuration file, if any, and applies command-line overrides.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            info!("Loaded configuration from: {}", path.display());
            config
        }
        None => Config::default(),
    };

    if let Some(port) = &cli.port {
        config.port = port.clone();
    }
    if let Some(baud) = cli.baud {
        config.baud = baud;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.read_timeout_ms = timeout_ms;
    }
    config.diagnostics |= cli.diagnostics;

    Ok(config)
}

/// Polls for key events on a blocking thread until Ctrl-C or `count` events.
async fn watch_keys(display: Display<SerialTransport>, count: Option<usize>) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    let worker_stop = stop.clone();
    let mut worker = tokio::task::spawn_blocking(move || poll_keys(display, count, &worker_stop));

    tokio::select! {
        result = &mut worker => result.context("Key watcher failed")??,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping key watcher");
            stop.store(true, Ordering::Relaxed);
            worker.await.context("Key watcher failed")??;
        }
    }

    Ok(())
}

fn poll_keys(
    mut display: Display<SerialTransport>,
    count: Option<usize>,
    stop: &AtomicBool,
) -> Result<()> {
    let mut seen = 0;
    while !stop.load(Ordering::Relaxed) && count.map_or(true, |n| seen < n) {
        if let Some(event) = display.poll_key()? {
            let transition = if event.is_down() { "down" } else { "up" };
            println!("{} {}", event.key(), transition);
            seen += 1;
        }
    }
    display.close();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bar() {
        let cli = Cli::parse_from(["textstarctl", "bar", "B", "8", "65"]);
        match cli.command {
            Commands::Bar {
                style,
                length,
                percent,
            } => {
                assert_eq!(style, BarGraphStyle::Uncapped);
                assert_eq!(length, 8);
                assert_eq!(percent, 65);
            }
            _ => panic!("expected bar command"),
        }
        assert!(Cli::try_parse_from(["textstarctl", "bar", "x", "8", "65"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "textstarctl",
            "--port",
            "/dev/ttyAMA0",
            "--timeout-ms",
            "500",
            "--diagnostics",
            "clear",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.port, "/dev/ttyAMA0");
        assert_eq!(config.baud, 9600);
        assert_eq!(config.read_timeout_ms, 500);
        assert!(config.diagnostics);
    }
}
