//! Virtual Content pager - Entry Point

use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;
use virtual_content::config::{self, CliOverrides};
use virtual_content::model::ContentType;

/// Virtual Content - page through very large text or markup files
#[derive(Parser, Debug)]
#[command(name = "vcontent")]
#[command(version)]
#[command(about = "Terminal pager that renders only the chunks around the viewport")]
pub struct Args {
    /// File to page (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Maximum chunk length in characters
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: Option<u64>,

    /// Chunks kept on each side of the current one
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub threshold: Option<u64>,

    /// Keep chunks once rendered instead of sliding the window
    #[arg(long)]
    pub append: bool,

    /// Treat input as plain text
    #[arg(long, conflicts_with = "html")]
    pub text: bool,

    /// Treat input as HTML-like markup
    #[arg(long)]
    pub html: bool,

    /// Minimum milliseconds between scroll-driven updates
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Flags that override config file and environment values.
    fn overrides(&self) -> CliOverrides {
        let content_type = if self.text {
            Some(ContentType::Text)
        } else if self.html {
            Some(ContentType::Html)
        } else {
            None
        };

        CliOverrides {
            chunk_size: self.chunk_size.map(|n| n as usize),
            threshold: self.threshold.map(|n| n as usize),
            append: self.append.then_some(true),
            content_type,
            scroll_throttle_ms: self.throttle_ms,
        }
    }

    /// Title shown in the status line.
    fn title(&self) -> String {
        self.file
            .as_ref()
            .and_then(|path| path.file_name())
            .map_or_else(|| "stdin".to_string(), |name| name.to_string_lossy().into_owned())
    }
}

fn read_input(file: Option<&PathBuf>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let resolved = config::resolve(args.config.clone(), &args.overrides())?;

    virtual_content::logging::init(&resolved.log_file_path)?;

    info!(config = ?resolved, "Configuration loaded and resolved");

    let body = read_input(args.file.as_ref())?;
    info!(bytes = body.len(), source = %args.title(), "Input read");

    virtual_content::view::run_pager(resolved.content_config(), body, args.title())?;

    Ok(())
}
