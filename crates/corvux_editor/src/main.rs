use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use corvux_editor::{app, panic};
use directories::ProjectDirs;
use log::LevelFilter;

/// A small modal text editor.
#[derive(Parser, Debug)]
#[command(name = "corvux", version)]
struct Cli {
    /// File to open.
    file: Option<PathBuf>,

    /// Highlight as this file extension, e.g. `c` or `rs`.
    #[arg(long, value_name = "EXT")]
    syntax: Option<String>,

    /// Where to write the log. Defaults to the user cache directory.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[arg(long, value_name = "LEVEL", default_value = "debug")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_file, cli.log_level)?;

    panic::catch_and_reprint_panic(|| app::run(cli.file, cli.syntax)).context("panicked")??;

    Ok(())
}

/// Logs go to a file only: stderr belongs to the terminal while editing.
fn init_logging(log_file: Option<PathBuf>, level: LevelFilter) -> Result<()> {
    let path = match log_file {
        Some(path) => path,
        None => {
            let dirs = ProjectDirs::from("", "", "corvux")
                .context("couldn't find a cache directory, pass --log-file")?;

            let cache = dirs.cache_dir();
            fs::create_dir_all(cache)
                .with_context(|| format!("couldn't create {}", cache.display()))?;

            cache.join("corvux.log")
        }
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            let now = chrono::Local::now();

            out.finish(format_args!(
                "[{} {} {}] {}",
                now.format("%Y/%m/%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(fern::log_file(&path).with_context(|| format!("couldn't open {}", path.display()))?)
        .apply()?;

    Ok(())
}
