//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Extension given to compressed files.
pub const ZST_EXTENSION: &str = "zst";

/// Create a byte progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    pb.set_style(style);
    pb
}

/// `input.zst` for compression output.
pub fn compressed_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(ZST_EXTENSION);
    PathBuf::from(name)
}

/// `input` minus its `.zst` extension, or `input.out` if it has none.
pub fn decompressed_path(input: &Path) -> PathBuf {
    match input.extension() {
        Some(ext) if ext == ZST_EXTENSION => input.with_extension(""),
        _ => {
            let mut name = input.as_os_str().to_owned();
            name.push(".out");
            PathBuf::from(name)
        }
    }
}

/// Space saved, as a percentage of the original size.
pub fn savings_percent(original: u64, compressed: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - compressed as f64 / original as f64) * 100.0
}
