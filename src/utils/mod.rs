//! Cross-platform utilities: filesystem helpers, content hashing, and
//! user-facing warning output.

pub mod checksum;
pub mod fs;

use colored::Colorize;

pub use checksum::sha256_hash;
pub use fs::{atomic_write, ensure_dir, normalize_path_for_storage, write_file_0644};

/// Print a warning line to stderr.
///
/// Warnings never change the exit code; anything fatal propagates as an
/// error instead.
pub fn warn_user(msg: impl AsRef<str>) {
    eprintln!("{} {}", "Warning:".yellow().bold(), msg.as_ref());
}
