//! Configuration loading
//!
//! The configuration structures live in `provisor-domain`; this module
//! finds and parses them. Environment variables win; otherwise a config
//! file is probed from the working directory and the executable's
//! directory.

mod loader;

pub use loader::{load, load_from_env, load_from_file};
