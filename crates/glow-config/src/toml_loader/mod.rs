//! TOML dataset loading.

mod loader;


pub use loader::{load_from_path, load_validated, parse_str};
