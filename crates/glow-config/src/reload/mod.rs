//! Live config reload: file watcher + loader.

mod manager;


pub use manager::ReloadManager;
