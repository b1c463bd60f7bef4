// Core modules: error modeling, platform naming, path layout, filesystem and process helpers.
pub mod error;
pub mod fsutil;
pub mod layout;
pub mod platform;
pub mod process;
