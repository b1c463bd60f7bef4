//! Purpose: Library crate behind the `ysbuild` CLI and its tests.
//! Exports: `core` (errors, platform naming, layout, fs/process helpers), `steps`, `pipeline`.
//! Role: Builds protobuf and the YarnSpinner schemas, then installs them into the Unreal plugin.
//! Invariants: Every step takes its paths explicitly; nothing reads the working directory.
//! Invariants: Steps never create the plugin root; they only write beneath it.
pub mod core;
pub mod pipeline;
pub mod steps;
