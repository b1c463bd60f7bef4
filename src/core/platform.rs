//! Purpose: Name the supported host platforms and build configurations in one place.
//! Exports: `Platform`, `BuildConfig`.
//! Role: Every platform- or config-dependent string used by the build and copy steps.
//! Invariants: Only `Platform::detect` can observe an unsupported host.
//! Invariants: Install subdirectory names match the names cmake writes under `lib/`.
use std::fmt;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Platform {
    Win64,
    Mac,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Win64, Platform::Mac];

    /// Detects the platform of the running host.
    pub fn detect() -> Result<Self, Error> {
        Self::from_os(std::env::consts::OS)
    }

    /// Maps a `std::env::consts::OS` value to a supported platform.
    pub fn from_os(os: &str) -> Result<Self, Error> {
        match os {
            "windows" => Ok(Platform::Win64),
            "macos" => Ok(Platform::Mac),
            other => Err(Error::new(ErrorKind::Unsupported)
                .with_message(format!("unsupported platform: {other}"))
                .with_hint("Run on Windows or macOS, or pass --platform win64|mac.")),
        }
    }

    /// Directory name used under `lib/` in both the install tree and the plugin.
    pub fn dir_name(self) -> &'static str {
        match self {
            Platform::Win64 => "Win64",
            Platform::Mac => "Mac",
        }
    }

    pub fn exe_suffix(self) -> &'static str {
        match self {
            Platform::Win64 => ".exe",
            Platform::Mac => "",
        }
    }

    /// Generator selection passed to the cmake configure step.
    pub fn generator_args(self) -> Vec<String> {
        match self {
            Platform::Win64 => vec![
                "-G".to_string(),
                "Visual Studio 16 2019".to_string(),
                "-A".to_string(),
                "x64".to_string(),
            ],
            Platform::Mac => vec!["-G".to_string(), "Xcode".to_string()],
        }
    }

    /// Runtime-linkage cache entries; protobuf must link the same CRT as Unreal.
    pub fn runtime_defines(self) -> Vec<String> {
        match self {
            Platform::Win64 => vec![
                "-DCMAKE_MSVC_RUNTIME_LIBRARY=MultiThreadedDLL".to_string(),
                // CMP0091 makes cmake >= 3.15 honor CMAKE_MSVC_RUNTIME_LIBRARY.
                "-DCMAKE_POLICY_DEFAULT_CMP0091=NEW".to_string(),
                "-Dprotobuf_MSVC_STATIC_RUNTIME=OFF".to_string(),
            ],
            Platform::Mac => Vec::new(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BuildConfig {
    Debug,
    Release,
}

impl BuildConfig {
    pub const ALL: [BuildConfig; 2] = [BuildConfig::Debug, BuildConfig::Release];

    pub fn name(self) -> &'static str {
        match self {
            BuildConfig::Debug => "Debug",
            BuildConfig::Release => "Release",
        }
    }

    /// Generator expression that evaluates to the active configuration name.
    pub fn generator_expression() -> String {
        Self::ALL
            .iter()
            .map(|config| format!("$<$<CONFIG:{0}>:{0}>", config.name()))
            .collect()
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
