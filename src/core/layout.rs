//! Purpose: Derive every workspace and plugin path from two explicit roots.
//! Exports: `Layout`, `PluginLayout`, `GeneratedFile`, `GENERATED_FILES`, `SCHEMA_SOURCES`.
//! Role: Keep build, patch, and copy steps aligned on one directory map.
//! Invariants: No path here depends on the process working directory.
//! Invariants: The generated-file manifest is fixed and identical across platforms.
use std::path::{Path, PathBuf};

use crate::core::error::{Error, ErrorKind, io_error};
use crate::core::platform::{BuildConfig, Platform};

/// Export macro injected into generated classes so they carry the plugin's API visibility.
pub const EXPORT_MACRO: &str = "YARNSPINNER_API";

/// Include subdirectory the plugin exposes generated headers under.
pub const GENERATED_INCLUDE_DIR: &str = "YarnSpinnerCore";

/// Prefix of the core library binaries copied into the plugin (`libprotobuf.lib`, `libprotobuf.a`).
pub const LIBRARY_STEM: &str = "libprotobuf";

/// A schema definition living inside one of the vendored subtrees.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SchemaSource {
    pub subtree: &'static [&'static str],
    pub file_name: &'static str,
}

pub const SCHEMA_SOURCES: [SchemaSource; 2] = [
    SchemaSource {
        subtree: &["YarnSpinner", "YarnSpinner"],
        file_name: "yarn_spinner.proto",
    },
    SchemaSource {
        subtree: &["YarnSpinner-Console", "src", "YarnSpinner.Console"],
        file_name: "compiler_output.proto",
    },
];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GeneratedKind {
    Header,
    Source,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GeneratedFile {
    pub name: &'static str,
    pub kind: GeneratedKind,
    /// Header this file's pair is named after, e.g. `yarn_spinner.pb.h`.
    pub header: &'static str,
    /// Generated headers this file must include; patching fails if one is missing.
    pub requires: &'static [&'static str],
}

pub const GENERATED_FILES: [GeneratedFile; 4] = [
    GeneratedFile {
        name: "yarn_spinner.pb.h",
        kind: GeneratedKind::Header,
        header: "yarn_spinner.pb.h",
        requires: &[],
    },
    GeneratedFile {
        name: "compiler_output.pb.h",
        kind: GeneratedKind::Header,
        header: "compiler_output.pb.h",
        requires: &["yarn_spinner.pb.h"],
    },
    GeneratedFile {
        name: "yarn_spinner.pb.cc",
        kind: GeneratedKind::Source,
        header: "yarn_spinner.pb.h",
        requires: &["yarn_spinner.pb.h"],
    },
    GeneratedFile {
        name: "compiler_output.pb.cc",
        kind: GeneratedKind::Source,
        header: "compiler_output.pb.h",
        requires: &["compiler_output.pb.h"],
    },
];

/// Directories inside the workspace that the pipeline reads from and writes to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    root: PathBuf,
    out_dir: PathBuf,
    platform: Platform,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>, out_dir: Option<PathBuf>, platform: Platform) -> Self {
        let root = root.into();
        let out_dir = out_dir.unwrap_or_else(|| root.join("out"));
        Self {
            root,
            out_dir,
            platform,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn protobuf_source_dir(&self) -> PathBuf {
        self.root.join("protobuf")
    }

    pub fn protobuf_build_dir(&self) -> PathBuf {
        self.out_dir.join("protobuf_build")
    }

    pub fn protobuf_install_dir(&self) -> PathBuf {
        self.out_dir.join("protobuf_install")
    }

    pub fn protobuf_include_dir(&self) -> PathBuf {
        self.protobuf_install_dir().join("include")
    }

    pub fn protobuf_lib_dir(&self, config: BuildConfig) -> PathBuf {
        self.protobuf_install_dir()
            .join("lib")
            .join(self.platform.dir_name())
            .join(config.name())
    }

    pub fn protoc_path(&self) -> PathBuf {
        self.protobuf_install_dir()
            .join("bin")
            .join(format!("protoc{}", self.platform.exe_suffix()))
    }

    pub fn schema_build_dir(&self) -> PathBuf {
        self.out_dir.join("YarnSpinner_proto_build")
    }

    pub fn schema_install_dir(&self) -> PathBuf {
        self.out_dir.join("YarnSpinner_proto_install")
    }

    pub fn schema_source_path(&self, source: &SchemaSource) -> PathBuf {
        let mut path = self.root.clone();
        path.extend(source.subtree);
        path.join(source.file_name)
    }

    pub fn generated_path(&self, file: &GeneratedFile) -> PathBuf {
        self.schema_install_dir().join(file.name)
    }
}

/// Destination directories inside the YarnSpinner Unreal plugin.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PluginLayout {
    root: PathBuf,
}

impl PluginLayout {
    /// Validates that `root` exists and resolves it to an absolute path.
    pub fn resolve(root: &Path) -> Result<Self, Error> {
        if !root.exists() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("plugin path does not exist: {}", root.display()))
                .with_path(root)
                .with_hint("Pass --plugin-path pointing at the YarnSpinner Unreal plugin."));
        }
        let root = root
            .canonicalize()
            .map_err(|err| io_error("failed to resolve plugin path", root, err))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn third_party_module_dir(&self) -> PathBuf {
        self.root.join("Source").join("ThirdParty").join("YSProtobuf")
    }

    pub fn include_dir(&self) -> PathBuf {
        self.third_party_module_dir().join("include")
    }

    pub fn lib_dir(&self, platform: Platform, config: BuildConfig) -> PathBuf {
        self.third_party_module_dir()
            .join("lib")
            .join(platform.dir_name())
            .join(config.name())
    }

    pub fn public_dir(&self) -> PathBuf {
        self.root
            .join("Source")
            .join("YarnSpinner")
            .join("Public")
            .join(GENERATED_INCLUDE_DIR)
    }

    pub fn private_dir(&self) -> PathBuf {
        self.root
            .join("Source")
            .join("YarnSpinner")
            .join("Private")
            .join(GENERATED_INCLUDE_DIR)
    }

    pub fn destination_dir(&self, kind: GeneratedKind) -> PathBuf {
        match kind {
            GeneratedKind::Header => self.public_dir(),
            GeneratedKind::Source => self.private_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn workspace_dirs_derive_from_out_dir() {
        let layout = Layout::new("/ws", None, Platform::Mac);
        assert_eq!(layout.out_dir(), Path::new("/ws/out"));
        assert_eq!(layout.protobuf_source_dir(), Path::new("/ws/protobuf"));
        assert_eq!(layout.protobuf_build_dir(), Path::new("/ws/out/protobuf_build"));
        assert_eq!(layout.protobuf_install_dir(), Path::new("/ws/out/protobuf_install"));
        assert_eq!(
            layout.schema_build_dir(),
            Path::new("/ws/out/YarnSpinner_proto_build")
        );
        assert_eq!(
            layout.schema_install_dir(),
            Path::new("/ws/out/YarnSpinner_proto_install")
        );
    }

    #[test]
    fn out_dir_override_moves_every_output() {
        let layout = Layout::new("/ws", Some("/tmp/build".into()), Platform::Mac);
        assert_eq!(layout.protobuf_build_dir(), Path::new("/tmp/build/protobuf_build"));
        assert_eq!(layout.protobuf_source_dir(), Path::new("/ws/protobuf"));
    }

    #[test]
    fn protoc_path_follows_platform() {
        let mac = Layout::new("/ws", None, Platform::Mac);
        let win = Layout::new("/ws", None, Platform::Win64);
        assert_eq!(mac.protoc_path(), Path::new("/ws/out/protobuf_install/bin/protoc"));
        assert_eq!(
            win.protoc_path(),
            Path::new("/ws/out/protobuf_install/bin/protoc.exe")
        );
    }

    #[test]
    fn lib_dirs_use_platform_and_config_names() {
        let layout = Layout::new("/ws", None, Platform::Win64);
        assert_eq!(
            layout.protobuf_lib_dir(BuildConfig::Debug),
            Path::new("/ws/out/protobuf_install/lib/Win64/Debug")
        );
    }

    #[test]
    fn schema_sources_live_in_separate_subtrees() {
        let layout = Layout::new("/ws", None, Platform::Mac);
        assert_eq!(
            layout.schema_source_path(&SCHEMA_SOURCES[0]),
            Path::new("/ws/YarnSpinner/YarnSpinner/yarn_spinner.proto")
        );
        assert_eq!(
            layout.schema_source_path(&SCHEMA_SOURCES[1]),
            Path::new("/ws/YarnSpinner-Console/src/YarnSpinner.Console/compiler_output.proto")
        );
    }

    #[test]
    fn manifest_has_two_pairs() {
        let headers = GENERATED_FILES
            .iter()
            .filter(|file| file.kind == GeneratedKind::Header)
            .count();
        assert_eq!(headers, 2);
        for file in GENERATED_FILES {
            let stem = file.name.rsplit_once('.').map(|(stem, _)| stem);
            assert_eq!(stem, file.header.rsplit_once('.').map(|(stem, _)| stem));
        }
    }

    #[test]
    fn every_source_requires_its_own_header() {
        for file in GENERATED_FILES {
            if file.kind == GeneratedKind::Source {
                assert!(file.requires.contains(&file.header), "{}", file.name);
            }
            for required in file.requires {
                assert!(
                    GENERATED_FILES
                        .iter()
                        .any(|other| other.kind == GeneratedKind::Header && other.name == *required)
                );
            }
        }
    }

    #[test]
    fn missing_plugin_root_is_usage_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = PluginLayout::resolve(&temp.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn plugin_dirs_follow_module_layout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let plugin = PluginLayout::resolve(temp.path()).expect("resolve");
        let root = plugin.root().to_path_buf();
        assert_eq!(
            plugin.lib_dir(Platform::Mac, BuildConfig::Release),
            root.join("Source/ThirdParty/YSProtobuf/lib/Mac/Release")
        );
        assert_eq!(
            plugin.destination_dir(GeneratedKind::Header),
            root.join("Source/YarnSpinner/Public/YarnSpinnerCore")
        );
        assert_eq!(
            plugin.destination_dir(GeneratedKind::Source),
            root.join("Source/YarnSpinner/Private/YarnSpinnerCore")
        );
    }
}
