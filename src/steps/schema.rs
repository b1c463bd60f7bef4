//! Purpose: Stage the YarnSpinner schema definitions and run protoc over them.
//! Exports: `protoc_command`, `compile`.
//! Role: Emits the two generated header/source pairs into the schema install directory.
//! Invariants: Schema build and install directories are recreated empty on every run.
//! Invariants: Missing schema files or a missing protoc stop the run before protoc starts.
use std::path::Path;

use crate::core::error::{Error, ErrorKind};
use crate::core::fsutil::{copy_into, reset_dir};
use crate::core::layout::{EXPORT_MACRO, Layout, SCHEMA_SOURCES};
use crate::core::process::Tool;

pub fn protoc_command(layout: &Layout, protoc: &Path) -> Tool {
    Tool::new(protoc, layout.root())
        .arg(format!(
            "--proto_path={}",
            layout.schema_build_dir().display()
        ))
        .arg(format!(
            "--cpp_out=dllexport_decl={EXPORT_MACRO}:{}",
            layout.schema_install_dir().display()
        ))
        .args(SCHEMA_SOURCES.iter().map(|source| source.file_name))
}

pub fn compile(layout: &Layout) -> Result<(), Error> {
    let build_dir = layout.schema_build_dir();
    reset_dir(&build_dir)?;
    reset_dir(&layout.schema_install_dir())?;

    for source in &SCHEMA_SOURCES {
        let path = layout.schema_source_path(source);
        if !path.is_file() {
            return Err(Error::new(ErrorKind::NotFound)
                .with_message(format!("proto file not found: {}", source.file_name))
                .with_path(path)
                .with_hint("Run without --skip-submodules so the vendored subtrees are fetched."));
        }
        copy_into(&path, &build_dir)?;
    }

    let protoc = layout.protoc_path();
    if !protoc.is_file() {
        return Err(Error::new(ErrorKind::NotFound)
            .with_message("protoc not found")
            .with_path(protoc)
            .with_hint("The protobuf build step installs protoc; check its output."));
    }

    protoc_command(layout, &protoc).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::platform::Platform;
    use std::fs;

    fn seed_schemas(layout: &Layout) {
        for source in &SCHEMA_SOURCES {
            let path = layout.schema_source_path(source);
            fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
            fs::write(&path, format!("// {}", source.file_name)).expect("write");
        }
    }

    #[test]
    fn command_exports_plugin_api_macro() {
        let layout = Layout::new("/ws", None, Platform::Win64);
        let tool = protoc_command(&layout, &layout.protoc_path());
        let args: Vec<String> = tool
            .arg_list()
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                format!("--proto_path={}", layout.schema_build_dir().display()),
                format!(
                    "--cpp_out=dllexport_decl=YARNSPINNER_API:{}",
                    layout.schema_install_dir().display()
                ),
                "yarn_spinner.proto".to_string(),
                "compiler_output.proto".to_string(),
            ]
        );
        assert!(tool.program().ends_with("protoc.exe"));
    }

    #[test]
    fn missing_schema_is_not_found() {
        let temp = tempfile::tempdir().expect("tempdir");
        let layout = Layout::new(temp.path(), None, Platform::Mac);

        let err = compile(&layout).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.path().unwrap().ends_with("yarn_spinner.proto"));
    }

    #[test]
    fn missing_protoc_is_not_found_after_staging() {
        let temp = tempfile::tempdir().expect("tempdir");
        let layout = Layout::new(temp.path(), None, Platform::Mac);
        seed_schemas(&layout);

        let err = compile(&layout).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.path(), Some(layout.protoc_path().as_path()));
        for source in &SCHEMA_SOURCES {
            assert!(layout.schema_build_dir().join(source.file_name).is_file());
        }
    }

    #[test]
    fn stale_outputs_are_cleared() {
        let temp = tempfile::tempdir().expect("tempdir");
        let layout = Layout::new(temp.path(), None, Platform::Mac);
        fs::create_dir_all(layout.schema_install_dir()).expect("mkdir");
        fs::write(layout.schema_install_dir().join("old.pb.h"), b"old").expect("write");

        let _ = compile(&layout);

        assert!(!layout.schema_install_dir().join("old.pb.h").exists());
        assert!(layout.schema_install_dir().is_dir());
    }
}
