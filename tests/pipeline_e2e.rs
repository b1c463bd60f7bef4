// End-to-end pipeline runs against fake git/cmake/protoc scripts.
#![cfg(unix)]

use std::collections::BTreeMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::Mutex;

// Writing an executable while another test forks can fail exec with ETXTBSY.
static SERIAL: Mutex<()> = Mutex::new(());

const FAKE_GIT: &str = "#!/bin/sh\ntouch submodules-updated\n";

const FAKE_PROTOC: &str = r##"#!/bin/sh
set -e
proto_path="${1#--proto_path=}"
out="${2#--cpp_out=dllexport_decl=YARNSPINNER_API:}"
test -f "$proto_path/$3"
test -f "$proto_path/$4"
printf 'class YARNSPINNER_API Node {};\n' > "$out/yarn_spinner.pb.h"
printf '#include "yarn_spinner.pb.h"\nclass YARNSPINNER_API Output {};\n' > "$out/compiler_output.pb.h"
printf '#include "yarn_spinner.pb.h"\nint node;\n' > "$out/yarn_spinner.pb.cc"
printf '#include "compiler_output.pb.h"\nint output;\n' > "$out/compiler_output.pb.cc"
"##;

fn fake_cmake(protoc: &Path) -> String {
    format!(
        r##"#!/bin/sh
set -e
if [ "$1" = "-S" ]; then
  mkdir -p "$4"
  echo configured > "$4/CMakeCache.txt"
  exit 0
fi
if [ "$1" = "--build" ]; then
  config="$6"
  install="$(dirname "$2")/protobuf_install"
  mkdir -p "$install/include/google/protobuf" "$install/lib/Mac/$config" "$install/bin"
  echo "// message.h" > "$install/include/google/protobuf/message.h"
  echo "$config" > "$install/lib/Mac/$config/libprotobuf.a"
  echo "$config" > "$install/lib/Mac/$config/libprotoc.a"
  cp "{protoc}" "$install/bin/protoc"
  chmod +x "$install/bin/protoc"
  exit 0
fi
exit 1
"##,
        protoc = protoc.display()
    )
}

struct Fixture {
    _temp: tempfile::TempDir,
    root: PathBuf,
    plugin: PathBuf,
    tools: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path().join("ws");
        let plugin = temp.path().join("plugin");
        let tools = temp.path().join("tools");

        write(
            &root.join("YarnSpinner/YarnSpinner/yarn_spinner.proto"),
            "syntax = \"proto3\";\n",
        );
        write(
            &root.join("YarnSpinner-Console/src/YarnSpinner.Console/compiler_output.proto"),
            "syntax = \"proto3\";\n",
        );
        fs::create_dir_all(plugin.join("Source/YarnSpinner/Public/YarnSpinnerCore")).expect("mkdir");
        fs::create_dir_all(plugin.join("Source/YarnSpinner/Private/YarnSpinnerCore")).expect("mkdir");

        write_executable(&tools.join("git"), FAKE_GIT);
        write_executable(&tools.join("protoc"), FAKE_PROTOC);
        write_executable(&tools.join("cmake"), &fake_cmake(&tools.join("protoc")));

        Self {
            _temp: temp,
            root,
            plugin,
            tools,
        }
    }

    fn run(&self) -> Output {
        let mut command = Command::new(env!("CARGO_BIN_EXE_ysbuild"));
        for var in ["YSBUILD_ROOT", "YSBUILD_OUT_DIR", "YSBUILD_PLATFORM"] {
            command.env_remove(var);
        }
        command
            .env("RUST_LOG", "warn")
            .args([
                "--plugin-path",
                self.plugin.to_str().unwrap(),
                "--root",
                self.root.to_str().unwrap(),
                "--platform",
                "mac",
                "--git",
                self.tools.join("git").to_str().unwrap(),
                "--cmake",
                self.tools.join("cmake").to_str().unwrap(),
            ])
            .output()
            .expect("run ysbuild")
    }

    fn generated(&self) -> BTreeMap<String, Vec<u8>> {
        let mut files = BTreeMap::new();
        for side in ["Public", "Private"] {
            let dir = self.plugin.join("Source/YarnSpinner").join(side).join("YarnSpinnerCore");
            for entry in fs::read_dir(&dir).expect("read_dir") {
                let path = entry.expect("entry").path();
                let name = format!("{side}/{}", path.file_name().unwrap().to_string_lossy());
                files.insert(name, fs::read(&path).expect("read"));
            }
        }
        files
    }
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(path, contents).expect("write");
}

fn write_executable(path: &Path, contents: &str) {
    write(path, contents);
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod");
}

#[test]
fn full_pipeline_installs_patched_artifacts_idempotently() {
    let _serial = SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let fixture = Fixture::new();

    let first = fixture.run();
    assert!(
        first.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&first.stderr)
    );
    assert!(fixture.root.join("submodules-updated").exists());

    let module = fixture.plugin.join("Source/ThirdParty/YSProtobuf");
    assert!(module.join("include/google/protobuf/message.h").is_file());
    for config in ["Debug", "Release"] {
        let lib = module.join("lib/Mac").join(config);
        assert_eq!(fs::read_to_string(lib.join("libprotobuf.a")).expect("read"), format!("{config}\n"));
        assert!(!lib.join("libprotoc.a").exists());
    }

    let generated = fixture.generated();
    let names: Vec<&str> = generated.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        [
            "Private/compiler_output.pb.cc",
            "Private/yarn_spinner.pb.cc",
            "Public/compiler_output.pb.h",
            "Public/yarn_spinner.pb.h",
        ]
    );
    let header = String::from_utf8_lossy(&generated["Public/compiler_output.pb.h"]).into_owned();
    assert_eq!(header.matches("#include \"YarnSpinnerCore/yarn_spinner.pb.h\"").count(), 1);
    assert_eq!(header.matches("__pragma(warning(push))").count(), 1);
    assert_eq!(header.matches("__pragma(warning(pop))").count(), 1);
    let source = String::from_utf8_lossy(&generated["Private/compiler_output.pb.cc"]).into_owned();
    assert!(source.contains("#include \"YarnSpinnerCore/compiler_output.pb.h\""));
    assert!(source.contains("__pragma(warning(disable: 4541))"));

    write(&module.join("include/stale.h"), "// stale");
    let second = fixture.run();
    assert!(
        second.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&second.stderr)
    );
    assert_eq!(fixture.generated(), generated);
    assert!(!module.join("include/stale.h").exists());
}

#[test]
fn failing_build_tool_stops_before_copying() {
    let _serial = SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let fixture = Fixture::new();
    write_executable(&fixture.tools.join("cmake"), "#!/bin/sh\nexit 9\n");

    let output = fixture.run();

    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stderr
        .lines()
        .find(|line| line.starts_with("{\"error\""))
        .expect("json error line");
    let err: serde_json::Value = serde_json::from_str(line).expect("json");
    assert_eq!(err["error"]["kind"], "Tool");
    assert_eq!(err["error"]["status"], 9);
    assert!(!fixture.plugin.join("Source/ThirdParty").exists());
    assert!(!fixture.root.join("out/YarnSpinner_proto_install").exists());
}
