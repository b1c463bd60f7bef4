//! Purpose: `ysbuild` CLI entry point.
//! Role: Binary crate root; parses args, resolves layout and platform, runs the pipeline.
//! Invariants: The plugin path and host platform are validated before any step runs.
//! Invariants: Errors are emitted as text on a TTY and as JSON on stderr otherwise.
//! Invariants: Process exit code is derived from `to_exit_code`.
#![allow(clippy::result_large_err)]
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;
use ysbuild::core::error::{Error, ErrorKind, io_error, to_exit_code};
use ysbuild::core::layout::{Layout, PluginLayout};
use ysbuild::core::platform::Platform;
use ysbuild::pipeline::{Pipeline, Step, Tools};

fn main() {
    std::process::exit(run());
}

/// Runs the CLI and returns the process exit code.
fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return parse_failure(&err),
    };

    init_tracing();
    let color_mode = cli.color;
    match build(cli) {
        Ok(()) => 0,
        Err(err) => fail(&err, color_mode),
    }
}

/// Help and version requests print to stdout; bare `ysbuild` prints help and exits 2.
fn parse_failure(err: &clap::Error) -> i32 {
    let code = match err.kind() {
        ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => 0,
        ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => 2,
        _ => {
            let usage = Error::new(ErrorKind::Usage)
                .with_message(clap_error_summary(err))
                .with_hint("Try `ysbuild --help`.");
            return fail(&usage, ColorMode::Auto);
        }
    };
    match err.print() {
        Ok(()) => code,
        Err(io_err) => fail(
            &Error::new(ErrorKind::Io)
                .with_message("failed to write help")
                .with_source(io_err),
            ColorMode::Auto,
        ),
    }
}

fn fail(err: &Error, color_mode: ColorMode) -> i32 {
    emit_error(err, color_mode);
    to_exit_code(err.kind())
}

fn build(cli: Cli) -> Result<(), Error> {
    let plugin = PluginLayout::resolve(&cli.plugin_path)?;
    let platform = match cli.platform {
        Some(platform) => platform.into(),
        None => Platform::detect()?,
    };

    let root = match cli.root {
        Some(root) => absolute(&root)?,
        None => std::env::current_dir()
            .map_err(|err| io_error("failed to read current directory", ".", err))?,
    };
    let out_dir = cli.out_dir.as_deref().map(absolute).transpose()?;
    let layout = Layout::new(root, out_dir, platform);

    let tools = Tools {
        git: cli.git,
        cmake: cli.cmake,
    };
    let mut pipeline = Pipeline::new(layout, plugin, tools);
    if cli.skip_submodules {
        pipeline = pipeline.skip(Step::PrepareSubrepos);
    }
    pipeline.run()
}

fn absolute(path: &Path) -> Result<PathBuf, Error> {
    std::path::absolute(path).map_err(|err| io_error("failed to resolve path", path, err))
}

#[derive(Parser)]
#[command(
    name = "ysbuild",
    version,
    about = "Builds protobuf and the YarnSpinner .proto files for YarnSpinner's Unreal plugin",
    long_about = None,
    after_help = r#"STEPS
  prepare-subrepos   git submodule update --init --recursive
  build-library      cmake configure, then build+install Debug and Release
  install-library    copy headers and libprotobuf binaries into Source/ThirdParty/YSProtobuf
  compile-schemas    run protoc over yarn_spinner.proto and compiler_output.proto
  patch-generated    redirect includes and wrap MSVC warning pragmas
  install-generated  copy .pb.h to Public/ and .pb.cc to Private/

EXAMPLES
  $ ysbuild --plugin-path ../YarnSpinner-Unreal
  $ RUST_LOG=debug ysbuild --plugin-path ../YarnSpinner-Unreal --skip-submodules"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long = "plugin-path",
        alias = "plugin_path",
        value_name = "DIR",
        help = "Path to YarnSpinner's Unreal plugin",
        value_hint = ValueHint::DirPath
    )]
    plugin_path: PathBuf,
    #[arg(
        long,
        env = "YSBUILD_ROOT",
        value_name = "DIR",
        help = "Workspace holding the protobuf and YarnSpinner subtrees (default: current directory)",
        value_hint = ValueHint::DirPath
    )]
    root: Option<PathBuf>,
    #[arg(
        long,
        env = "YSBUILD_OUT_DIR",
        value_name = "DIR",
        help = "Build output directory (default: <root>/out)",
        value_hint = ValueHint::DirPath
    )]
    out_dir: Option<PathBuf>,
    #[arg(
        long,
        env = "YSBUILD_PLATFORM",
        value_enum,
        help = "Target platform (default: detected from the host)"
    )]
    platform: Option<PlatformCli>,
    #[arg(
        long,
        env = "YSBUILD_GIT",
        default_value = "git",
        value_hint = ValueHint::ExecutablePath
    )]
    git: PathBuf,
    #[arg(
        long,
        env = "YSBUILD_CMAKE",
        default_value = "cmake",
        value_hint = ValueHint::ExecutablePath
    )]
    cmake: PathBuf,
    #[arg(long, help = "Do not run `git submodule update`")]
    skip_submodules: bool,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize diagnostics: auto, always, never"
    )]
    color: ColorMode,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PlatformCli {
    #[value(name = "win64")]
    Win64,
    Mac,
}

impl From<PlatformCli> for Platform {
    fn from(value: PlatformCli) -> Self {
        match value {
            PlatformCli::Win64 => Platform::Win64,
            PlatformCli::Mac => Platform::Mac,
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .try_init();
}

const RED: &str = "31";
const YELLOW: &str = "33";

fn paint(label: &str, use_color: bool, code: &str) -> String {
    if use_color {
        format!("\u{1b}[{code}m{label}\u{1b}[0m")
    } else {
        label.to_string()
    }
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    let rendered = if is_tty {
        error_text(err, color_mode.use_color(is_tty))
    } else {
        error_json(err).to_string()
    };
    eprintln!("{rendered}");
}

fn error_message(err: &Error) -> String {
    let fallback = match err.kind() {
        ErrorKind::Internal => "internal error",
        ErrorKind::Usage => "usage error",
        ErrorKind::NotFound => "not found",
        ErrorKind::Unsupported => "unsupported platform",
        ErrorKind::Tool => "external tool failed",
        ErrorKind::Patch => "failed to patch generated file",
        ErrorKind::Io => "i/o error",
    };
    err.message().unwrap_or(fallback).to_string()
}

/// Optional context fields in the order both renderings list them.
fn error_details(err: &Error) -> Vec<(&'static str, Value)> {
    let mut details = Vec::new();
    if let Some(hint) = err.hint() {
        details.push(("hint", json!(hint)));
    }
    if let Some(path) = err.path() {
        details.push(("path", json!(path.display().to_string())));
    }
    if let Some(command) = err.command() {
        details.push(("command", json!(command)));
    }
    if let Some(status) = err.status() {
        details.push(("status", json!(status)));
    }
    details
}

fn error_causes(err: &Error) -> Vec<String> {
    std::iter::successors(err.source(), |&cause| cause.source())
        .map(|cause| cause.to_string())
        .collect()
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    for (field, value) in error_details(err) {
        inner.insert(field.to_string(), value);
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }
    json!({ "error": inner })
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = vec![format!(
        "{} {}",
        paint("error:", use_color, RED),
        error_message(err)
    )];
    for (field, value) in error_details(err) {
        let value = match value {
            Value::String(text) => text,
            other => other.to_string(),
        };
        lines.push(format!("{} {value}", paint(&format!("{field}:"), use_color, YELLOW)));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("{} {cause}", paint("caused by:", use_color, YELLOW)));
    }
    lines.join("\n")
}

/// First meaningful line of a clap error, without its `error:` prefix.
fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.strip_prefix("error:").unwrap_or(line).trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}
