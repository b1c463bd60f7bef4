//! Purpose: Rewrite protoc output so it compiles inside the Unreal plugin.
//! Exports: `patch_contents`, `patch_all`.
//! Role: Text-only transform over the generated files in the schema install directory.
//! Invariants: Includes of generated headers are redirected under `YarnSpinnerCore/`.
//! Invariants: Each file gains exactly one MSVC warning push/pop pair around its whole content.
//! Invariants: A file missing one of its required includes, or an already wrapped file, is rejected.
use std::fs;

use crate::core::error::{Error, ErrorKind, io_error};
use crate::core::layout::{GENERATED_FILES, GENERATED_INCLUDE_DIR, GeneratedFile, GeneratedKind, Layout};

struct Suppression {
    code: u16,
    reason: &'static str,
}

const HEADER_SUPPRESSIONS: &[Suppression] = &[Suppression {
    code: 4946,
    reason: "reinterpret_cast used between related classes: '<class1>' and '<class1>'",
}];

// Casts, octal escapes and RTTI-dependent code only appear in the .pb.cc files.
const SOURCE_SUPPRESSIONS: &[Suppression] = &[
    Suppression {
        code: 4125,
        reason: "decimal digit terminates octal escape sequence",
    },
    Suppression {
        code: 4541,
        reason: "'dynamic_cast' used on polymorphic type '<type>' with /GR-; unpredictable behaviour may result",
    },
    Suppression {
        code: 4668,
        reason: "'<preprocessor_macro>' is not defined as a preprocessor macro, replacing with '0' for '#if/#elif'",
    },
    Suppression {
        code: 4800,
        reason: "Implicit conversion from '<type>' to bool. Possible information loss.",
    },
    Suppression {
        code: 4946,
        reason: "reinterpret_cast used between related classes: '<class1>' and '<class1>'",
    },
];

const PUSH: &str = "__pragma(warning(push))";

const SUFFIX: &str = "\n\n#if defined(_MSC_VER)\n    __pragma(warning(pop))\n#endif\n\n";

fn suppressions(kind: GeneratedKind) -> &'static [Suppression] {
    match kind {
        GeneratedKind::Header => HEADER_SUPPRESSIONS,
        GeneratedKind::Source => SOURCE_SUPPRESSIONS,
    }
}

fn prefix(kind: GeneratedKind) -> String {
    let mut text = String::from("\n");
    if kind == GeneratedKind::Header {
        text.push_str("#pragma once\n\n");
    }
    text.push_str("#if defined(_MSC_VER)\n");
    text.push_str(&format!("    {PUSH}\n"));
    for suppression in suppressions(kind) {
        text.push_str(&format!(
            "    __pragma(warning(disable: {}))  // {}\n",
            suppression.code, suppression.reason
        ));
    }
    text.push_str("#endif\n\n");
    text
}

/// `(original, redirected)` include directives for every generated header.
fn include_rewrites() -> impl Iterator<Item = (&'static str, String, String)> {
    GENERATED_FILES
        .iter()
        .filter(|file| file.kind == GeneratedKind::Header)
        .map(|file| {
            (
                file.name,
                format!("#include \"{}\"", file.name),
                format!("#include \"{GENERATED_INCLUDE_DIR}/{}\"", file.name),
            )
        })
}

/// Applies the include rewrite and warning wrapper to one file's contents.
pub fn patch_contents(file: &GeneratedFile, contents: &str) -> Result<String, Error> {
    if contents.contains(PUSH) {
        return Err(Error::new(ErrorKind::Patch)
            .with_message(format!("{} is already patched", file.name))
            .with_hint("Regenerate the file with protoc before patching it again."));
    }

    let mut patched = contents.to_string();
    for (header, original, redirected) in include_rewrites() {
        if !patched.contains(&original) {
            if file.requires.contains(&header) {
                return Err(Error::new(ErrorKind::Patch)
                    .with_message(format!("expected `{original}` in {}", file.name))
                    .with_hint("protoc output changed shape; update the include rewrite."));
            }
            continue;
        }
        patched = patched.replace(&original, &redirected);
    }

    Ok(format!("{}{patched}{SUFFIX}", prefix(file.kind)))
}

fn patch_file(layout: &Layout, file: &GeneratedFile) -> Result<(), Error> {
    let path = layout.generated_path(file);
    if !path.is_file() {
        return Err(Error::new(ErrorKind::NotFound)
            .with_message(format!("compiled proto file not found: {}", file.name))
            .with_path(path));
    }

    let contents = fs::read_to_string(&path)
        .map_err(|err| io_error("failed to read generated file", &path, err))?;
    let patched = patch_contents(file, &contents).map_err(|err| err.with_path(&path))?;
    fs::write(&path, patched).map_err(|err| io_error("failed to write generated file", &path, err))?;
    tracing::debug!(file = file.name, "patched");
    Ok(())
}

pub fn patch_all(layout: &Layout) -> Result<(), Error> {
    for file in &GENERATED_FILES {
        patch_file(layout, file)?;
    }
    tracing::info!(count = GENERATED_FILES.len(), "patched generated files");
    Ok(())
}
