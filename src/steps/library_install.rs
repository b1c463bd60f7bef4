//! Purpose: Copy protobuf headers and core library binaries into the plugin's third-party module.
//! Exports: `install`.
//! Role: Runs after the cmake install; reads only from the protobuf install directory.
//! Invariants: The destination `include` directory is replaced wholesale, never merged.
//! Invariants: Only `libprotobuf.*` binaries are copied; other build products stay behind.
//! Invariants: A configuration with no matching binaries is skipped, not an error.
use crate::core::error::Error;
use crate::core::fsutil::{copy_into, copy_tree, create_dir_all, files_with_stem, remove_dir_if_exists};
use crate::core::layout::{LIBRARY_STEM, Layout, PluginLayout};
use crate::core::platform::BuildConfig;

pub fn install(layout: &Layout, plugin: &PluginLayout) -> Result<(), Error> {
    let module_dir = plugin.third_party_module_dir();
    let include_dir = plugin.include_dir();

    remove_dir_if_exists(&include_dir)?;
    create_dir_all(&module_dir)?;

    let headers = copy_tree(&layout.protobuf_include_dir(), &include_dir)?;
    tracing::info!(count = headers, dest = %include_dir.display(), "copied protobuf headers");

    for config in BuildConfig::ALL {
        let sources = files_with_stem(&layout.protobuf_lib_dir(config), LIBRARY_STEM)?;
        if sources.is_empty() {
            tracing::warn!(
                %config,
                dir = %layout.protobuf_lib_dir(config).display(),
                "no {LIBRARY_STEM} binaries found; skipping"
            );
            continue;
        }

        let dest = plugin.lib_dir(layout.platform(), config);
        create_dir_all(&dest)?;
        for source in &sources {
            copy_into(source, &dest)?;
        }
        tracing::info!(%config, count = sources.len(), dest = %dest.display(), "copied protobuf binaries");
    }
    Ok(())
}
