// Copies the patched generated files into the plugin's Public/Private source directories.
use crate::core::error::{Error, ErrorKind};
use crate::core::fsutil::copy_into;
use crate::core::layout::{GENERATED_FILES, Layout, PluginLayout};

pub fn install(layout: &Layout, plugin: &PluginLayout) -> Result<(), Error> {
    for file in &GENERATED_FILES {
        let dest = plugin.destination_dir(file.kind);
        // The plugin owns these directories; creating them here would hide a wrong --plugin-path.
        if !dest.is_dir() {
            return Err(Error::new(ErrorKind::NotFound)
                .with_message("plugin source directory not found")
                .with_path(dest)
                .with_hint("Check that --plugin-path points at the YarnSpinner plugin root."));
        }
        copy_into(&layout.generated_path(file), &dest)?;
    }
    tracing::info!(
        public = %plugin.public_dir().display(),
        private = %plugin.private_dir().display(),
        "installed generated files"
    );
    Ok(())
}
