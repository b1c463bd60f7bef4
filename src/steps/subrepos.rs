// Fetches the vendored protobuf and YarnSpinner subtrees.
use std::path::Path;

use crate::core::error::Error;
use crate::core::layout::Layout;
use crate::core::process::Tool;

pub fn submodule_update(layout: &Layout, git: &Path) -> Tool {
    Tool::new(git, layout.root()).args(["submodule", "update", "--init", "--recursive"])
}

pub fn prepare(layout: &Layout, git: &Path) -> Result<(), Error> {
    submodule_update(layout, git).run()
}
