//! Purpose: Sequence the build steps over one resolved workspace and plugin layout.
//! Exports: `Step`, `Tools`, `Pipeline`.
//! Role: The only caller of the step modules; owns ordering and per-step logging.
//! Invariants: Steps run strictly in `Step::ALL` order; the first error stops the run.
//! Invariants: Platform and paths are resolved before the first step starts.
use std::fmt;
use std::path::PathBuf;

use crate::core::error::Error;
use crate::core::layout::{Layout, PluginLayout};
use crate::steps::{generated_install, library, library_install, patch, schema, subrepos};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    PrepareSubrepos,
    BuildLibrary,
    InstallLibrary,
    CompileSchemas,
    PatchGenerated,
    InstallGenerated,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::PrepareSubrepos,
        Step::BuildLibrary,
        Step::InstallLibrary,
        Step::CompileSchemas,
        Step::PatchGenerated,
        Step::InstallGenerated,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Step::PrepareSubrepos => "prepare-subrepos",
            Step::BuildLibrary => "build-library",
            Step::InstallLibrary => "install-library",
            Step::CompileSchemas => "compile-schemas",
            Step::PatchGenerated => "patch-generated",
            Step::InstallGenerated => "install-generated",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// External programs resolved from flags or environment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Tools {
    pub git: PathBuf,
    pub cmake: PathBuf,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            git: PathBuf::from("git"),
            cmake: PathBuf::from("cmake"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Pipeline {
    layout: Layout,
    plugin: PluginLayout,
    tools: Tools,
    skip: Vec<Step>,
}

impl Pipeline {
    pub fn new(layout: Layout, plugin: PluginLayout, tools: Tools) -> Self {
        Self {
            layout,
            plugin,
            tools,
            skip: Vec::new(),
        }
    }

    pub fn skip(mut self, step: Step) -> Self {
        if !self.skip.contains(&step) {
            self.skip.push(step);
        }
        self
    }

    /// Steps this pipeline will run, in order.
    pub fn planned(&self) -> Vec<Step> {
        Step::ALL
            .into_iter()
            .filter(|step| !self.skip.contains(step))
            .collect()
    }

    pub fn run(&self) -> Result<(), Error> {
        tracing::info!(
            platform = %self.layout.platform(),
            root = %self.layout.root().display(),
            plugin = %self.plugin.root().display(),
            "starting build"
        );
        for step in self.planned() {
            let span = tracing::info_span!("step", name = step.name());
            let _guard = span.enter();
            tracing::info!("begin");
            self.run_step(step)?;
        }
        tracing::info!("build complete");
        Ok(())
    }

    fn run_step(&self, step: Step) -> Result<(), Error> {
        match step {
            Step::PrepareSubrepos => subrepos::prepare(&self.layout, &self.tools.git),
            Step::BuildLibrary => library::build(&self.layout, &self.tools.cmake),
            Step::InstallLibrary => library_install::install(&self.layout, &self.plugin),
            Step::CompileSchemas => schema::compile(&self.layout),
            Step::PatchGenerated => patch::patch_all(&self.layout),
            Step::InstallGenerated => generated_install::install(&self.layout, &self.plugin),
        }
    }
}
