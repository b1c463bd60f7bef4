// Pipeline steps, in the order they run.
pub mod subrepos;
pub mod library;
pub mod library_install;
pub mod schema;
pub mod patch;
pub mod generated_install;
