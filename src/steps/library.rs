//! Purpose: Configure, build, and install the vendored protobuf library with cmake.
//! Exports: `configure_command`, `install_command`, `build`.
//! Role: Produces headers and static libraries under the protobuf install directory.
//! Invariants: Build and install directories are deleted before configuring.
//! Invariants: Debug and Release install side by side under `lib/<Platform>/<Config>`.
use std::path::Path;

use crate::core::error::Error;
use crate::core::fsutil::remove_dir_if_exists;
use crate::core::layout::Layout;
use crate::core::platform::BuildConfig;
use crate::core::process::Tool;

pub fn configure_command(layout: &Layout, cmake: &Path) -> Tool {
    let platform = layout.platform();
    let config_expr = BuildConfig::generator_expression();

    Tool::new(cmake, layout.root())
        .arg("-S")
        .arg(layout.protobuf_source_dir())
        .arg("-B")
        .arg(layout.protobuf_build_dir())
        .args(platform.generator_args())
        .arg(format!("-DCMAKE_BUILD_TYPE={config_expr}"))
        .arg(format!(
            "-DCMAKE_INSTALL_LIBDIR=lib/{}/{config_expr}",
            platform.dir_name()
        ))
        .arg(format!(
            "-DCMAKE_INSTALL_PREFIX={}",
            layout.protobuf_install_dir().display()
        ))
        .args(platform.runtime_defines())
        .args([
            "-Dprotobuf_BUILD_EXAMPLES=OFF",
            "-Dprotobuf_BUILD_TESTS=OFF",
            "-Dprotobuf_DEBUG_POSTFIX=",
            "-Dprotobuf_DISABLE_RTTI=ON",
            "-Dprotobuf_WITH_ZLIB=OFF",
        ])
}

pub fn install_command(layout: &Layout, cmake: &Path, config: BuildConfig) -> Tool {
    Tool::new(cmake, layout.root())
        .arg("--build")
        .arg(layout.protobuf_build_dir())
        .args(["--target", "install", "--config", config.name()])
}

pub fn build(layout: &Layout, cmake: &Path) -> Result<(), Error> {
    remove_dir_if_exists(&layout.protobuf_install_dir())?;
    remove_dir_if_exists(&layout.protobuf_build_dir())?;

    tracing::info!(platform = %layout.platform(), "configuring protobuf");
    configure_command(layout, cmake).run()?;

    for config in BuildConfig::ALL {
        tracing::info!(%config, "building protobuf");
        install_command(layout, cmake, config).run()?;
    }
    Ok(())
}
