//! Built-in pipeline stages.

mod java;
mod kapt;
mod kotlin;

pub use java::JavaStage;
pub use kapt::KaptStage;
pub use kotlin::KotlinStage;

use crate::{frontend::K2JvmArgs, properties, resolve::ResolvedCompilation};

/// Front-end arguments shared by the kapt and Kotlin stages.
fn frontend_args(resolved: &ResolvedCompilation) -> K2JvmArgs {
    let compilation = &resolved.compilation;
    K2JvmArgs {
        classpath: resolved.classpath.clone(),
        jdk_home: compilation.jdk_home.clone(),
        no_jdk: compilation.jdk_home.is_none(),
        no_stdlib: compilation.no_stdlib,
        no_reflect: compilation.no_reflect,
        jvm_target: compilation.jvm_target.clone(),
        module_name: compilation.module_name.clone(),
        verbose: compilation.verbose,
        all_warnings_as_errors: compilation.all_warnings_as_errors,
        suppress_warnings: compilation.suppress_warnings,
        free_args: compilation.kotlinc_arguments.clone(),
        working_dir: resolved.workspace.root().to_path_buf(),
        system_properties: properties::snapshot(),
        ..Default::default()
    }
}
