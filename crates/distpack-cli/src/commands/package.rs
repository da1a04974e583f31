//! Package command implementation.

use super::Invocation;
use super::display_path;
use super::with_progress;
use crate::cli::PackageArgs;
use crate::error::add_bundle_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use distpack_core::BundleConfig;
use distpack_core::bundle_package;
use distpack_core::profiles;

pub fn execute(args: &PackageArgs, formatter: &dyn OutputFormatter, quiet: bool) -> Result<()> {
    let invocation = Invocation::resolve(&args.common, profiles::WINDOWS_OUTPUT)?;
    let output = &invocation.output;

    let mut plan = invocation.config_file.apply_package(profiles::windows_plan());
    if let Some(name) = &args.name {
        plan = plan.with_name(name.as_str());
    }

    let mut config = BundleConfig::default();
    if let Some(level) = invocation.compression_level(&args.common) {
        config = config.with_compression_level(level);
    }

    let report = add_bundle_context(
        with_progress(!quiet, |progress| {
            bundle_package(&invocation.root, &plan, output, &config, progress)
        }),
        output,
    )?;

    formatter.format_bundle_result("package", &display_path(output), &report)
}
