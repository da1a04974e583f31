//! Project command implementation.

use super::Invocation;
use super::display_path;
use super::with_progress;
use crate::cli::ProjectArgs;
use crate::error::add_bundle_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use distpack_core::BundleConfig;
use distpack_core::ExclusionSet;
use distpack_core::bundle_project_with_progress;
use distpack_core::profiles;
use tracing::debug;

pub fn execute(args: &ProjectArgs, formatter: &dyn OutputFormatter, quiet: bool) -> Result<()> {
    let invocation = Invocation::resolve(&args.common, profiles::PROJECT_OUTPUT)?;
    let output = &invocation.output;

    let base = if args.no_default_excludes {
        ExclusionSet::new()
    } else {
        add_bundle_context(profiles::project_exclusions(), output)?
    };
    let mut exclusions = add_bundle_context(invocation.config_file.apply_exclusions(base), output)?;
    add_bundle_context(exclusions.extend_parsed(&args.exclude), output)?;
    debug!(patterns = exclusions.len(), "exclusion set ready");

    let mut config = BundleConfig::default().with_exclusions(exclusions);
    if let Some(level) = invocation.compression_level(&args.common) {
        config = config.with_compression_level(level);
    }

    let report = add_bundle_context(
        with_progress(!quiet, |progress| {
            bundle_project_with_progress(&invocation.root, output, &config, progress)
        }),
        output,
    )?;

    formatter.format_bundle_result("project", &display_path(output), &report)
}
