//! Lint the post collection

use anyhow::Result;
use clap::ValueEnum;

use crate::lint::{LintReport, Linter};
use crate::Site;

/// Output format for lint results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Lint the site and print the report; fails when the report does not pass
pub fn run(site: &Site, format: OutputFormat, strict: bool) -> Result<LintReport> {
    let report = Linter::new(site).check_dir()?;

    match format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", report.render_json()?),
    }

    if !report.passes(strict) {
        anyhow::bail!(
            "Lint failed: {} error(s), {} warning(s)",
            report.error_count(),
            report.warning_count()
        );
    }

    Ok(report)
}
