use std::path::PathBuf;

use clap::Args;
use stegdetect_core::DetectorOptions;

use crate::CliResult;

/// Analyzes every image inside a ZIP archive and prints the JSON report
#[derive(Args, Debug)]
pub struct AnalyzeZipArgs {
    /// ZIP archive of images, used readonly.
    #[arg(short = 'i', long = "in", value_name = "zip file", required = true)]
    pub archive: PathBuf,

    /// The report is written into this file instead of stdout
    #[arg(short = 'o', long = "out", value_name = "report file")]
    pub report_file: Option<PathBuf>,

    /// Pretty print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

impl AnalyzeZipArgs {
    pub fn run(self, options: DetectorOptions) -> CliResult<()> {
        let report = stegdetect_core::commands::analyze_zip(&self.archive, options)?;
        let json = if self.pretty {
            report.to_json_pretty()?
        } else {
            report.to_json()?
        };

        super::emit(json, self.report_file.as_deref())
    }
}
