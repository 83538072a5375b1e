use std::path::PathBuf;

use clap::Args;
use stegdetect_core::DetectorOptions;

use crate::CliResult;

/// Analyzes one image for hidden data and prints the JSON report
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image file such as PNG or JPEG, used readonly.
    #[arg(short = 'i', long = "in", value_name = "image file", required = true)]
    pub media: PathBuf,

    /// The report is written into this file instead of stdout
    #[arg(short = 'o', long = "out", value_name = "report file")]
    pub report_file: Option<PathBuf>,

    /// Pretty print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

impl AnalyzeArgs {
    pub fn run(self, options: DetectorOptions) -> CliResult<()> {
        let report = stegdetect_core::commands::analyze(&self.media, options)?;
        let json = if self.pretty {
            report.to_json_pretty()?
        } else {
            report.to_json()?
        };

        super::emit(json, self.report_file.as_deref())
    }
}
