use clap::{Parser, Subcommand};
use stegdetect_core::DetectorOptions;

use crate::commands::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Maximum size of one image in bytes
    #[arg(long, global = true, value_name = "bytes")]
    pub max_image_bytes: Option<u64>,

    /// Maximum number of pixels of one image, checked before decoding
    #[arg(long, global = true, value_name = "pixels")]
    pub max_pixels: Option<u64>,

    /// Maximum size of one ZIP archive in bytes
    #[arg(long, global = true, value_name = "bytes")]
    pub max_archive_bytes: Option<u64>,

    /// Maximum number of members of one ZIP archive
    #[arg(long, global = true, value_name = "count")]
    pub max_archive_entries: Option<usize>,

    /// Significance level of the chi-square test
    #[arg(long, global = true, value_name = "p-value")]
    pub significance: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

impl CliArgs {
    pub fn options(&self) -> DetectorOptions {
        let mut options = DetectorOptions::default();
        if let Some(v) = self.max_image_bytes {
            options = options.with_max_image_bytes(v);
        }
        if let Some(v) = self.max_pixels {
            options = options.with_max_pixels(v);
        }
        if let Some(v) = self.max_archive_bytes {
            options = options.with_max_archive_bytes(v);
        }
        if let Some(v) = self.max_archive_entries {
            options.max_archive_entries = v;
        }
        if let Some(v) = self.significance {
            options = options.with_chi_square_significance(v);
        }
        options
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Analyze(analyze::AnalyzeArgs),
    AnalyzeZip(analyze_zip::AnalyzeZipArgs),
    LsbPicture(lsb_picture::LsbPictureArgs),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn should_map_global_flags_onto_options() {
        let args = CliArgs::try_parse_from([
            "stegdetect",
            "analyze",
            "-i",
            "image.png",
            "--max-image-bytes",
            "1000",
            "--significance",
            "0.01",
        ])
        .unwrap();
        let options = args.options();

        assert_eq!(options.max_image_bytes, 1000);
        assert_eq!(options.chi_square_significance, 0.01);
        assert_eq!(options.max_pixels, DetectorOptions::default().max_pixels);
    }

    #[test]
    fn should_name_subcommands_in_kebab_case() {
        let args =
            CliArgs::try_parse_from(["stegdetect", "analyze-zip", "--in", "a.zip", "--pretty"])
                .unwrap();

        match args.command {
            Commands::AnalyzeZip(a) => assert!(a.pretty),
            other => panic!("expected analyze-zip, got {other:?}"),
        }
    }

    #[test]
    fn lsb_picture_needs_an_output() {
        assert!(CliArgs::try_parse_from(["stegdetect", "lsb-picture", "-i", "a.png"]).is_err());
    }
}
