//! Analysis of every image inside a ZIP archive.

use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::path::Path;

use base64::{engine::general_purpose, Engine as _};
use log::{debug, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use zip::ZipArchive;

use crate::detector::StegDetector;
use crate::error::StegDetectError;
use crate::media::image::guess_mime_type;
use crate::options::DetectorOptions;
use crate::report::AnalysisReport;
use crate::result::Result;

const DUPLICATE_MEMBER: &str = "duplicate archive member";

/// one file of an archive, in archive order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    pub name: String,
    /// uncompressed size as recorded in the archive
    pub size: u64,
    pub bytes: Vec<u8>,
    /// set when the member could not be read
    pub error: Option<String>,
}

impl ArchiveMember {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            bytes,
            error: None,
        }
    }

    fn failed(name: impl Into<String>, size: u64, error: impl ToString) -> Self {
        Self {
            name: name.into(),
            size,
            bytes: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// Reads all file members of a ZIP archive, directories are skipped.
///
/// Members bigger than the per-image limit are not inflated, they carry an
/// error instead. Archive level limits fail the whole read.
pub fn read_archive(bytes: &[u8], options: &DetectorOptions) -> Result<Vec<ArchiveMember>> {
    let size = bytes.len() as u64;
    if size > options.max_archive_bytes {
        return Err(StegDetectError::ResourceLimitExceeded {
            subject: "archive size in bytes",
            actual: size,
            limit: options.max_archive_bytes,
        });
    }

    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    if archive.len() > options.max_archive_entries {
        return Err(StegDetectError::ResourceLimitExceeded {
            subject: "archive entry count",
            actual: archive.len() as u64,
            limit: options.max_archive_entries as u64,
        });
    }

    let mut members = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let fallback_name = archive
            .name_for_index(i)
            .map(str::to_string)
            .unwrap_or_else(|| format!("member-{i}"));
        let mut file = match archive.by_index(i) {
            Ok(file) => file,
            Err(e) => {
                warn!("Archive member {fallback_name} is not readable: {e}");
                members.push(ArchiveMember::failed(fallback_name, 0, e));
                continue;
            }
        };
        if file.is_dir() {
            continue;
        }

        let name = file.name().to_string();
        let size = file.size();
        let limit = options.max_image_bytes;
        if size > limit {
            let e = StegDetectError::ResourceLimitExceeded {
                subject: "image size in bytes",
                actual: size,
                limit,
            };
            members.push(ArchiveMember::failed(name, size, e));
            continue;
        }

        let mut buf = Vec::with_capacity(size as usize);
        match (&mut file).take(limit + 1).read_to_end(&mut buf) {
            Ok(read) if read as u64 > limit => {
                let e = StegDetectError::ResourceLimitExceeded {
                    subject: "image size in bytes",
                    actual: read as u64,
                    limit,
                };
                members.push(ArchiveMember::failed(name, size, e));
            }
            Ok(_) => members.push(ArchiveMember {
                name,
                size,
                bytes: buf,
                error: None,
            }),
            Err(source) => {
                let e = StegDetectError::ReadError { source };
                warn!("Archive member {name} is not readable: {e}");
                members.push(ArchiveMember::failed(name, size, e));
            }
        }
    }

    debug!("Read {} member(s) from archive", members.len());
    Ok(members)
}

/// how one archive member ended up
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntryOutcome {
    Analyzed(Box<AnalysisReport>),
    Failed { error: String },
    /// not an image, only the metadata is reported
    Metadata {},
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub filename: String,
    pub file_size: u64,
    pub mime_type: Option<String>,
    /// base64 of the member bytes, only for analyzed images
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(flatten)]
    pub outcome: EntryOutcome,
}

/// Verdicts on all members of an archive, in archive order.
///
/// Serializes as `{"files": [{"<filename>": entry}, ...]}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

struct KeyedEntry<'a>(&'a BatchEntry);

impl Serialize for KeyedEntry<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.0.filename, self.0)?;
        map.end()
    }
}

impl Serialize for BatchReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let files: Vec<KeyedEntry> = self.entries.iter().map(KeyedEntry).collect();
        let mut state = serializer.serialize_struct("BatchReport", 1)?;
        state.serialize_field("files", &files)?;
        state.end()
    }
}

/// Drives a [`StegDetector`] over archive members.
///
/// A failing member never aborts the batch, it is reported with its error.
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    detector: StegDetector,
}

impl BatchRunner {
    pub fn new(detector: StegDetector) -> Self {
        Self { detector }
    }

    /// Reads a ZIP archive and analyzes its members.
    pub fn run_archive(&self, bytes: &[u8]) -> Result<BatchReport> {
        let members = read_archive(bytes, self.detector.options())?;
        Ok(self.run(members))
    }

    pub fn run(&self, mut members: Vec<ArchiveMember>) -> BatchReport {
        let mut seen = HashSet::new();
        for member in members.iter_mut() {
            if !seen.insert(member.name.clone()) {
                debug!("Skipping duplicate archive member {}", member.name);
                member.bytes.clear();
                member.error = Some(DUPLICATE_MEMBER.to_string());
            }
        }

        #[cfg(feature = "parallel")]
        let entries = members.into_par_iter().map(|m| self.entry(m)).collect();
        #[cfg(not(feature = "parallel"))]
        let entries = members.into_iter().map(|m| self.entry(m)).collect();

        BatchReport { entries }
    }

    fn entry(&self, member: ArchiveMember) -> BatchEntry {
        let sniffed = guess_mime_type(&member.bytes);
        let mime_type = sniffed
            .or_else(|| mime_from_extension(&member.name))
            .map(str::to_string);
        let is_image = sniffed.is_some()
            || mime_type
                .as_deref()
                .is_some_and(|mime| mime.starts_with("image/"));

        let mut entry = BatchEntry {
            filename: member.name,
            file_size: member.size,
            mime_type,
            image_data: None,
            outcome: EntryOutcome::Metadata {},
        };

        if let Some(error) = member.error {
            entry.outcome = EntryOutcome::Failed { error };
        } else if is_image {
            match self.detector.analyze_bytes(&member.bytes) {
                Ok(report) => {
                    entry.image_data = Some(general_purpose::STANDARD.encode(&member.bytes));
                    entry.outcome = EntryOutcome::Analyzed(Box::new(report));
                }
                Err(e) => {
                    warn!("Archive member {} could not be analyzed: {e}", entry.filename);
                    entry.outcome = EntryOutcome::Failed {
                        error: e.to_string(),
                    };
                }
            }
        }

        entry
    }
}

fn mime_from_extension(name: &str) -> Option<&'static str> {
    let extension = Path::new(name).extension()?.to_str()?.to_lowercase();
    let mime = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        _ => return None,
    };

    Some(mime)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    use super::*;
    use crate::test_utils::{encode_png, gradient_rgb_image};

    fn zip_of(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut zip = ZipWriter::new(Cursor::new(&mut buf));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.add_directory("nested/", options).unwrap();
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();

        buf
    }

    #[test]
    fn should_read_members_in_archive_order_without_directories() {
        let png = encode_png(&gradient_rgb_image(4, 4));
        let zip = zip_of(&[("b.png", &png), ("nested/a.txt", b"hello")]);
        let members = read_archive(&zip, &DetectorOptions::default()).unwrap();

        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["b.png", "nested/a.txt"]);
        assert_eq!(members[1].bytes, b"hello");
        assert_eq!(members[1].size, 5);
    }

    #[test]
    fn should_fail_on_something_that_is_not_a_zip() {
        assert!(matches!(
            read_archive(b"plain text", &DetectorOptions::default()),
            Err(StegDetectError::UnsupportedArchive(_))
        ));
    }

    #[test]
    fn should_enforce_archive_limits() {
        let zip = zip_of(&[("a.txt", b"a"), ("b.txt", b"b")]);
        let mut options = DetectorOptions::default();
        options.max_archive_entries = 2;

        match read_archive(&zip, &options) {
            Err(StegDetectError::ResourceLimitExceeded { actual: 3, .. }) => (),
            other => panic!("expected ResourceLimitExceeded, got {other:?}"),
        }
        assert!(read_archive(&zip, &DetectorOptions::default().with_max_archive_bytes(10)).is_err());
    }

    #[test]
    fn oversized_members_carry_an_error() {
        let zip = zip_of(&[("big.png", &[0u8; 64])]);
        let options = DetectorOptions::default().with_max_image_bytes(16);
        let members = read_archive(&zip, &options).unwrap();

        assert!(members[0].bytes.is_empty());
        assert!(members[0]
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("Resource limit exceeded")));
    }

    #[test]
    fn should_report_metadata_for_non_images() {
        let report = BatchRunner::default().run(vec![ArchiveMember::new("notes.txt", b"hi".to_vec())]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "files": [{
                    "notes.txt": {"filename": "notes.txt", "file_size": 2, "mime_type": "text/plain"}
                }]
            })
        );
    }

    #[test]
    fn should_mark_later_duplicates() {
        let png = encode_png(&gradient_rgb_image(4, 4));
        let report = BatchRunner::default().run(vec![
            ArchiveMember::new("x.png", png.clone()),
            ArchiveMember::new("x.png", png),
        ]);

        assert!(matches!(report.entries[0].outcome, EntryOutcome::Analyzed(_)));
        assert_eq!(
            report.entries[1].outcome,
            EntryOutcome::Failed {
                error: DUPLICATE_MEMBER.to_string()
            }
        );
    }

    #[test]
    fn broken_images_are_reported_with_their_error() {
        let report = BatchRunner::default().run(vec![ArchiveMember::new(
            "broken.jpg",
            b"definitely not a jpeg".to_vec(),
        )]);
        let entry = &report.entries[0];
        let json = serde_json::to_value(entry).unwrap();

        assert_eq!(entry.mime_type.as_deref(), Some("image/jpeg"));
        assert!(json["error"].as_str().unwrap().starts_with("Image could not be decoded"));
        assert!(json.get("image_data").is_none());
    }
}
