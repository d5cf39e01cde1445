//! QC File Reader Module
//!
//! Decodes FASTQ files (plain or gzipped) into [`FastqRead`] values.
//!
//! # Features
//! - Gzip detection from the `.gz` suffix
//! - Phred+33 quality decoding
//! - Per-record validation (sequence and quality lengths must agree)

use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::FastqRead;

/// Sanger / Illumina 1.8+ quality encoding offset
pub const PHRED_OFFSET: u8 = 33;

const PROGRESS_INTERVAL: usize = 50_000;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("FASTQ file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Input/Output error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed FASTQ record #{record}: {message}")]
    Malformed { record: usize, message: String },

    #[error("No valid FASTQ reads found in {path}")]
    Empty { path: PathBuf },
}

/// Reader for FASTQ input
#[derive(Debug, Clone)]
pub struct FastqReader {
    quality_offset: u8,
}

impl Default for FastqReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FastqReader {
    pub fn new() -> Self {
        Self {
            quality_offset: PHRED_OFFSET,
        }
    }

    /// Use a non-standard quality offset (e.g. 64 for Illumina 1.3-1.7)
    pub fn with_quality_offset(quality_offset: u8) -> Self {
        Self { quality_offset }
    }

    /// Read every record of a `.fastq` / `.fq` / `.fastq.gz` file
    pub fn read_path(&self, path: &Path) -> Result<Vec<FastqRead>, ParseError> {
        if !path.exists() {
            return Err(ParseError::NotFound {
                path: path.to_path_buf(),
            });
        }

        info!("📖 Reading FASTQ file: {}", path.display());
        let file = File::open(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let reads = if Self::is_gzipped(path) {
            debug!("Detected gzip compression");
            self.read_from(MultiGzDecoder::new(BufReader::new(file)))
        } else {
            self.read_from(file)
        }?;

        if reads.is_empty() {
            return Err(ParseError::Empty {
                path: path.to_path_buf(),
            });
        }

        info!("✅ Parsed {} reads from {}", reads.len(), path.display());
        Ok(reads)
    }

    /// Decode FASTQ records from any byte source; an empty source yields no reads
    pub fn read_from<R: Read>(&self, source: R) -> Result<Vec<FastqRead>, ParseError> {
        use bio::io::fastq;

        let reader = fastq::Reader::new(source);
        let mut reads = Vec::new();

        for (index, record_result) in reader.records().enumerate() {
            let record_number = index + 1;
            let record = record_result.map_err(|err| ParseError::Malformed {
                record: record_number,
                message: err.to_string(),
            })?;

            record.check().map_err(|message| ParseError::Malformed {
                record: record_number,
                message: message.to_string(),
            })?;

            let sequence = std::str::from_utf8(record.seq()).map_err(|err| ParseError::Malformed {
                record: record_number,
                message: format!("sequence is not valid UTF-8: {err}"),
            })?;

            let quality_scores = self.decode_qualities(record.qual(), record_number)?;

            reads.push(FastqRead::new(record.id(), sequence, quality_scores));

            if record_number % PROGRESS_INTERVAL == 0 {
                info!("  📊 Loaded {} reads", record_number);
            }
        }

        Ok(reads)
    }

    /// Subtract the quality offset; a byte below it means the wrong encoding
    fn decode_qualities(&self, encoded: &[u8], record: usize) -> Result<Vec<u8>, ParseError> {
        encoded
            .iter()
            .enumerate()
            .map(|(position, &q)| {
                q.checked_sub(self.quality_offset)
                    .ok_or_else(|| ParseError::Malformed {
                        record,
                        message: format!(
                            "quality character '{}' at position {} is below offset {}",
                            q as char,
                            position + 1,
                            self.quality_offset
                        ),
                    })
            })
            .collect()
    }

    fn is_gzipped(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false)
    }
}
