//! Signal Ingest
//!
//! Parses a CSV / plain-text upload into a [`SignalSeries`].
//! Input: raw bytes. Output: validated series or an input error.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::series::SignalSeries;
use crate::constants::{DEFAULT_MAX_SAMPLES, DEFAULT_MAX_UPLOAD_BYTES};
use crate::error::{AnalysisError, AnalysisResult};

const UTF8_BOM: char = '\u{feff}';

/// Ceilings that protect the spectral stage from pathological uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestLimits {
    pub max_upload_bytes: usize,
    pub max_samples: usize,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignalIngest {
    limits: IngestLimits,
}

impl SignalIngest {
    pub fn new(limits: IngestLimits) -> Self {
        Self { limits }
    }

    /// Parse upload bytes into a series.
    ///
    /// Separators `,` `;` tab and whitespace are interchangeable. Cells that
    /// do not parse as a finite number (headers, labels, `NaN`) are skipped.
    pub fn parse(&self, raw: &[u8]) -> AnalysisResult<SignalSeries> {
        if raw.len() > self.limits.max_upload_bytes {
            return Err(AnalysisError::FileTooLarge {
                limit: self.limits.max_upload_bytes,
                actual: raw.len(),
                unit: "byte",
            });
        }

        let text = decode_text(raw);
        let mut samples = Vec::new();
        let mut total = 0usize;

        for line in text.lines() {
            for cell in line.split(is_separator) {
                let Some(value) = parse_cell(cell) else {
                    continue;
                };
                total += 1;
                if total <= self.limits.max_samples {
                    samples.push(value);
                }
            }
        }

        if total > self.limits.max_samples {
            return Err(AnalysisError::FileTooLarge {
                limit: self.limits.max_samples,
                actual: total,
                unit: "sample",
            });
        }

        log::debug!("Ingested {} samples from {} bytes", samples.len(), raw.len());
        SignalSeries::from_samples(samples)
    }
}

/// UTF-8 first (BOM stripped), Latin-1 as the fallback
fn decode_text(raw: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(raw) {
        Ok(text) => Cow::Borrowed(text.trim_start_matches(UTF8_BOM)),
        Err(_) => {
            log::debug!("Upload is not valid UTF-8, decoding as Latin-1");
            Cow::Owned(raw.iter().map(|&b| b as char).collect())
        }
    }
}

fn is_separator(c: char) -> bool {
    c == ',' || c == ';' || c.is_whitespace()
}

fn parse_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim().trim_matches('"');
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> AnalysisResult<Vec<f64>> {
        SignalIngest::default()
            .parse(input.as_bytes())
            .map(|s| s.as_slice().to_vec())
    }

    #[test]
    fn test_one_value_per_line() {
        assert_eq!(parse("1.5\n-2\n3e1\n").unwrap(), vec![1.5, -2.0, 30.0]);
    }

    #[test]
    fn test_mixed_separators() {
        assert_eq!(
            parse("1,2;3\t4 5\r\n6").unwrap(),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
    }

    #[test]
    fn test_skips_headers_and_garbage() {
        let input = "time,value\n0,\"0.25\"\n1,abc\n,\n2,NaN\n3,inf\n";
        assert_eq!(parse(input).unwrap(), vec![0.0, 0.25, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_strips_bom() {
        assert_eq!(parse("\u{feff}7\n8").unwrap(), vec![7.0, 8.0]);
    }

    #[test]
    fn test_latin1_fallback() {
        // 0xB5 is "µ" in Latin-1 and invalid as a lone UTF-8 byte
        let raw = b"\xb5V\n1.0\n2.0\n";
        let series = SignalIngest::default().parse(raw).unwrap();
        assert_eq!(series.as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn test_empty_and_unparsable() {
        assert_eq!(parse(""), Err(AnalysisError::EmptyOrUnparsableInput));
        assert_eq!(parse("   \n\n"), Err(AnalysisError::EmptyOrUnparsableInput));
        assert_eq!(parse("a,b,c\nd"), Err(AnalysisError::EmptyOrUnparsableInput));
    }

    #[test]
    fn test_byte_ceiling() {
        let ingest = SignalIngest::new(IngestLimits {
            max_upload_bytes: 4,
            max_samples: 100,
        });
        let err = ingest.parse(b"1,2,3").unwrap_err();
        assert_eq!(
            err,
            AnalysisError::FileTooLarge { limit: 4, actual: 5, unit: "byte" }
        );
    }

    #[test]
    fn test_sample_ceiling_is_fatal_not_truncating() {
        let ingest = SignalIngest::new(IngestLimits {
            max_upload_bytes: 1024,
            max_samples: 3,
        });
        assert!(ingest.parse(b"1\n2\n3").is_ok());

        let err = ingest.parse(b"1\n2\n3\n4\n5").unwrap_err();
        assert_eq!(
            err,
            AnalysisError::FileTooLarge { limit: 3, actual: 5, unit: "sample" }
        );
    }
}
