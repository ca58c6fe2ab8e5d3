//! Per-residue quality score decoding.
//!
//! Each sequencing convention encodes scores as printable bytes with its own
//! offset and valid window. Codes outside the window are clamped to the
//! nearest boundary and reported, one [`QualityClamp`] per offending byte.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Quality encoding convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityScale {
    /// Raw Phred values stored as `code - 33` (trace formats, SAM/BAM)
    Phred,
    /// Sanger FASTQ, Phred+33
    Sanger,
    /// Illumina 1.3+ FASTQ, Phred+64
    Illumina,
    /// Solexa FASTQ, Solexa+64 converted to the Phred scale
    Solexa,
}

/// A quality byte that was outside the valid window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityClamp {
    /// Zero-based offset within the decoded block
    pub position: usize,
    /// The offending byte
    pub code: u8,
    /// The boundary byte used instead
    pub clamped_to: u8,
}

/// Table size: every code up to `~` (126) is addressable
const TABLE_LEN: usize = 127;

fn phred_table() -> &'static [f32; TABLE_LEN] {
    static TABLE: OnceLock<[f32; TABLE_LEN]> = OnceLock::new();
    TABLE.get_or_init(|| offset_table(33))
}

fn illumina_table() -> &'static [f32; TABLE_LEN] {
    static TABLE: OnceLock<[f32; TABLE_LEN]> = OnceLock::new();
    TABLE.get_or_init(|| offset_table(64))
}

fn solexa_table() -> &'static [f32; TABLE_LEN] {
    static TABLE: OnceLock<[f32; TABLE_LEN]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0.0f32; TABLE_LEN];
        for (code, slot) in table.iter_mut().enumerate() {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
            {
                let solexa = code as f64 - 64.0;
                *slot = (10.0 * (10f64.powf(solexa / 10.0) + 1.0).log10()) as f32;
            }
        }
        table
    })
}

fn offset_table(offset: u8) -> [f32; TABLE_LEN] {
    let mut table = [0.0f32; TABLE_LEN];
    for (code, slot) in table.iter_mut().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        {
            *slot = (code as f32 - f32::from(offset)).max(0.0);
        }
    }
    table
}

impl QualityScale {
    /// Lowest valid encoded byte
    #[must_use]
    pub fn min_code(self) -> u8 {
        match self {
            Self::Phred | Self::Sanger => 33,
            Self::Illumina => 64,
            Self::Solexa => 59,
        }
    }

    /// Highest valid encoded byte
    #[must_use]
    pub fn max_code(self) -> u8 {
        126
    }

    fn table(self) -> &'static [f32; TABLE_LEN] {
        match self {
            Self::Phred | Self::Sanger => phred_table(),
            Self::Illumina => illumina_table(),
            Self::Solexa => solexa_table(),
        }
    }

    /// Decode a single byte, clamping to the valid window.
    ///
    /// The second value is true when the byte had to be clamped.
    #[must_use]
    pub fn score(self, code: u8) -> (f32, bool) {
        let clamped = code.clamp(self.min_code(), self.max_code());
        (self.table()[usize::from(clamped)], clamped != code)
    }

    /// Decode a block of encoded quality bytes
    #[must_use]
    pub fn decode(self, encoded: &[u8]) -> (Vec<f32>, Vec<QualityClamp>) {
        let mut scores = Vec::with_capacity(encoded.len());
        let mut clamps = Vec::new();
        for (position, &code) in encoded.iter().enumerate() {
            let (score, was_clamped) = self.score(code);
            if was_clamped {
                clamps.push(QualityClamp {
                    position,
                    code,
                    clamped_to: code.clamp(self.min_code(), self.max_code()),
                });
            }
            scores.push(score);
        }
        (scores, clamps)
    }
}

impl std::fmt::Display for QualityScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Phred => write!(f, "phred"),
            Self::Sanger => write!(f, "sanger"),
            Self::Illumina => write!(f, "illumina"),
            Self::Solexa => write!(f, "solexa"),
        }
    }
}
