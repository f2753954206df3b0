//! QR module matrix construction.
//!
//! Symbol encoding itself is delegated to the `qrcode` crate; this module
//! only picks the error-correction strength and flattens the result into a
//! square boolean grid.

use qrcode::{EcLevel, QrCode};

use crate::error::{Error, Result};

/// Error-correction strength of a QR symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcStrength {
    Low,
    Medium,
    Quartile,
    High,
}

impl EcStrength {
    /// Strength used for a payload. Logos occlude modules, so they get `High`.
    pub fn for_logo(has_logo: bool) -> Self {
        if has_logo { Self::High } else { Self::Quartile }
    }

    fn to_qrcode(self) -> EcLevel {
        match self {
            Self::Low => EcLevel::L,
            Self::Medium => EcLevel::M,
            Self::Quartile => EcLevel::Q,
            Self::High => EcLevel::H,
        }
    }

    /// Single-letter name as used by the QR standard.
    pub fn letter(self) -> char {
        match self {
            Self::Low => 'L',
            Self::Medium => 'M',
            Self::Quartile => 'Q',
            Self::High => 'H',
        }
    }
}

/// Square grid of QR modules, `true` meaning dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    size: usize,
    rows: Vec<Vec<bool>>,
    ec: EcStrength,
}

impl ModuleMatrix {
    /// Encodes `payload` into a module matrix.
    ///
    /// The payload is trimmed first. Requests `H` error correction when a
    /// logo will be overlaid, `Q` otherwise.
    pub fn build(payload: &str, has_logo: bool) -> Result<Self> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(Error::EmptyPayload);
        }

        let ec = EcStrength::for_logo(has_logo);
        let code = QrCode::with_error_correction_level(payload.as_bytes(), ec.to_qrcode())
            .map_err(|e| Error::Encoding(e.to_string()))?;

        let size = code.width();
        let rows = code
            .to_colors()
            .chunks(size)
            .map(|row| row.iter().map(|c| *c == qrcode::Color::Dark).collect())
            .collect();

        tracing::debug!(size, ec = %ec.letter(), bytes = payload.len(), "built module matrix");

        Ok(Self { size, rows, ec })
    }

    /// Wraps pre-computed rows. Returns `None` unless the grid is square.
    pub fn from_rows(rows: Vec<Vec<bool>>, ec: EcStrength) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Some(Self { size, rows, ec })
    }

    /// Number of modules along one side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Error-correction strength the matrix was built with.
    pub fn ec_level(&self) -> EcStrength {
        self.ec
    }

    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    /// Whether the module at column `x`, row `y` is dark. Out of range is light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.rows
            .get(y)
            .and_then(|row| row.get(x))
            .copied()
            .unwrap_or(false)
    }

    pub fn dark_count(&self) -> usize {
        self.rows.iter().flatten().filter(|d| **d).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_is_deterministic() {
        let a = ModuleMatrix::build("https://example.com", false).unwrap();
        let b = ModuleMatrix::build("https://example.com", false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn ec_level_follows_logo_flag() {
        let plain = ModuleMatrix::build("https://example.com", false).unwrap();
        let logo = ModuleMatrix::build("https://example.com", true).unwrap();
        assert_eq!(plain.ec_level(), EcStrength::Quartile);
        assert_eq!(logo.ec_level(), EcStrength::High);
        // Higher redundancy never produces a smaller symbol.
        assert!(logo.size() >= plain.size());
    }

    #[test]
    fn matrix_is_square() {
        let m = ModuleMatrix::build("hello", false).unwrap();
        assert_eq!(m.rows().len(), m.size());
        assert!(m.rows().iter().all(|r| r.len() == m.size()));
        // Smallest version is 21 modules wide.
        assert!(m.size() >= 21);
    }

    #[test]
    fn payload_is_trimmed() {
        let a = ModuleMatrix::build("  hello \n", false).unwrap();
        let b = ModuleMatrix::build("hello", false).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_payload_fails() {
        assert!(matches!(
            ModuleMatrix::build("   ", false),
            Err(Error::EmptyPayload)
        ));
    }

    #[test]
    fn oversized_payload_is_encoding_error() {
        let payload = "x".repeat(8000);
        assert!(matches!(
            ModuleMatrix::build(&payload, true),
            Err(Error::Encoding(_))
        ));
    }

    #[test]
    fn finder_corner_is_dark() {
        let m = ModuleMatrix::build("hello", false).unwrap();
        assert!(m.is_dark(0, 0));
        assert!(m.is_dark(m.size() - 1, 0));
        assert!(m.is_dark(0, m.size() - 1));
        assert!(!m.is_dark(m.size(), 0));
    }

    #[test]
    fn from_rows_rejects_ragged() {
        assert!(ModuleMatrix::from_rows(vec![vec![true, false], vec![true]], EcStrength::Low).is_none());
        let m = ModuleMatrix::from_rows(vec![vec![true, false], vec![false, true]], EcStrength::Low)
            .unwrap();
        assert_eq!(m.dark_count(), 2);
    }
}
