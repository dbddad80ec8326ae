//! Parameter types for derivative writes.
//!
//! These structs describe *what* to produce, not *how*. They sit between
//! [`operations`](super::operations), which decides sizes and paths, and the
//! [`backend`](super::backend), which does the pixel work.

use std::fmt;
use std::path::PathBuf;

/// Quality setting for lossy encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// The two derivative tiers every photo can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivativeKind {
    Thumbnail,
    Optimized,
}

impl fmt::Display for DerivativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerivativeKind::Thumbnail => write!(f, "thumbnail"),
            DerivativeKind::Optimized => write!(f, "optimized"),
        }
    }
}

/// A fully planned derivative write.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivativeParams {
    pub kind: DerivativeKind,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(80).value(), 80);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn derivative_kind_labels() {
        assert_eq!(DerivativeKind::Thumbnail.to_string(), "thumbnail");
        assert_eq!(DerivativeKind::Optimized.to_string(), "optimized");
    }
}
