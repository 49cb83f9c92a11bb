//! Tensor storage formats.

use serde::{Deserialize, Serialize};

/// Storage of a single tensor mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModeFormat {
    /// Every coordinate of the mode is stored
    Dense,
    /// Only nonzero coordinates are stored
    Compressed,
}

/// Storage format: one mode format per tensor mode, stored in `mode_ordering`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Format {
    pub mode_formats: Vec<ModeFormat>,
    pub mode_ordering: Vec<usize>,
}

impl Format {
    /// Format with the given mode formats stored in natural mode order.
    pub fn new(mode_formats: Vec<ModeFormat>) -> Self {
        let mode_ordering = (0..mode_formats.len()).collect();
        Format {
            mode_formats,
            mode_ordering,
        }
    }

    pub fn with_ordering(mode_formats: Vec<ModeFormat>, mode_ordering: Vec<usize>) -> Self {
        Format {
            mode_formats,
            mode_ordering,
        }
    }

    /// All-dense format of the given order.
    pub fn dense(order: usize) -> Self {
        Format::new(vec![ModeFormat::Dense; order])
    }

    /// Compressed sparse row.
    pub fn csr() -> Self {
        Format::new(vec![ModeFormat::Dense, ModeFormat::Compressed])
    }

    /// Compressed sparse column.
    pub fn csc() -> Self {
        Format::with_ordering(vec![ModeFormat::Dense, ModeFormat::Compressed], vec![1, 0])
    }

    pub fn order(&self) -> usize {
        self.mode_formats.len()
    }

    pub fn is_dense(&self) -> bool {
        self.mode_formats.iter().all(|m| *m == ModeFormat::Dense)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predefined_formats() {
        assert!(Format::dense(3).is_dense());
        assert_eq!(Format::dense(3).order(), 3);
        assert!(!Format::csr().is_dense());
        assert_eq!(Format::csc().mode_ordering, vec![1, 0]);
        assert_eq!(Format::csr().mode_ordering, vec![0, 1]);
    }
}
