//! Sahayak Report Generation
//!
//! This crate provides types and utilities for generating teacher reports
//! from student marks. Reports can be serialized to JSON for programmatic
//! access or rendered to PDF for printing and sharing.
//!
//! # Types
//!
//! - [`StudentRow`] - One student's name and marks as entered by the teacher
//! - [`Grade`] - A letter grade derived from marks on a fixed scale
//! - [`GradedRow`] - A student row with its derived grade
//! - [`Report`] - The complete report with all graded rows
//!
//! # Generators
//!
//! - [`json::JsonGenerator`] - Generate JSON reports with compact or pretty formatting
//! - [`PdfGenerator`] - Render the report as a PDF document
//!
//! # Example
//!
//! ```rust
//! use sahayak_report::{Report, StudentRow, Grade};
//!
//! let report = Report::from_rows(
//!     "Class 5B - Term 1",
//!     vec![
//!         StudentRow { name: "Asha".to_string(), marks: 92 },
//!         StudentRow { name: "Vikram".to_string(), marks: 67 },
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(report.rows[0].grade, Grade::A);
//! assert_eq!(report.rows[1].grade, Grade::D);
//! ```

pub mod json;
mod pdf;

pub use json::JsonGenerator;
pub use pdf::PdfGenerator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to serialize the report to JSON.
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to read or write report files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid report data.
    #[error("invalid report data: {0}")]
    InvalidData(String),

    /// Failed to render the PDF document.
    #[error("failed to render PDF: {0}")]
    Pdf(String),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

// ============================================================================
// Grades
// ============================================================================

/// A letter grade on the fixed school scale.
///
/// The thresholds are not configurable: 90 and above is an A, 80 a B,
/// 70 a C, 60 a D, and everything below an F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    /// 90-100.
    A,
    /// 80-89.
    B,
    /// 70-79.
    C,
    /// 60-69.
    D,
    /// Below 60.
    F,
}

impl Grade {
    /// Derives the grade for the given marks.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidData`] if `marks` exceeds 100.
    pub fn from_marks(marks: u32) -> Result<Self> {
        if marks > 100 {
            return Err(ReportError::InvalidData(format!(
                "marks {marks} exceed the maximum of 100"
            )));
        }
        Ok(match marks {
            90..=100 => Self::A,
            80..=89 => Self::B,
            70..=79 => Self::C,
            60..=69 => Self::D,
            _ => Self::F,
        })
    }

    /// Returns the grade as a single letter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Report Data
// ============================================================================

/// One student's result as entered by the teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRow {
    /// The student's name.
    pub name: String,
    /// Marks out of 100.
    pub marks: u32,
}

/// A student row with its derived grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedRow {
    /// The student's name.
    pub name: String,
    /// Marks out of 100.
    pub marks: u32,
    /// The derived letter grade.
    pub grade: Grade,
}

/// A complete teacher report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report title, shown as the document heading.
    pub title: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// All graded rows, in the order they were entered.
    pub rows: Vec<GradedRow>,
}

impl Report {
    /// Builds a report from raw rows, deriving every grade.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidData`] if the report has no rows,
    /// a student name is empty, or any marks exceed 100.
    pub fn from_rows(title: impl Into<String>, rows: Vec<StudentRow>) -> Result<Self> {
        if rows.is_empty() {
            return Err(ReportError::InvalidData(
                "report must contain at least one student".to_string(),
            ));
        }

        let mut graded = Vec::with_capacity(rows.len());
        for row in rows {
            if row.name.trim().is_empty() {
                return Err(ReportError::InvalidData(
                    "student name must not be empty".to_string(),
                ));
            }
            let grade = Grade::from_marks(row.marks)?;
            graded.push(GradedRow {
                name: row.name,
                marks: row.marks,
                grade,
            });
        }

        Ok(Self {
            title: title.into(),
            generated_at: Utc::now(),
            rows: graded,
        })
    }
}
