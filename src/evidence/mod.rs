//! # Evidence capture
//!
//! Annotated screenshots recording how each test ended.
//!
//! ## Module structure
//! - `highlight`: temporary element highlighting
//! - `naming`: artifact file names
//! - `capture`: screenshot writing

pub mod highlight;
pub mod naming;
pub mod capture;

pub use highlight::{highlight, unhighlight, highlight_style, StyleSnapshot};
pub use naming::EvidenceTag;
pub use capture::{EvidenceArtifact, EvidenceRecorder};
