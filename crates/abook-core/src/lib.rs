//! # abook-core
//!
//! Core library for organizing audiobook folders into a canonical
//! `Author/[Series/]Title` layout.
//!
//! This crate provides the foundational functionality for:
//! - Scanning a source tree into audiobook units (including multi-volume
//!   books and folders of single-file `.m4b` books)
//! - Extracting metadata from embedded tags, file and folder names, the
//!   folder hierarchy and cascading sidecar override files
//! - Consolidating competing values into one record with confidences
//! - Previewing and executing copy, move, hard-link or symlink runs
//! - Detecting near-duplicate author and narrator spellings
//!
//! ## Modules
//!
//! - [`config`] - Configuration, operation kinds and consolidation weights
//! - [`dedup`] - Union-find name grouping and exact-key duplicate checks
//! - [`error`] - Error types and Result alias
//! - [`extract`] - Tag, filename and folder-hierarchy extractors
//! - [`metadata`] - Candidates, consolidation and the extraction pipeline
//! - [`organize`] - File operators and the organizer
//! - [`overrides`] - `bookinfo.json` / `metadata.json` / `metadata.nfo` sidecars
//! - [`path`] - Target path generation
//! - [`preview`] - Side-effect-free dry runs
//! - [`scanner`] - Discovery of audiobook units
//!
//! ## Example
//!
//! ```no_run
//! use abook_core::{FileOrganizer, OrganizerConfig, PreviewGenerator, PreviewOptions};
//! use std::path::Path;
//!
//! let config = OrganizerConfig::load();
//! let source = Path::new("/audiobooks/incoming");
//! let destination = Path::new("/audiobooks/library");
//!
//! let preview = PreviewGenerator::new(config.clone())
//!     .preview(source, destination, &PreviewOptions::from_config(&config))
//!     .expect("Failed to preview");
//! println!("{} units to organize", preview.statistics.to_process);
//!
//! if !preview.has_errors() {
//!     let result = FileOrganizer::from_config(config)
//!         .organize(&preview.plans(), source)
//!         .expect("Plans collided");
//!     println!("{} succeeded, {} failed", result.succeeded, result.failed);
//! }
//! ```

// Module declarations
pub mod config;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod markers;
pub mod metadata;
pub mod organize;
pub mod overrides;
pub mod path;
pub mod preview;
pub mod progress;
pub mod scanner;
pub mod text;
pub mod utils;

// Re-export key types for convenience

// Error types
pub use error::{Error, Result};

// Configuration
pub use config::{CacheMode, FieldWeights, OperationKind, OrganizerConfig, SourceWeights, VerifyMode};

// Scanning
pub use scanner::{AudiobookUnit, DirectoryScanner, ScanOptions, ScanProgress, ScanSummary};

// Extraction and consolidation
pub use extract::{FilenameParser, FolderHierarchyAnalyzer, LoftyTagSource, TagExtractor, TagSource};
pub use metadata::{
    BookMetadataCandidate, ConsolidatedMetadata, MetadataConsolidator, MetadataExtractor,
    MetadataField, MetadataSource, UnitMetadata,
};

// Sidecars
pub use overrides::{
    load_chain, load_file_chain, HierarchicalOverrideChain, MetadataOverride, SidecarFormatter,
    SidecarWriter, WriteStatus,
};

// Paths
pub use path::{needs_reorganize, PathGenerator, PathPolicy};

// Duplicates
pub use dedup::{DuplicateDetector, DuplicateGroup, DuplicateKey, UnionFind};

// Preview and organize
pub use organize::{
    FileOperator, FileOrganizer, OrganizationPlan, OrganizationResult, OrganizeProgress, PlanState,
};
pub use preview::{PreviewGenerator, PreviewOptions, PreviewResult};

// Text
pub use text::{StandardNormalizer, TextNormalizer};
