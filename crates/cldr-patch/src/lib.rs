//! cldr-patch - JSON patch files for the CLDR JSON export
//!
//! A few corners of the CLDR JSON export are missing or wrong. This crate
//! rebuilds them from the CLDR XML sources:
//!
//! - [`language_matching`]: `languageMatching-fix.json` from `languageInfo.xml`
//! - [`plural_ranges`]: `pluralRanges-fix.json` from `pluralRanges.xml`
//! - [`rbnf`]: `rbnf/<code>.json` from each `rbnf/<code>.xml`
//!
//! Each converter reads its XML, runs a pure conversion and writes
//! pretty-printed JSON.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use cldr_patch::{build_all, Config};
//! # fn main() -> Result<(), cldr_patch::Error> {
//! let report = build_all(Path::new("cldr"), Path::new("patches"), Config::default())?;
//! assert_eq!(report.files().count(), 2 + report.rbnf.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

pub mod config;
pub use config::{Config, KeyOrder, Selection};

pub mod error;
pub use error::{Error, Pos, Result, Span, SyntaxError, SyntaxErrorKind};

pub mod output;
pub mod xml;

pub mod language_matching;
pub mod plural_ranges;
pub mod rbnf;

/// Files written by [`build_all`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub language_matching: PathBuf,
    pub plural_ranges: PathBuf,
    pub rbnf: Vec<PathBuf>,
}

impl Report {
    /// Every written path, in the order the converters ran
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        [self.language_matching.as_path(), self.plural_ranges.as_path()]
            .into_iter()
            .chain(self.rbnf.iter().map(PathBuf::as_path))
    }
}

/// Run every converter against one CLDR checkout.
///
/// Stops at the first failure; outputs written before it stay on disk.
#[instrument(skip_all, fields(root = %root.display(), dest = %dest.display()))]
pub fn build_all(root: &Path, dest: &Path, config: Config) -> Result<Report> {
    let report = Report {
        language_matching: language_matching::build(root, dest, config)?,
        plural_ranges: plural_ranges::build(root, dest, config)?,
        rbnf: rbnf::build(root, dest, config)?,
    };
    info!(files = report.files().count(), "all patches written");
    Ok(report)
}
