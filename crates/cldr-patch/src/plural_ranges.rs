//! `pluralRanges` patch built from `pluralRanges.xml`
//!
//! The JSON export has no plural range data at all. Each `<pluralRanges>`
//! group lists several locales sharing one set of `<pluralRange>` records;
//! the patch is keyed by single locale, sorted.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::Result;
use crate::output::write_json;
use crate::xml::{self, select_one, Document, Element};

/// Source file, relative to the CLDR root
pub const SOURCE: &str = "common/supplemental/pluralRanges.xml";

/// Patch file name, relative to the destination
pub const OUTPUT: &str = "pluralRanges-fix.json";

/// Attributes of one `<pluralRange>`, in document order
pub type RangeRecord = IndexMap<String, String>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Patch {
    pub supplemental: Supplemental,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplemental {
    /// Locale code to its records, ordered by locale code
    pub plural_ranges: BTreeMap<String, Vec<RangeRecord>>,
}

fn records(group: &Element) -> Vec<RangeRecord> {
    group
        .children_named("pluralRange")
        .map(|range| range.attributes.clone())
        .collect()
}

/// Build the patch from a parsed `pluralRanges.xml`.
///
/// A locale listed by more than one group ends up with the records of the
/// last group listing it.
pub fn convert(doc: &Document, config: Config) -> Result<Patch> {
    let plurals = select_one(doc.descendants("plurals"), "plurals", config.selection)?;

    let mut ranges: BTreeMap<String, Vec<RangeRecord>> = BTreeMap::new();
    for group in plurals.children_named("pluralRanges") {
        let locales = group.required_attr("locales")?;
        let recs = records(group);
        for locale in locales.split_whitespace() {
            if ranges.insert(locale.to_string(), recs.clone()).is_some() {
                warn!(
                    locale,
                    "locale appears in more than one pluralRanges group, keeping the later one"
                );
            }
        }
    }

    Ok(Patch {
        supplemental: Supplemental {
            plural_ranges: ranges,
        },
    })
}

/// Read `<root>/common/supplemental/pluralRanges.xml` and write
/// `<dest>/pluralRanges-fix.json`; returns the written path
#[instrument(skip_all, fields(root = %root.display(), dest = %dest.display()))]
pub fn build(root: &Path, dest: &Path, config: Config) -> Result<PathBuf> {
    let doc = xml::read_document(&root.join(SOURCE))?;
    let patch = convert(&doc, config)?;
    info!(
        locales = patch.supplemental.plural_ranges.len(),
        "converted plural ranges"
    );

    let out = dest.join(OUTPUT);
    write_json(&out, &patch, config.key_order)?;
    Ok(out)
}
