//! `languageMatching` patch built from `languageInfo.xml`
//!
//! The JSON export garbles the `written_new` match rules, so the whole
//! `written_new` block is rebuilt from the XML: the ordered rule list, the
//! match variables and the paradigm locales.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::output::write_json;
use crate::xml::{self, select_one, Document, Element};

/// Source file, relative to the CLDR root
pub const SOURCE: &str = "common/supplemental/languageInfo.xml";

/// Patch file name, relative to the destination
pub const OUTPUT: &str = "languageMatching-fix.json";

const WRITTEN_NEW: &str = "written_new";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Patch {
    pub supplemental: Supplemental,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplemental {
    pub language_matching: LanguageMatching,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LanguageMatching {
    pub written_new: WrittenNew,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrittenNew {
    /// Space separated locale codes, verbatim
    pub paradigm_locales: String,
    pub match_variable: IndexMap<String, String>,
    pub language_match: Vec<MatchRule>,
}

/// One `<languageMatch>`; consumers apply these in order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MatchRule {
    pub desired: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(skip_serializing_if = "is_false", serialize_with = "serialize_flag")]
    pub oneway: bool,
}

impl MatchRule {
    fn from_element(el: &Element) -> Result<Self> {
        Ok(Self {
            desired: el.required_attr("desired")?.to_string(),
            supported: el.attr("supported").map(str::to_string),
            distance: el.attr("distance").map(str::to_string),
            oneway: el.attr("oneway").is_some(),
        })
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(flag: &bool) -> bool {
    !*flag
}

// the upstream schema spells a set flag as the string "1"
#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_flag<S: Serializer>(_flag: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str("1")
}

/// Build the patch from a parsed `languageInfo.xml`
pub fn convert(doc: &Document, config: Config) -> Result<Patch> {
    let matches = select_one(
        doc.descendants("languageMatches")
            .filter(|el| el.attr("type") == Some(WRITTEN_NEW)),
        "languageMatches[@type=\"written_new\"]",
        config.selection,
    )?;

    let language_match = matches
        .children_named("languageMatch")
        .map(MatchRule::from_element)
        .collect::<Result<Vec<_>>>()?;

    let paradigm = select_one(
        matches.children_named("paradigmLocales"),
        "paradigmLocales",
        config.selection,
    )?;
    let paradigm_locales = paradigm.required_attr("locales")?.to_string();

    let mut match_variable = IndexMap::new();
    for var in matches.children_named("matchVariable") {
        let id = var.required_attr("id")?;
        let value = var.required_attr("value")?;
        match_variable.insert(id.to_string(), value.to_string());
    }

    Ok(Patch {
        supplemental: Supplemental {
            language_matching: LanguageMatching {
                written_new: WrittenNew {
                    paradigm_locales,
                    match_variable,
                    language_match,
                },
            },
        },
    })
}

/// Read `<root>/common/supplemental/languageInfo.xml` and write
/// `<dest>/languageMatching-fix.json`; returns the written path
#[instrument(skip_all, fields(root = %root.display(), dest = %dest.display()))]
pub fn build(root: &Path, dest: &Path, config: Config) -> Result<PathBuf> {
    let doc = xml::read_document(&root.join(SOURCE))?;
    let patch = convert(&doc, config)?;
    let written_new = &patch.supplemental.language_matching.written_new;
    info!(
        rules = written_new.language_match.len(),
        variables = written_new.match_variable.len(),
        "converted language matching"
    );

    let out = dest.join(OUTPUT);
    write_json(&out, &patch, config.key_order)?;
    Ok(out)
}
