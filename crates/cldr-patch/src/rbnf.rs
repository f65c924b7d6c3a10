//! Per-locale RBNF patches built from `common/rbnf/*.xml`
//!
//! Every source file becomes `<dest>/rbnf/<code>.json` holding
//! grouping type -> ruleset type -> `{ private, rules }`.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{reset_dir, write_json};
use crate::xml::{self, Document, Element};

/// Source directory, relative to the CLDR root
pub const SOURCE_DIR: &str = "common/rbnf";

/// Output directory, relative to the destination
pub const OUTPUT_DIR: &str = "rbnf";

/// Grouping type -> ruleset type -> ruleset
pub type Rbnf = IndexMap<String, IndexMap<String, Ruleset>>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ruleset {
    /// 1 when the source ruleset carries an `access` attribute
    pub private: u8,
    pub rules: Vec<Rule>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub value: String,
    /// Rule body; `None` for an empty `<rbnfrule/>`
    pub rule: Option<String>,
}

/// Normalize an `rbnfrule` value: append `/radix`, map the `x,x` fraction
/// rule to `x.x` and drop digit grouping commas.
pub fn rule_value(value: &str, radix: Option<&str>) -> String {
    let value = match radix {
        Some(radix) if !radix.is_empty() => format!("{value}/{radix}"),
        _ => value.to_string(),
    };
    if value == "x,x" {
        return "x.x".to_string();
    }
    value.replace(',', "")
}

fn rule(el: &Element) -> Result<Rule> {
    let value = el.attr("value").ok_or_else(|| Error::MalformedValue {
        element: el.name.clone(),
        attribute: "value",
        reason: "rule has no value".to_string(),
    })?;
    Ok(Rule {
        value: rule_value(value, el.attr("radix")),
        rule: el.text().map(str::to_string),
    })
}

fn ruleset(el: &Element) -> Result<Ruleset> {
    Ok(Ruleset {
        private: u8::from(el.attr("access").is_some()),
        rules: el
            .children_named("rbnfrule")
            .map(rule)
            .collect::<Result<Vec<_>>>()?,
    })
}

/// Build the patch for one parsed RBNF file
pub fn convert(doc: &Document) -> Result<Rbnf> {
    let mut groups = Rbnf::new();
    for group in doc.descendants("rulesetGrouping") {
        let group_type = group.required_attr("type")?;
        let mut rulesets = IndexMap::new();
        for el in group.children_named("ruleset") {
            let name = el.required_attr("type")?;
            rulesets.insert(name.to_string(), ruleset(el)?);
        }
        groups.insert(group_type.to_string(), rulesets);
    }
    Ok(groups)
}

/// Ruleset types not marked `access="private"`, across all groupings
pub fn public_ruleset_types(doc: &Document) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for el in doc
        .descendants("rulesetGrouping")
        .flat_map(|group| group.children_named("ruleset"))
    {
        if el.attr("access") == Some("private") {
            continue;
        }
        names.insert(el.required_attr("type")?.to_string());
    }
    Ok(names)
}

/// `(code, path)` of every `*.xml` in `dir`, sorted by code
pub fn sources(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    let mut found = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("xml") {
            continue;
        }
        match path.file_stem().and_then(|stem| stem.to_str()) {
            Some(code) => found.push((code.to_string(), path.clone())),
            None => warn!(path = %path.display(), "skipping file with non utf-8 name"),
        }
    }
    found.sort();
    Ok(found)
}

/// Convert every `<root>/common/rbnf/<code>.xml` into
/// `<dest>/rbnf/<code>.json`.
///
/// `<dest>/rbnf` is emptied first; nothing previously in it survives.
#[instrument(skip_all, fields(root = %root.display(), dest = %dest.display()))]
pub fn build(root: &Path, dest: &Path, config: Config) -> Result<Vec<PathBuf>> {
    let out_dir = dest.join(OUTPUT_DIR);
    reset_dir(&out_dir)?;

    let mut written = Vec::new();
    for (code, path) in sources(&root.join(SOURCE_DIR))? {
        let doc = xml::read_document(&path)?;
        let rbnf = convert(&doc)?;
        debug!(code = %code, groups = rbnf.len(), "converted rbnf");

        let out = out_dir.join(format!("{code}.json"));
        write_json(&out, &rbnf, config.key_order)?;
        written.push(out);
    }

    info!(files = written.len(), "converted rbnf");
    Ok(written)
}

/// Locale code -> public ruleset types, for every RBNF source with at
/// least one public ruleset
#[instrument(skip_all, fields(root = %root.display()))]
pub fn public_rulesets(root: &Path) -> Result<BTreeMap<String, BTreeSet<String>>> {
    let mut summary = BTreeMap::new();
    for (code, path) in sources(&root.join(SOURCE_DIR))? {
        let names = public_ruleset_types(&xml::read_document(&path)?)?;
        if !names.is_empty() {
            summary.insert(code, names);
        }
    }
    Ok(summary)
}
