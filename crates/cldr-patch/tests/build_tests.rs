use std::fs;
use std::path::{Path, PathBuf};

use cldr_patch::{build_all, language_matching, plural_ranges, rbnf, Config, Error, KeyOrder};
use serde_json::Value;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn cldr_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/cldr")
}

fn read_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, key| node.get(key))
}

#[test]
fn test_language_matching_fixture() -> TestResult {
    let dest = tempfile::tempdir()?;
    let out = language_matching::build(&cldr_root(), dest.path(), Config::default())?;
    assert_eq!(out, dest.path().join("languageMatching-fix.json"));

    let json = read_json(&out)?;
    let written_new = lookup(&json, &["supplemental", "languageMatching", "written_new"]);
    let written_new = written_new.ok_or("missing written_new")?;

    let rules = written_new
        .get("languageMatch")
        .and_then(Value::as_array)
        .ok_or("missing languageMatch")?;
    assert_eq!(rules.len(), 9);
    assert_eq!(
        rules.first().and_then(|r| r.get("desired")),
        Some(&Value::from("nb"))
    );
    assert_eq!(
        rules.last().and_then(|r| r.get("desired")),
        Some(&Value::from("*_*_*"))
    );

    let oneway: Vec<&Value> = rules.iter().filter_map(|r| r.get("oneway")).collect();
    assert_eq!(oneway, vec![&Value::from("1"), &Value::from("1")]);

    let ids: Vec<&str> = written_new
        .get("matchVariable")
        .and_then(Value::as_object)
        .map(|vars| vars.keys().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(ids, vec!["$enUS", "$cnsar", "$americas", "$maghreb"]);

    assert_eq!(
        written_new.get("paradigmLocales"),
        Some(&Value::from("en en_GB es es_419 pt_BR pt_PT"))
    );
    Ok(())
}

#[test]
fn test_plural_ranges_fixture() -> TestResult {
    let dest = tempfile::tempdir()?;
    let out = plural_ranges::build(&cldr_root(), dest.path(), Config::default())?;
    let json = read_json(&out)?;
    let ranges = lookup(&json, &["supplemental", "pluralRanges"])
        .and_then(Value::as_object)
        .ok_or("missing pluralRanges")?;

    let keys: Vec<&String> = ranges.keys().collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(ranges.len(), 32);

    assert_eq!(ranges.get("en"), ranges.get("sv"));
    assert_ne!(ranges.get("en"), ranges.get("fr"));
    assert_eq!(
        ranges.get("pl").and_then(Value::as_array).map(Vec::len),
        Some(14)
    );
    Ok(())
}

#[test]
fn test_rbnf_fixture() -> TestResult {
    let dest = tempfile::tempdir()?;
    let written = rbnf::build(&cldr_root(), dest.path(), Config::default())?;
    let rbnf_dir = dest.path().join("rbnf");
    assert_eq!(
        written,
        vec![rbnf_dir.join("de.json"), rbnf_dir.join("en.json")]
    );

    let en = read_json(&rbnf_dir.join("en.json"))?;
    let cardinal = lookup(&en, &["SpelloutRules", "spellout-cardinal"]).ok_or("missing ruleset")?;
    assert_eq!(cardinal.get("private"), Some(&Value::from(0)));

    let values: Vec<&str> = cardinal
        .get("rules")
        .and_then(Value::as_array)
        .map(|rules| {
            rules
                .iter()
                .filter_map(|r| r.get("value").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(
        values,
        vec!["-x", "x.x", "0", "1", "20", "100", "1000", "1000000", "1000000000000000000"]
    );

    let year = lookup(&en, &["SpelloutRules", "2d-year", "private"]);
    assert_eq!(year, Some(&Value::from(1)));

    let radix = lookup(&en, &["SpelloutRules", "spellout-numbering-year", "rules"])
        .and_then(|rules| rules.get(3))
        .and_then(|rule| rule.get("value"));
    assert_eq!(radix, Some(&Value::from("1010/100")));
    Ok(())
}

#[test]
fn test_rbnf_text_is_utf8_literal() -> TestResult {
    let dest = tempfile::tempdir()?;
    rbnf::build(&cldr_root(), dest.path(), Config::default())?;
    let text = fs::read_to_string(dest.path().join("rbnf/en.json"))?;
    assert!(text.contains("\"rule\": \"←← million[ →→];\""));
    assert!(!text.contains("\\u2190"));

    let de = fs::read_to_string(dest.path().join("rbnf/de.json"))?;
    assert!(de.contains("\"rule\": \"& ' ' , ',' ;\""));
    Ok(())
}

#[test]
fn test_rbnf_clears_destination() -> TestResult {
    let dest = tempfile::tempdir()?;
    let rbnf_dir = dest.path().join("rbnf");
    fs::create_dir_all(rbnf_dir.join("old"))?;
    fs::write(rbnf_dir.join("zz.json"), "{}")?;
    fs::write(rbnf_dir.join("old/notes.txt"), "stale")?;
    fs::write(dest.path().join("keep.json"), "{}")?;

    rbnf::build(&cldr_root(), dest.path(), Config::default())?;

    let mut names: Vec<String> = fs::read_dir(&rbnf_dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    names.sort();
    assert_eq!(names, vec!["de.json", "en.json"]);
    assert!(dest.path().join("keep.json").exists());
    Ok(())
}

#[test]
fn test_build_all_is_idempotent() -> TestResult {
    let dest = tempfile::tempdir()?;
    let first = build_all(&cldr_root(), dest.path(), Config::default())?;
    let snapshot: Vec<Vec<u8>> = first.files().map(fs::read).collect::<Result<_, _>>()?;

    let second = build_all(&cldr_root(), dest.path(), Config::default())?;
    assert_eq!(first, second);
    let again: Vec<Vec<u8>> = second.files().map(fs::read).collect::<Result<_, _>>()?;
    assert_eq!(snapshot, again);
    assert_eq!(first.files().count(), 4);
    Ok(())
}

#[test]
fn test_sorted_key_order() -> TestResult {
    let dest = tempfile::tempdir()?;
    let config = Config::default().with_key_order(KeyOrder::Sorted);
    let out = language_matching::build(&cldr_root(), dest.path(), config)?;
    let text = fs::read_to_string(out)?;

    let pos = |needle: &str| text.find(needle).unwrap_or(usize::MAX);
    assert!(pos("\"languageMatch\"") < pos("\"matchVariable\""));
    assert!(pos("\"matchVariable\"") < pos("\"paradigmLocales\""));
    assert!(pos("\"$americas\"") < pos("\"$cnsar\""));
    assert!(pos("\"distance\": \"1\"") < pos("\"supported\": \"no\""));
    Ok(())
}

#[test]
fn test_missing_source_is_io_error() -> TestResult {
    let root = tempfile::tempdir()?;
    let dest = tempfile::tempdir()?;
    let err = plural_ranges::build(root.path(), dest.path(), Config::default()).err();
    match err {
        Some(Error::Io { path, .. }) => {
            assert!(path.ends_with("common/supplemental/pluralRanges.xml"));
        }
        other => return Err(format!("expected io error, got {other:?}").into()),
    }
    Ok(())
}

#[test]
fn test_malformed_xml_reports_path() -> TestResult {
    let root = tempfile::tempdir()?;
    let dest = tempfile::tempdir()?;
    let dir = root.path().join("common/rbnf");
    fs::create_dir_all(&dir)?;
    fs::write(dir.join("xx.xml"), "<ldml><rbnf></ldml>")?;

    let err = rbnf::build(root.path(), dest.path(), Config::default()).err();
    let message = err.map(|e| e.to_string()).unwrap_or_default();
    assert!(message.contains("xx.xml"));
    assert!(message.contains("expected </rbnf>, found </ldml>"));
    Ok(())
}

#[test]
fn test_rbnf_rule_without_value() -> TestResult {
    let root = tempfile::tempdir()?;
    let dest = tempfile::tempdir()?;
    let dir = root.path().join("common/rbnf");
    fs::create_dir_all(&dir)?;
    fs::write(
        dir.join("xx.xml"),
        r#"<ldml><rbnf><rulesetGrouping type="SpelloutRules">
            <ruleset type="spellout-numbering"><rbnfrule>zero;</rbnfrule></ruleset>
        </rulesetGrouping></rbnf></ldml>"#,
    )?;

    let err = rbnf::build(root.path(), dest.path(), Config::default()).err();
    assert!(matches!(err, Some(Error::MalformedValue { attribute: "value", .. })));
    Ok(())
}

#[test]
fn test_public_rulesets_summary() -> TestResult {
    let summary = rbnf::public_rulesets(&cldr_root())?;
    let codes: Vec<&String> = summary.keys().collect();
    assert_eq!(codes, vec!["de", "en"]);

    let en: Vec<&str> = summary
        .get("en")
        .map(|names| names.iter().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(
        en,
        vec!["digits-ordinal", "spellout-cardinal", "spellout-numbering-year"]
    );
    Ok(())
}
