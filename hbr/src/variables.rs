//! Variable loading
//!
//! Each variables file is parsed as YAML into a mapping and the mappings are
//! merged in command-line order. The merge is shallow: a later file replaces
//! a top-level key wholesale, nested mappings are not combined.

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use log::{debug, info, warn};
use serde_yaml::{Mapping, Value};

use crate::error::RunError;

/// Template context: string keys to arbitrary YAML values
pub type Variables = Mapping;

/// Load and merge all variables files
pub fn load_variables(paths: &[PathBuf], remove_root_key: bool) -> Result<Variables> {
    info!("looking for variable definitions.");
    if let Some(message) = overwrite_warning(paths.len(), remove_root_key) {
        warn!("{}", message);
    }

    let mut variables = Variables::new();
    for path in paths {
        info!("reading variables from \"{}\".", path.display());
        let loaded = load_file(path, remove_root_key)?;
        debug!("loaded {} top-level key(s) from {}", loaded.len(), path.display());
        merge_into(&mut variables, loaded);
    }
    Ok(variables)
}

/// Warning text for loading several files that may clobber each other's keys
///
/// Not emitted when root keys are stripped, since namespaced files are the
/// intended way to combine variables.
pub fn overwrite_warning(file_count: usize, remove_root_key: bool) -> Option<String> {
    if file_count > 1 && !remove_root_key {
        Some(format!(
            "loading {} variables files: top-level keys of later files overwrite earlier ones.",
            file_count
        ))
    } else {
        None
    }
}

/// Parse one variables file into a mapping
pub fn load_file(path: &Path, remove_root_key: bool) -> Result<Variables> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read variables file {}", path.display()))?;
    parse_variables(&content, path, remove_root_key)
}

/// Parse variables text; `path` is only used for messages
pub fn parse_variables(content: &str, path: &Path, remove_root_key: bool) -> Result<Variables> {
    if is_blank_document(content) {
        debug!("{} has no content", path.display());
        return Ok(Variables::new());
    }

    let mut value: Value =
        serde_yaml::from_str(content).with_context(|| format!("Failed to parse variables file {}", path.display()))?;

    value
        .apply_merge()
        .with_context(|| format!("Failed to resolve merge keys in {}", path.display()))?;

    if remove_root_key {
        value = strip_root_key(value);
    }

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Variables::new()),
        other => Err(RunError::NotAMapping {
            path: path.to_path_buf(),
            found: kind_of(&other),
        }
        .into()),
    }
}

/// Replace a mapping with exactly one key by that key's value
///
/// Anything else is returned unchanged.
pub fn strip_root_key(value: Value) -> Value {
    match value {
        Value::Mapping(mapping) if mapping.len() == 1 => match mapping.into_iter().next() {
            Some((key, inner)) => {
                debug!("removing root key {:?}", key);
                inner
            }
            None => Value::Null,
        },
        other => other,
    }
}

/// Top-level merge: keys of `next` replace those already in `base`
pub fn merge_into(base: &mut Variables, next: Variables) {
    for (key, value) in next {
        base.insert(key, value);
    }
}

fn is_blank_document(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) | Value::Number(_) | Value::String(_) => "scalar",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EXIT_FAILURE;
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn parse(content: &str, remove_root_key: bool) -> Result<Variables> {
        parse_variables(content, Path::new("test.yml"), remove_root_key)
    }

    fn mapping_of(entries: &BTreeMap<String, i64>) -> Variables {
        entries
            .iter()
            .map(|(k, v)| (Value::String(k.clone()), Value::Number((*v).into())))
            .collect()
    }

    #[test]
    fn test_parse_mapping() {
        let vars = parse("name: World\nitems: [1, 2]\n", false).unwrap();
        assert_eq!(vars.get("name"), Some(&Value::String("World".to_string())));
        assert!(vars.get("items").unwrap().is_sequence());
    }

    #[test]
    fn test_empty_file_is_empty_mapping() {
        assert!(parse("", false).unwrap().is_empty());
        assert!(parse("# only a comment\n", false).unwrap().is_empty());
    }

    #[test]
    fn test_scalar_is_rejected() {
        let err = parse("just a string\n", false).unwrap_err();
        let run_err = err.downcast_ref::<RunError>().unwrap();
        assert!(matches!(run_err, RunError::NotAMapping { found: "scalar", .. }));
        assert_eq!(run_err.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn test_sequence_is_rejected() {
        let err = parse("- a\n- b\n", false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RunError>(),
            Some(RunError::NotAMapping { found: "sequence", .. })
        ));
    }

    #[test]
    fn test_json_document_is_accepted() {
        let vars = parse(r#"{"a": 1, "b": {"c": true}}"#, false).unwrap();
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_merge_keys_are_resolved() {
        let vars = parse("base: &b\n  host: h\nsrv:\n  <<: *b\n  port: 1\n", false).unwrap();
        let srv = vars.get("srv").unwrap().as_mapping().unwrap();
        assert!(srv.get("<<").is_none());
        assert_eq!(srv.get("host"), Some(&Value::String("h".to_string())));
        assert_eq!(srv.get("port"), Some(&Value::Number(1.into())));
    }

    #[test]
    fn test_merge_keys_under_root_key() {
        let vars = parse("root:\n  base: &b\n    x: 1\n  item:\n    <<: *b\n", true).unwrap();
        let item = vars.get("item").unwrap().as_mapping().unwrap();
        assert_eq!(item.get("x"), Some(&Value::Number(1.into())));
    }

    #[test]
    fn test_remove_root_key() {
        let vars = parse("root:\n  x: 1\n", true).unwrap();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars.get("x"), Some(&Value::Number(1.into())));
    }

    #[test]
    fn test_remove_root_key_needs_single_key() {
        let vars = parse("a: 1\nb: 2\n", true).unwrap();
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_remove_root_key_over_scalar_is_rejected() {
        let err = parse("root: 5\n", true).unwrap_err();
        assert!(err.downcast_ref::<RunError>().is_some());
    }

    #[test]
    fn test_remove_root_key_over_empty_value() {
        assert!(parse("root:\n", true).unwrap().is_empty());
    }

    #[test]
    fn test_later_file_overwrites() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first.yml");
        let second = temp.path().join("second.yml");
        fs::write(&first, "a: 1\nkeep: yes\n").unwrap();
        fs::write(&second, "a: 2\n").unwrap();

        let vars = load_variables(&[first, second], false).unwrap();
        assert_eq!(vars.get("a"), Some(&Value::Number(2.into())));
        assert!(vars.contains_key("keep"));
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut base = parse("db:\n  host: a\n  port: 1\n", false).unwrap();
        merge_into(&mut base, parse("db:\n  host: b\n", false).unwrap());
        let db = base.get("db").unwrap().as_mapping().unwrap();
        assert_eq!(db.len(), 1);
        assert!(db.get("port").is_none());
    }

    #[test]
    fn test_each_file_stripped_before_merge() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first.yml");
        let second = temp.path().join("second.yml");
        fs::write(&first, "one:\n  x: 1\n  y: 1\n").unwrap();
        fs::write(&second, "two:\n  x: 2\n").unwrap();

        let vars = load_variables(&[first, second], true).unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get("x"), Some(&Value::Number(2.into())));
        assert_eq!(vars.get("y"), Some(&Value::Number(1.into())));
    }

    #[test]
    fn test_missing_file_fails() {
        let err = load_variables(&[PathBuf::from("/nonexistent/vars.yml")], false).unwrap_err();
        assert!(err.downcast_ref::<RunError>().is_none());
        assert!(err.to_string().contains("/nonexistent/vars.yml"));
    }

    #[test]
    fn test_overwrite_warning() {
        assert!(overwrite_warning(0, false).is_none());
        assert!(overwrite_warning(1, false).is_none());
        assert!(overwrite_warning(2, false).is_some());
        assert!(overwrite_warning(2, true).is_none());
    }

    proptest! {
        #[test]
        fn prop_last_file_wins(
            first in prop::collection::btree_map("[a-e]{1,2}", any::<i64>(), 0..8),
            second in prop::collection::btree_map("[a-e]{1,2}", any::<i64>(), 0..8),
        ) {
            let mut merged = mapping_of(&first);
            merge_into(&mut merged, mapping_of(&second));

            for (key, value) in &second {
                prop_assert_eq!(merged.get(key.as_str()), Some(&Value::Number((*value).into())));
            }
            for (key, value) in first.iter().filter(|(k, _)| !second.contains_key(*k)) {
                prop_assert_eq!(merged.get(key.as_str()), Some(&Value::Number((*value).into())));
            }
            let union = first.keys().chain(second.keys()).collect::<std::collections::BTreeSet<_>>();
            prop_assert_eq!(merged.len(), union.len());
        }
    }
}
