//! Parse, validate, and load configuration from a TOML source.

use std::{fs, path::Path};

use crate::{Config, Error};

/// Load and validate a `Config` from a TOML file at `path`.
pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    let s = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    load_from_str(&s, Some(path))
}

/// Parse and validate a TOML config string into a resolved `Config`.
///
/// `path` is only used to enrich error messages.
pub fn load_from_str(s: &str, path: Option<&Path>) -> Result<Config, Error> {
    let cfg: Config = toml::from_str(s).map_err(|err| Error::from_toml(s, &err, path))?;
    validate(&cfg).map_err(|e| match path {
        Some(p) => e.with_path(p),
        None => e,
    })?;
    Ok(cfg)
}

/// Rejects a parsed configuration whose values violate §6's field
/// constraints. Unknown keys are already rejected during parsing by
/// `#[serde(deny_unknown_fields)]`.
fn validate(cfg: &Config) -> Result<(), Error> {
    if cfg.hints.hint_characters.chars().count() < 2 {
        return Err(Error::validation(
            "hints.hint_characters",
            "must contain at least 2 characters",
        ));
    }
    if !(2..=8).contains(&cfg.recursive_grid.size) {
        return Err(Error::validation(
            "recursive_grid.size",
            format!(
                "must be between 2 and 8, got {}",
                cfg.recursive_grid.size
            ),
        ));
    }
    for (key, action) in &cfg.hotkeys.bindings {
        if neru_protocol::canonicalize(key).is_none() {
            return Err(Error::validation(
                format!("hotkeys.bindings[{key:?}]"),
                format!("{key:?} is not a recognized hotkey grammar"),
            ));
        }
        if action.trim().is_empty() {
            return Err(Error::validation(
                format!("hotkeys.bindings[{key:?}]"),
                "action must not be empty",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_hint_alphabet() {
        let err = load_from_str("[hints]\nhint_characters = \"a\"\n", None).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn rejects_out_of_range_recursive_grid_size() {
        let err = load_from_str("[recursive_grid]\nsize = 1\n", None).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn rejects_unparseable_hotkey_grammar() {
        let err = load_from_str(
            "[hotkeys.bindings]\n\"not a chord\" = \"hints\"\n",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn accepts_a_well_formed_document() {
        let cfg = load_from_str(
            "[hotkeys.bindings]\n\"cmd+shift+h\" = \"hints\"\n",
            None,
        )
        .unwrap();
        assert_eq!(cfg.hotkeys.bindings.len(), 1);
    }
}
