//! Config Reload (§4.11): the prepare-apply-reconfigure sequence, step 1
//! (load-and-validate) split out so the engine can alert-and-retain on
//! failure before touching any running state.

use std::path::Path;

use config::Config;

/// Loads and validates the configuration at `path`.
///
/// On failure the caller must display a user-visible alert and retain the
/// current configuration unchanged — this function itself has no side
/// effects either way, so [`crate::Engine::reload_config`] (step 1 of
/// which this is) simply propagates the `Err` via `?` without touching
/// any running state.
pub fn load_and_validate(path: &Path) -> Result<Config, config::Error> {
    config::load_from_path(path)
}

#[cfg(test)]
mod tests {
    #[test]
    fn invalid_config_is_rejected_without_side_effects() {
        let result = config::load_from_str("[hints]\nhint_characters = \"a\"", None);
        assert!(result.is_err());
    }

    #[test]
    fn valid_config_loads() {
        let cfg = config::load_from_str("[general]\nrestore_cursor_position = false", None).unwrap();
        assert!(!cfg.general.restore_cursor_position);
    }
}
