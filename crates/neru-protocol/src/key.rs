use mac_keycode::Chord;

/// A canonicalized key string, e.g. `"cmd+shift+x"` or `"j"`.
///
/// Always lower-case with modifiers sorted alphabetically; produced by
/// [`canonicalize`] from whatever raw spelling the key tap or hotkey
/// grammar parser hands it.
pub type KeyEvent = String;

/// Parses and re-renders `raw` into its canonical spelling, or `None` if it
/// does not name a known chord.
///
/// Control characters 0x01..=0x1A canonicalize to `"ctrl+<a..z>"`, handled
/// by [`Chord::parse`] itself.
pub fn canonicalize(raw: &str) -> Option<KeyEvent> {
    Some(Chord::parse(raw)?.to_string_canonical())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_modifier_order() {
        assert_eq!(canonicalize("SHIFT+CMD+x"), Some("cmd+shift+x".to_string()));
    }

    #[test]
    fn canonicalizes_bare_key() {
        assert_eq!(canonicalize("j"), Some("j".to_string()));
    }

    #[test]
    fn rejects_unknown_spec() {
        assert_eq!(canonicalize("not-a-key"), None);
    }
}
