use std::{collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::{Key, Modifier};

/// A key chord: a set of modifiers plus a single key.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    /// Set of modifier keys held down for this chord.
    pub modifiers: HashSet<Modifier>,
    /// The non-modifier key for this chord.
    pub key: Key,
}

impl Chord {
    /// Parses a chord specification of the form "shift+opt+k".
    ///
    /// - Case-insensitive for both modifiers and the key.
    /// - Components are separated by "+"; the last component is always the key spec.
    /// - Modifiers may use aliases handled by `Modifier::from_spec` (e.g., cmd/ctrl/opt/alt/shift).
    /// - The key accepts the full `Key::from_spec` space (digits, punctuation, aliases, or names).
    pub fn parse(s: &str) -> Option<Self> {
        // A lone control character (0x01..=0x1A) is the raw-terminal spelling
        // of ctrl+<a..z>: 0x01 is ctrl+a, ... 0x1A is ctrl+z.
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && ('\u{1}'..='\u{1a}').contains(&c)
        {
            let letter = (b'a' + (c as u8 - 1)) as char;
            let key = Key::from_spec(&letter.to_string())?;
            let mut modifiers = HashSet::new();
            modifiers.insert(Modifier::Control);
            return Some(Self { modifiers, key });
        }

        let mut buf: Vec<&str> = s.split('+').collect();
        if buf.is_empty() {
            return None;
        }
        let key_raw = buf.pop().unwrap(); // keep raw to allow literal space
        let key = if key_raw == " " {
            Key::from_spec(" ")
        } else {
            Key::from_spec(key_raw.trim())
        }?;
        let mut modifiers = HashSet::new();
        for m in buf {
            let mt = m.trim();
            if mt.is_empty() {
                return None;
            }
            let mm = Modifier::from_spec(mt)?;
            modifiers.insert(mm);
        }
        Some(Self { modifiers, key })
    }

    /// Returns the canonical string form of this chord: modifiers sorted
    /// alphabetically by their spec string, followed by the key spec.
    pub fn to_string_canonical(&self) -> String {
        let mut mods: Vec<String> = self.modifiers.iter().map(|m| m.to_spec()).collect();
        mods.sort();
        let mut out = mods;
        out.push(self.key.to_spec());
        out.join("+")
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_chord() {
        let c = Chord::parse("shift+opt+k").expect("parse");
        assert!(c.modifiers.contains(&Modifier::Shift));
        assert!(c.modifiers.contains(&Modifier::Option));
        assert_eq!(c.key, Key::K);
        // Canonical order and lowercase specs
        assert_eq!(c.to_string(), "opt+shift+k");
    }

    #[test]
    fn digit_and_punct() {
        let c1 = Chord::parse("cmd+1").expect("parse");
        assert!(c1.modifiers.contains(&Modifier::Command));
        assert_eq!(c1.key, Key::Digit1);
        assert_eq!(c1.to_string(), "cmd+1");

        let c2 = Chord::parse("ctrl+, ").expect("parse");
        assert!(c2.modifiers.contains(&Modifier::Control));
        assert_eq!(c2.key, Key::Comma);
        assert_eq!(c2.to_string(), "ctrl+,");
    }

    #[test]
    fn idempotence_roundtrip() {
        let inputs = ["shift+opt+k", "CTRL+ALT+Space", "Command+Digit1", "fn+pgdn"];
        for s in inputs {
            let c = Chord::parse(s).expect("parse");
            let spec = c.to_string();
            let c2 = Chord::parse(&spec).expect("reparse");
            assert_eq!(c, c2, "idempotent for {} => {}", s, spec);
        }
    }

    #[test]
    fn control_character_spelling_matches_ctrl_chord() {
        let a = Chord::parse("CTRL+u").unwrap();
        let b = Chord::parse("ctrl+u").unwrap();
        let c = Chord::parse("\u{15}").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn parse_no_modifiers_letter() {
        let c = Chord::parse("a").expect("parse");
        assert!(c.modifiers.is_empty());
        assert_eq!(c.key, Key::A);
        assert_eq!(c.to_string(), "a");
    }
}
