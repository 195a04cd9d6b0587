//! Key chords: normalization of key names and keystroke construction.
//!
//! A layout stores a shortcut as a loose list of key names (`["cmd", "T"]`,
//! `["Control", "Option", "space"]`).  [`KeyChord::parse`] collapses the
//! common modifier aliases onto four canonical modifiers and lowercases the
//! remaining keys, preserving their order.

use serde::{Deserialize, Serialize};

/// Key code sent when a chord consists of modifiers only (Tab, so that
/// `command` alone behaves like the application switcher).
pub const MODIFIER_ONLY_KEY_CODE: u16 = 48;

/// One of the four canonical modifier keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Command,
    Option,
    Control,
    Shift,
}

impl Modifier {
    /// Map a key name (any case, common aliases) onto a canonical modifier.
    pub fn from_alias(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "cmd" | "command" | "meta" | "super" => Some(Self::Command),
            "opt" | "option" | "alt" => Some(Self::Option),
            "ctrl" | "control" => Some(Self::Control),
            "shift" => Some(Self::Shift),
            _ => None,
        }
    }

    /// The canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Option => "option",
            Self::Control => "control",
            Self::Shift => "shift",
        }
    }

    /// The AppleScript `using {...}` clause element.
    pub fn script_clause(self) -> &'static str {
        match self {
            Self::Command => "command down",
            Self::Option => "option down",
            Self::Control => "control down",
            Self::Shift => "shift down",
        }
    }
}

/// A normalized keyboard shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyChord {
    /// Canonical key names in their original order.
    keys: Vec<String>,
}

impl KeyChord {
    /// Normalize a raw key sequence.
    ///
    /// Blank entries are dropped; `spacebar` becomes `space`, `enter`
    /// becomes `return`, `esc` becomes `escape`.
    pub fn parse<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = raw
            .into_iter()
            .filter_map(|key| normalize_key(key.as_ref()))
            .collect();
        Self { keys }
    }

    /// Normalized key names in order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Modifiers in the order they appear, without duplicates.
    pub fn modifiers(&self) -> Vec<Modifier> {
        let mut out = Vec::new();
        for key in &self.keys {
            if let Some(m) = Modifier::from_alias(key)
                && !out.contains(&m)
            {
                out.push(m);
            }
        }
        out
    }

    /// Non-modifier keys in order.
    pub fn regular_keys(&self) -> Vec<&str> {
        self.keys
            .iter()
            .filter(|k| Modifier::from_alias(k).is_none())
            .map(String::as_str)
            .collect()
    }

    /// `command+shift+t` style rendering, used by structured input APIs.
    pub fn combo(&self) -> String {
        self.keys.join("+")
    }

    /// Build the System Events statement that presses this chord.
    ///
    /// Regular keys are concatenated into one literal keystroke with every
    /// modifier applied.  A chord without regular keys presses
    /// [`MODIFIER_ONLY_KEY_CODE`]; a single named key (`return`, `tab`,
    /// `f5`, arrows) is sent by key code since it has no literal character.
    /// Returns `None` for an empty chord.
    pub fn keystroke_statement(&self) -> Option<String> {
        let modifiers = self.modifiers();
        let regular = self.regular_keys();

        let using = if modifiers.is_empty() {
            String::new()
        } else {
            let clauses: Vec<&str> = modifiers.iter().map(|m| m.script_clause()).collect();
            format!(" using {{{}}}", clauses.join(", "))
        };

        match regular.as_slice() {
            [] if modifiers.is_empty() => None,
            [] => Some(format!("key code {MODIFIER_ONLY_KEY_CODE}{using}")),
            [single] if single.chars().count() > 1 && key_code(single).is_some() => {
                let code = key_code(single)?;
                Some(format!("key code {code}{using}"))
            }
            keys => {
                let literal: String = keys
                    .iter()
                    .map(|k| if *k == "space" { " " } else { k })
                    .collect();
                Some(format!("keystroke \"{}\"{using}", escape_script_string(&literal)))
            }
        }
    }
}

impl std::fmt::Display for KeyChord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.combo())
    }
}

/// Canonicalize a single key name; `None` for blank input.
pub fn normalize_key(key: &str) -> Option<String> {
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    if let Some(m) = Modifier::from_alias(key) {
        return Some(m.as_str().to_string());
    }
    let lower = key.to_lowercase();
    let canonical = match lower.as_str() {
        "spacebar" => "space".to_string(),
        "enter" => "return".to_string(),
        "esc" => "escape".to_string(),
        "backspace" => "delete".to_string(),
        _ => lower,
    };
    Some(canonical)
}

/// Escape a value for embedding inside an AppleScript string literal.
pub fn escape_script_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// macOS virtual key code for a normalized key name (ANSI layout).
pub fn key_code(key: &str) -> Option<u16> {
    let code = match key {
        "a" => 0,
        "s" => 1,
        "d" => 2,
        "f" => 3,
        "h" => 4,
        "g" => 5,
        "z" => 6,
        "x" => 7,
        "c" => 8,
        "v" => 9,
        "b" => 11,
        "q" => 12,
        "w" => 13,
        "e" => 14,
        "r" => 15,
        "y" => 16,
        "t" => 17,
        "1" => 18,
        "2" => 19,
        "3" => 20,
        "4" => 21,
        "6" => 22,
        "5" => 23,
        "=" => 24,
        "9" => 25,
        "7" => 26,
        "-" => 27,
        "8" => 28,
        "0" => 29,
        "]" => 30,
        "o" => 31,
        "u" => 32,
        "[" => 33,
        "i" => 34,
        "p" => 35,
        "return" => 36,
        "l" => 37,
        "j" => 38,
        "'" => 39,
        "k" => 40,
        ";" => 41,
        "\\" => 42,
        "," => 43,
        "/" => 44,
        "n" => 45,
        "m" => 46,
        "." => 47,
        "tab" => 48,
        "space" => 49,
        "`" => 50,
        "delete" => 51,
        "escape" => 53,
        "f5" => 96,
        "f6" => 97,
        "f7" => 98,
        "f3" => 99,
        "f8" => 100,
        "f9" => 101,
        "f11" => 103,
        "f10" => 109,
        "f12" => 111,
        "home" => 115,
        "pageup" => 116,
        "forwarddelete" => 117,
        "f4" => 118,
        "end" => 119,
        "f2" => 120,
        "pagedown" => 121,
        "f1" => 122,
        "left" => 123,
        "right" => 124,
        "down" => 125,
        "up" => 126,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_aliases_collapse() {
        let chord = KeyChord::parse(["Cmd", "META", "opt", "Alt", "ctrl", "Shift", "T"]);
        assert_eq!(
            chord.keys(),
            &["command", "command", "option", "option", "control", "shift", "t"]
        );
        assert_eq!(
            chord.modifiers(),
            vec![
                Modifier::Command,
                Modifier::Option,
                Modifier::Control,
                Modifier::Shift
            ]
        );
        assert_eq!(chord.regular_keys(), vec!["t"]);
    }

    #[test]
    fn blank_keys_are_dropped() {
        let chord = KeyChord::parse(["", "  ", "cmd"]);
        assert_eq!(chord.keys(), &["command"]);
    }

    #[test]
    fn keystroke_applies_all_modifiers() {
        let chord = KeyChord::parse(["shift", "cmd", "4"]);
        assert_eq!(
            chord.keystroke_statement().unwrap(),
            "keystroke \"4\" using {shift down, command down}"
        );
    }

    #[test]
    fn keystroke_without_modifiers_has_no_using_clause() {
        let chord = KeyChord::parse(["h", "i"]);
        assert_eq!(chord.keystroke_statement().unwrap(), "keystroke \"hi\"");
    }

    #[test]
    fn modifier_only_chord_uses_key_code() {
        let chord = KeyChord::parse(["cmd"]);
        assert_eq!(
            chord.keystroke_statement().unwrap(),
            "key code 48 using {command down}"
        );
    }

    #[test]
    fn named_key_uses_key_code() {
        let chord = KeyChord::parse(["Enter"]);
        assert_eq!(chord.keystroke_statement().unwrap(), "key code 36");
    }

    #[test]
    fn spacebar_alias_maps_to_space_key_code() {
        let chord = KeyChord::parse(["cmd", "spacebar"]);
        assert_eq!(chord.keys(), &["command", "space"]);
        assert_eq!(
            chord.keystroke_statement().unwrap(),
            "key code 49 using {command down}"
        );
    }

    #[test]
    fn empty_chord_has_no_statement() {
        assert!(KeyChord::parse(Vec::<String>::new()).keystroke_statement().is_none());
    }

    #[test]
    fn quotes_are_escaped() {
        let chord = KeyChord::parse(["\""]);
        assert_eq!(chord.keystroke_statement().unwrap(), "keystroke \"\\\"\"");
    }

    #[test]
    fn combo_joins_with_plus() {
        assert_eq!(KeyChord::parse(["cmd", "shift", "3"]).combo(), "command+shift+3");
    }
}
