//! Key code definitions and modifier state tracking
//!
//! Key codes follow the DirectX scan code numbering used by the game's
//! input layer, with mouse buttons starting at 256. Provides a struct
//! for tracking which modifier keys are currently down.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A physical key or button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyCode(pub u32);

/// Named scan codes
pub mod codes {
    use super::KeyCode;

    pub const LEFT_CONTROL: KeyCode = KeyCode(29);
    pub const LEFT_SHIFT: KeyCode = KeyCode(42);
    pub const RIGHT_SHIFT: KeyCode = KeyCode(54);
    pub const LEFT_ALT: KeyCode = KeyCode(56);
    pub const F5: KeyCode = KeyCode(63);
    pub const F6: KeyCode = KeyCode(64);
    pub const F7: KeyCode = KeyCode(65);
    pub const NUM5: KeyCode = KeyCode(76);
    pub const NUM6: KeyCode = KeyCode(77);
    pub const RIGHT_CONTROL: KeyCode = KeyCode(157);
    pub const RIGHT_ALT: KeyCode = KeyCode(184);
}

/// Name table for scan codes, first name wins when formatting
const KEY_NAMES: &[(&str, u32)] = &[
    ("Escape", 1),
    ("Key1", 2),
    ("Key2", 3),
    ("Key3", 4),
    ("Key4", 5),
    ("Key5", 6),
    ("Key6", 7),
    ("Key7", 8),
    ("Key8", 9),
    ("Key9", 10),
    ("Key0", 11),
    ("Minus", 12),
    ("Equals", 13),
    ("Backspace", 14),
    ("Tab", 15),
    ("Q", 16),
    ("W", 17),
    ("E", 18),
    ("R", 19),
    ("T", 20),
    ("Y", 21),
    ("U", 22),
    ("I", 23),
    ("O", 24),
    ("P", 25),
    ("LeftBracket", 26),
    ("RightBracket", 27),
    ("Enter", 28),
    ("LeftControl", 29),
    ("A", 30),
    ("S", 31),
    ("D", 32),
    ("F", 33),
    ("G", 34),
    ("H", 35),
    ("J", 36),
    ("K", 37),
    ("L", 38),
    ("Semicolon", 39),
    ("Apostrophe", 40),
    ("Tilde", 41),
    ("LeftShift", 42),
    ("BackSlash", 43),
    ("Z", 44),
    ("X", 45),
    ("C", 46),
    ("V", 47),
    ("B", 48),
    ("N", 49),
    ("M", 50),
    ("Comma", 51),
    ("Period", 52),
    ("ForwardSlash", 53),
    ("RightShift", 54),
    ("NumMult", 55),
    ("LeftAlt", 56),
    ("Spacebar", 57),
    ("CapsLock", 58),
    ("F1", 59),
    ("F2", 60),
    ("F3", 61),
    ("F4", 62),
    ("F5", 63),
    ("F6", 64),
    ("F7", 65),
    ("F8", 66),
    ("F9", 67),
    ("F10", 68),
    ("NumLock", 69),
    ("ScrollLock", 70),
    ("Num7", 71),
    ("Num8", 72),
    ("Num9", 73),
    ("NumMinus", 74),
    ("Num4", 75),
    ("Num5", 76),
    ("Num6", 77),
    ("NumPlus", 78),
    ("Num1", 79),
    ("Num2", 80),
    ("Num3", 81),
    ("Num0", 82),
    ("NumDot", 83),
    ("F11", 87),
    ("F12", 88),
    ("NumEnter", 156),
    ("RightControl", 157),
    ("NumSlash", 181),
    ("SysRq", 183),
    ("RightAlt", 184),
    ("Pause", 197),
    ("Home", 199),
    ("Up", 200),
    ("PgUp", 201),
    ("Left", 203),
    ("Right", 205),
    ("End", 207),
    ("Down", 208),
    ("PgDown", 209),
    ("Insert", 210),
    ("Delete", 211),
    ("LeftMouse", 256),
    ("RightMouse", 257),
    ("MiddleMouse", 258),
];

impl KeyCode {
    /// Look up a key by name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        KEY_NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, code)| KeyCode(code))
    }

    /// The key's name, if it has one
    pub fn name(&self) -> Option<&'static str> {
        KEY_NAMES
            .iter()
            .find(|&&(_, code)| code == self.0)
            .map(|&(n, _)| n)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Error returned when a key name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key: {0:?}")]
pub struct UnknownKey(pub String);

impl FromStr for KeyCode {
    type Err = UnknownKey;

    /// Accepts a key name (`"F5"`) or a raw scan code (`"63"`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u32>() {
            return Ok(KeyCode(code));
        }
        KeyCode::from_name(s).ok_or_else(|| UnknownKey(s.to_string()))
    }
}

impl Serialize for KeyCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for KeyCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Code(u32),
            Name(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Code(code) => Ok(KeyCode(code)),
            Raw::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Tracks which modifier keys are currently down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    /// Either Alt key is held
    pub alt: bool,
    /// Either Control key is held
    pub ctrl: bool,
    /// Either Shift key is held
    pub shift: bool,
}

impl ModifierState {
    /// Build the modifier state from a key-down query
    pub fn from_query(is_down: impl Fn(KeyCode) -> bool) -> Self {
        Self {
            alt: is_down(codes::LEFT_ALT) || is_down(codes::RIGHT_ALT),
            ctrl: is_down(codes::LEFT_CONTROL) || is_down(codes::RIGHT_CONTROL),
            shift: is_down(codes::LEFT_SHIFT) || is_down(codes::RIGHT_SHIFT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_by_name_and_code() {
        assert_eq!("F5".parse::<KeyCode>().unwrap(), codes::F5);
        assert_eq!("f5".parse::<KeyCode>().unwrap(), codes::F5);
        assert_eq!("63".parse::<KeyCode>().unwrap(), codes::F5);
        assert_eq!("numenter".parse::<KeyCode>().unwrap(), KeyCode(156));
    }

    #[test]
    fn test_parse_unknown() {
        let err = "Hyper".parse::<KeyCode>().unwrap_err();
        assert_eq!(err, UnknownKey("Hyper".to_string()));
    }

    #[test]
    fn test_display() {
        assert_eq!(codes::LEFT_SHIFT.to_string(), "LeftShift");
        assert_eq!(KeyCode(999).to_string(), "999");
    }

    #[test]
    fn test_deserialize_number_or_name() {
        let keys: Vec<KeyCode> = serde_json::from_str(r#"[63, "Num5", "LeftAlt"]"#).unwrap();
        assert_eq!(keys, vec![codes::F5, codes::NUM5, codes::LEFT_ALT]);
        assert!(serde_json::from_str::<KeyCode>(r#""Nope""#).is_err());
    }

    #[test]
    fn test_modifier_state_from_query() {
        let state = ModifierState::from_query(|k| k == codes::RIGHT_CONTROL);
        assert!(state.ctrl);
        assert!(!state.alt);
        assert!(!state.shift);

        assert_eq!(ModifierState::from_query(|_| false), ModifierState::default());
    }
}
