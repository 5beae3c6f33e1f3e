//! Hotkey bindings: one key plus modifier requirements
//!
//! A binding is written either as a string (`"F5"`, `"Ctrl+Shift+F5"`,
//! `"63"`) or as an object `{"hk": "F5", "modifiers": {"shift": true}}`
//! where `true` requires the modifier, `false` forbids it and an absent
//! field means the modifier is ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::error;

use super::keys::{KeyCode, ModifierState, UnknownKey};

/// What a binding needs from one modifier key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModifierRequirement {
    /// Modifier state is ignored
    #[default]
    Any,
    /// Modifier must be held
    Required,
    /// Modifier must not be held
    Forbidden,
}

impl ModifierRequirement {
    /// Check a modifier's current state against this requirement
    pub fn accepts(&self, down: bool) -> bool {
        match self {
            ModifierRequirement::Any => true,
            ModifierRequirement::Required => down,
            ModifierRequirement::Forbidden => !down,
        }
    }

    fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => ModifierRequirement::Any,
            Some(true) => ModifierRequirement::Required,
            Some(false) => ModifierRequirement::Forbidden,
        }
    }

    fn as_flag(&self) -> Option<bool> {
        match self {
            ModifierRequirement::Any => None,
            ModifierRequirement::Required => Some(true),
            ModifierRequirement::Forbidden => Some(false),
        }
    }
}

/// Modifier requirements for Alt, Ctrl and Shift
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub alt: ModifierRequirement,
    pub ctrl: ModifierRequirement,
    pub shift: ModifierRequirement,
}

impl Modifiers {
    /// Check if the current modifier state satisfies every requirement
    pub fn matches(&self, state: &ModifierState) -> bool {
        self.alt.accepts(state.alt) && self.ctrl.accepts(state.ctrl) && self.shift.accepts(state.shift)
    }

    fn get_mut(&mut self, modifier: InverseModifier) -> &mut ModifierRequirement {
        match modifier {
            InverseModifier::Alt => &mut self.alt,
            InverseModifier::Ctrl => &mut self.ctrl,
            InverseModifier::Shift => &mut self.shift,
        }
    }
}

/// A configured physical key plus modifier requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBinding", into = "RawBinding")]
pub struct HotkeyBinding {
    key: KeyCode,
    modifiers: Modifiers,
}

impl HotkeyBinding {
    /// A binding on `key` that ignores modifiers
    pub fn new(key: KeyCode) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    /// A binding on `key` with explicit modifier requirements
    pub fn with_modifiers(key: KeyCode, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn key(&self) -> KeyCode {
        self.key
    }

    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    /// Check the key reading and modifier state against this binding
    pub fn is_active(&self, key_down: bool, state: &ModifierState) -> bool {
        key_down && self.modifiers.matches(state)
    }

    /// Derive the binding used for the inverse operation
    ///
    /// The inverse binding additionally requires `modifier`. If the
    /// binding already requires it the two bindings become identical;
    /// that is logged as an error and the requirement is kept.
    pub fn inverse(&self, modifier: InverseModifier) -> Self {
        let mut inverse = *self;
        let slot = inverse.modifiers.get_mut(modifier);
        if *slot == ModifierRequirement::Required {
            error!(hotkey = %self, %modifier, "hotkey already contains the inverse modifier");
        }
        *slot = ModifierRequirement::Required;
        inverse
    }

    /// Forbid `modifier` unless the binding already constrains it
    ///
    /// Keeps a plain binding from also firing when its inverse variant
    /// does.
    pub fn excluding(&self, modifier: InverseModifier) -> Self {
        let mut plain = *self;
        let slot = plain.modifiers.get_mut(modifier);
        if *slot == ModifierRequirement::Any {
            *slot = ModifierRequirement::Forbidden;
        }
        plain
    }
}

impl fmt::Display for HotkeyBinding {
    /// Formats required modifiers as a prefix, e.g. `Ctrl+Shift+F5`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.modifiers;
        for (req, name) in [(m.ctrl, "Ctrl"), (m.shift, "Shift"), (m.alt, "Alt")] {
            if req == ModifierRequirement::Required {
                write!(f, "{}+", name)?;
            }
        }
        write!(f, "{}", self.key)
    }
}

/// Errors produced while building a binding from configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("empty hotkey")]
    Empty,

    #[error(transparent)]
    UnknownKey(#[from] UnknownKey),

    #[error("unknown modifier: {0:?}")]
    UnknownModifier(String),
}

impl FromStr for HotkeyBinding {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key = match parts.pop() {
            Some(k) if !k.is_empty() => k.parse::<KeyCode>()?,
            _ => return Err(BindingError::Empty),
        };

        let mut modifiers = Modifiers::default();
        for part in parts {
            let modifier: InverseModifier = part
                .parse()
                .map_err(|_| BindingError::UnknownModifier(part.to_string()))?;
            *modifiers.get_mut(modifier) = ModifierRequirement::Required;
        }

        Ok(Self { key, modifiers })
    }
}

/// Modifier that turns an operation hotkey into its inverse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InverseModifier {
    Alt,
    Ctrl,
    #[default]
    Shift,
}

impl FromStr for InverseModifier {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "alt" => Ok(InverseModifier::Alt),
            "ctrl" | "control" => Ok(InverseModifier::Ctrl),
            "shift" => Ok(InverseModifier::Shift),
            _ => Err(BindingError::UnknownModifier(s.to_string())),
        }
    }
}

impl fmt::Display for InverseModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InverseModifier::Alt => write!(f, "Alt"),
            InverseModifier::Ctrl => write!(f, "Ctrl"),
            InverseModifier::Shift => write!(f, "Shift"),
        }
    }
}

/// Wire form of a binding in the settings file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawBinding {
    Code(u32),
    Spec(String),
    Object {
        hk: KeyCode,
        #[serde(default)]
        modifiers: RawModifiers,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawModifiers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alt: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ctrl: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shift: Option<bool>,
}

impl TryFrom<RawBinding> for HotkeyBinding {
    type Error = BindingError;

    fn try_from(raw: RawBinding) -> Result<Self, Self::Error> {
        match raw {
            RawBinding::Code(code) => Ok(HotkeyBinding::new(KeyCode(code))),
            RawBinding::Spec(spec) => spec.parse(),
            RawBinding::Object { hk, modifiers } => Ok(HotkeyBinding::with_modifiers(
                hk,
                Modifiers {
                    alt: ModifierRequirement::from_flag(modifiers.alt),
                    ctrl: ModifierRequirement::from_flag(modifiers.ctrl),
                    shift: ModifierRequirement::from_flag(modifiers.shift),
                },
            )),
        }
    }
}

impl From<HotkeyBinding> for RawBinding {
    fn from(binding: HotkeyBinding) -> Self {
        let m = binding.modifiers;
        if m == Modifiers::default() {
            return RawBinding::Spec(binding.key.to_string());
        }
        RawBinding::Object {
            hk: binding.key,
            modifiers: RawModifiers {
                alt: m.alt.as_flag(),
                ctrl: m.ctrl.as_flag(),
                shift: m.shift.as_flag(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkey::keys::codes;

    fn held(alt: bool, ctrl: bool, shift: bool) -> ModifierState {
        ModifierState { alt, ctrl, shift }
    }

    #[test]
    fn test_parse_plain_key() {
        let binding: HotkeyBinding = "F5".parse().unwrap();
        assert_eq!(binding.key(), codes::F5);
        assert_eq!(*binding.modifiers(), Modifiers::default());
    }

    #[test]
    fn test_parse_with_modifiers() {
        let binding: HotkeyBinding = "Ctrl + Shift + F7".parse().unwrap();
        assert_eq!(binding.key(), codes::F7);
        assert_eq!(binding.modifiers().ctrl, ModifierRequirement::Required);
        assert_eq!(binding.modifiers().shift, ModifierRequirement::Required);
        assert_eq!(binding.modifiers().alt, ModifierRequirement::Any);
        assert_eq!(binding.to_string(), "Ctrl+Shift+F7");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<HotkeyBinding>(), Err(BindingError::Empty));
        assert_eq!("Ctrl+".parse::<HotkeyBinding>(), Err(BindingError::Empty));
        assert!(matches!(
            "Meta+F5".parse::<HotkeyBinding>(),
            Err(BindingError::UnknownModifier(m)) if m == "Meta"
        ));
        assert!(matches!(
            "Shift+Hyper".parse::<HotkeyBinding>(),
            Err(BindingError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_deserialize_forms() {
        let code: HotkeyBinding = serde_json::from_str("76").unwrap();
        assert_eq!(code, HotkeyBinding::new(codes::NUM5));

        let spec: HotkeyBinding = serde_json::from_str(r#""Alt+Num6""#).unwrap();
        assert_eq!(spec.key(), codes::NUM6);
        assert_eq!(spec.modifiers().alt, ModifierRequirement::Required);

        let object: HotkeyBinding =
            serde_json::from_str(r#"{"hk": "F6", "modifiers": {"ctrl": false, "shift": true}}"#).unwrap();
        assert_eq!(object.key(), codes::F6);
        assert_eq!(object.modifiers().ctrl, ModifierRequirement::Forbidden);
        assert_eq!(object.modifiers().shift, ModifierRequirement::Required);
        assert_eq!(object.modifiers().alt, ModifierRequirement::Any);

        let bare: HotkeyBinding = serde_json::from_str(r#"{"hk": 63}"#).unwrap();
        assert_eq!(bare, HotkeyBinding::new(codes::F5));

        assert!(serde_json::from_str::<HotkeyBinding>(r#""Nope""#).is_err());
        assert!(serde_json::from_str::<HotkeyBinding>("true").is_err());
    }

    #[test]
    fn test_modifier_matching() {
        let binding = HotkeyBinding::with_modifiers(
            codes::F6,
            Modifiers {
                ctrl: ModifierRequirement::Forbidden,
                shift: ModifierRequirement::Required,
                ..Modifiers::default()
            },
        );

        assert!(binding.is_active(true, &held(false, false, true)));
        // Alt is ignored
        assert!(binding.is_active(true, &held(true, false, true)));
        assert!(!binding.is_active(true, &held(false, true, true)));
        assert!(!binding.is_active(true, &held(false, false, false)));
        assert!(!binding.is_active(false, &held(false, false, true)));
    }

    #[test]
    fn test_inverse_adds_requirement() {
        let binding = HotkeyBinding::new(codes::F5);
        let inverse = binding.inverse(InverseModifier::Shift);
        assert_eq!(inverse.modifiers().shift, ModifierRequirement::Required);
        assert_eq!(inverse.key(), codes::F5);
        // The original binding is untouched
        assert_eq!(binding.modifiers().shift, ModifierRequirement::Any);
    }

    #[test]
    fn test_inverse_overrides_forbidden() {
        let binding: HotkeyBinding =
            serde_json::from_str(r#"{"hk": "F5", "modifiers": {"alt": false}}"#).unwrap();
        let inverse = binding.inverse(InverseModifier::Alt);
        assert_eq!(inverse.modifiers().alt, ModifierRequirement::Required);
    }

    #[test]
    fn test_inverse_of_binding_already_requiring_modifier() {
        let binding: HotkeyBinding = "Ctrl+F5".parse().unwrap();
        let inverse = binding.inverse(InverseModifier::Ctrl);
        assert_eq!(inverse, binding);
    }

    #[test]
    fn test_excluding_only_touches_unconstrained_modifier() {
        let plain = HotkeyBinding::new(codes::F5).excluding(InverseModifier::Shift);
        assert_eq!(plain.modifiers().shift, ModifierRequirement::Forbidden);
        assert_eq!(plain.modifiers().alt, ModifierRequirement::Any);
        assert!(plain.is_active(true, &held(false, false, false)));
        assert!(!plain.is_active(true, &held(false, false, true)));

        let required: HotkeyBinding = "Shift+F5".parse().unwrap();
        assert_eq!(required.excluding(InverseModifier::Shift), required);
    }

    #[test]
    fn test_inverse_modifier_parse() {
        assert_eq!("ALT".parse::<InverseModifier>().unwrap(), InverseModifier::Alt);
        assert_eq!("Control".parse::<InverseModifier>().unwrap(), InverseModifier::Ctrl);
        assert!("Super".parse::<InverseModifier>().is_err());
        assert_eq!(InverseModifier::default(), InverseModifier::Shift);
    }

    #[test]
    fn test_serialize_round_trip_shape() {
        let plain = serde_json::to_string(&HotkeyBinding::new(codes::F5)).unwrap();
        assert_eq!(plain, r#""F5""#);

        let binding: HotkeyBinding = "Shift+F5".parse().unwrap();
        let json = serde_json::to_value(binding).unwrap();
        assert_eq!(json["hk"], "F5");
        assert_eq!(json["modifiers"]["shift"], true);
        assert!(json["modifiers"].get("alt").is_none());
    }
}
