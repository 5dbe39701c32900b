//! Input event shapes consumed by the cursor controller.
//!
//! Keyboard events carry a logical key plus a modifier set; which physical
//! modifier acts as the "action" key (shortcuts, line-wise deletion) or the
//! "alt" key (word-wise motion) depends on the `Platform`. Pointer events carry
//! viewport-relative pixel coordinates and the click count.

use std::fmt;

use thiserror::Error;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
        const META = 0b0000_1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

impl NamedKey {
    fn from_name(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "enter" | "cr" | "return" => NamedKey::Enter,
            "esc" | "escape" => NamedKey::Escape,
            "bs" | "backspace" => NamedKey::Backspace,
            "del" | "delete" => NamedKey::Delete,
            "tab" => NamedKey::Tab,
            "up" => NamedKey::Up,
            "down" => NamedKey::Down,
            "left" => NamedKey::Left,
            "right" => NamedKey::Right,
            "home" => NamedKey::Home,
            "end" => NamedKey::End,
            _ => return None,
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Named(NamedKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub const fn new(key: Key, mods: KeyModifiers) -> Self {
        Self { key, mods }
    }

    pub const fn char(c: char) -> Self {
        Self::new(Key::Char(c), KeyModifiers::empty())
    }

    pub const fn named(key: NamedKey) -> Self {
        Self::new(Key::Named(key), KeyModifiers::empty())
    }

    pub fn with(mut self, mods: KeyModifiers) -> Self {
        self.mods |= mods;
        self
    }

    pub fn shift(&self) -> bool {
        self.mods.contains(KeyModifiers::SHIFT)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.key, self.mods)
    }
}

/// Host platform, deciding which modifiers act as action and alt keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    Mac,
    #[default]
    Other,
}

impl Platform {
    /// Meta (command) on Mac, control elsewhere.
    pub fn has_action_key(&self, mods: KeyModifiers) -> bool {
        match self {
            Platform::Mac => mods.contains(KeyModifiers::META),
            Platform::Other => mods.contains(KeyModifiers::CTRL),
        }
    }

    /// Alt everywhere; control also counts off Mac.
    pub fn has_alt_key(&self, mods: KeyModifiers) -> bool {
        match self {
            Platform::Mac => mods.contains(KeyModifiers::ALT),
            Platform::Other => mods.intersects(KeyModifiers::ALT | KeyModifiers::CTRL),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mac" | "macos" => Some(Platform::Mac),
            "other" | "linux" | "windows" => Some(Platform::Other),
            _ => None,
        }
    }
}

/// Pointer press or drag in viewport pixels. `detail` is the click count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub detail: u8,
    pub shift: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("empty key notation")]
    Empty,
    #[error("unterminated key notation `{0}`")]
    Unterminated(String),
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

/// Parse a single key in angle-bracket notation.
///
/// A bare character is itself (`"a"`); bracketed forms carry dash-separated
/// modifier prefixes (`C` ctrl, `A` alt, `S` shift, `M`/`D` meta) before a key
/// name or single character: `"<Enter>"`, `"<S-Tab>"`, `"<C-z>"`, `"<A-Left>"`.
/// `"<lt>"` and `"<Space>"` spell `<` and a space.
pub fn parse_key(spec: &str) -> Result<KeyEvent, KeyParseError> {
    let mut chars = spec.chars();
    let first = chars.next().ok_or(KeyParseError::Empty)?;
    if first != '<' || spec.len() == 1 {
        return match chars.next() {
            None => Ok(KeyEvent::char(first)),
            Some(_) => Err(KeyParseError::UnknownKey(spec.to_string())),
        };
    }
    let inner = spec
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(|| KeyParseError::Unterminated(spec.to_string()))?;

    let mut mods = KeyModifiers::empty();
    let mut rest = inner;
    // A trailing "-" is the minus key itself, so only split while a key remains.
    while let Some((prefix, tail)) = rest.split_once('-')
        && !tail.is_empty()
    {
        mods |= match prefix {
            "C" | "c" => KeyModifiers::CTRL,
            "A" | "a" => KeyModifiers::ALT,
            "S" | "s" => KeyModifiers::SHIFT,
            "M" | "m" | "D" | "d" => KeyModifiers::META,
            other => return Err(KeyParseError::UnknownModifier(other.to_string())),
        };
        rest = tail;
    }

    let mut key_chars = rest.chars();
    let key = match (key_chars.next(), key_chars.next()) {
        (None, _) => return Err(KeyParseError::Empty),
        (Some(c), None) => Key::Char(c),
        _ => match rest.to_ascii_lowercase().as_str() {
            "lt" => Key::Char('<'),
            "space" => Key::Char(' '),
            _ => Key::Named(
                NamedKey::from_name(rest)
                    .ok_or_else(|| KeyParseError::UnknownKey(rest.to_string()))?,
            ),
        },
    };
    Ok(KeyEvent::new(key, mods))
}

/// Split a script line into key notations: bracketed groups stay whole,
/// everything else is one key per char.
pub fn split_keys(script: &str) -> Vec<&str> {
    let mut keys = Vec::new();
    let mut rest = script;
    while let Some(c) = rest.chars().next() {
        let len = match (c, rest.find('>')) {
            ('<', Some(end)) if end > 1 => end + 1,
            _ => c.len_utf8(),
        };
        keys.push(&rest[..len]);
        rest = &rest[len..];
    }
    keys
}
