//! Logical key input model shared by every mode.
//!
//! A `KeyInput` is the normalized identity of one keystroke: a `KeyCode` plus
//! the modifier set held while it was pressed. Values are created by the
//! notation parser (`core-input`) or by a host translating platform events and
//! are never mutated afterwards. Equality, ordering and hashing are structural,
//! so binding tables can key directly on `KeyInput`.
//!
//! Invariants:
//! * Printable characters carry their final glyph (`'A'`, not `'a'` + SHIFT);
//!   SHIFT is only meaningful on named keys (`<S-Tab>`).
//! * Control chords keep the lowercase base character (`<C-d>` is
//!   `Char('d')` + CONTROL).

use std::fmt;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct KeyModifiers: u8 {
        const CONTROL = 0b0000_0001;
        const ALT     = 0b0000_0010;
        const SHIFT   = 0b0000_0100;
    }
}

/// Normalized logical key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    F(u8),
}

impl KeyCode {
    /// Vim notation name for named keys (`None` for characters).
    pub fn notation_name(self) -> Option<&'static str> {
        let name = match self {
            KeyCode::Char(_) | KeyCode::F(_) => return None,
            KeyCode::Enter => "CR",
            KeyCode::Escape => "Esc",
            KeyCode::Backspace => "BS",
            KeyCode::Tab => "Tab",
            KeyCode::Delete => "Del",
            KeyCode::Up => "Up",
            KeyCode::Down => "Down",
            KeyCode::Left => "Left",
            KeyCode::Right => "Right",
            KeyCode::Home => "Home",
            KeyCode::End => "End",
            KeyCode::PageUp => "PageUp",
            KeyCode::PageDown => "PageDown",
            KeyCode::Insert => "Insert",
        };
        Some(name)
    }
}

/// One logical keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyInput {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyInput {
    pub const fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    /// Unmodified character key.
    pub const fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::empty())
    }

    /// Unmodified named key.
    pub const fn named(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    /// Control chord over a character (`<C-x>`).
    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// `<C-m>`: the terminal-level alias Vim treats as `<CR>`.
    pub const fn alternate_enter() -> Self {
        Self::ctrl('m')
    }

    /// The inserted character when this key types text: a `Char` code with no
    /// CONTROL/ALT modifier.
    pub fn char_value(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c)
                if !self
                    .mods
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                Some(c)
            }
            _ => None,
        }
    }

    /// True for keys that produce a visible (non-control) character.
    pub fn is_printable(&self) -> bool {
        self.char_value().is_some_and(|c| !c.is_control())
    }
}

impl From<char> for KeyInput {
    fn from(c: char) -> Self {
        KeyInput::char(c)
    }
}

impl fmt::Display for KeyInput {
    /// Vim key notation: `a`, `<lt>`, `<Space>`, `<C-d>`, `<S-Tab>`, `<F5>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match self.code {
            KeyCode::Char('<') => "lt".to_string(),
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) if self.mods.is_empty() => return write!(f, "{c}"),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::F(n) => format!("F{n}"),
            named => named.notation_name().unwrap_or_default().to_string(),
        };
        f.write_str("<")?;
        if self.mods.contains(KeyModifiers::CONTROL) {
            f.write_str("C-")?;
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            f.write_str("S-")?;
        }
        if self.mods.contains(KeyModifiers::ALT) {
            f.write_str("A-")?;
        }
        write!(f, "{base}>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_requires_matching_modifiers() {
        assert_eq!(KeyInput::char('d'), KeyInput::char('d'));
        assert_ne!(KeyInput::char('d'), KeyInput::ctrl('d'));
        assert_ne!(
            KeyInput::named(KeyCode::Tab),
            KeyInput::new(KeyCode::Tab, KeyModifiers::SHIFT)
        );
    }

    #[test]
    fn char_value_ignores_control_chords() {
        assert_eq!(KeyInput::char('x').char_value(), Some('x'));
        assert_eq!(KeyInput::ctrl('x').char_value(), None);
        assert_eq!(
            KeyInput::new(KeyCode::Char('x'), KeyModifiers::ALT).char_value(),
            None
        );
        assert_eq!(KeyInput::named(KeyCode::Enter).char_value(), None);
    }

    #[test]
    fn printable_excludes_control_characters() {
        assert!(KeyInput::char('a').is_printable());
        assert!(KeyInput::char(' ').is_printable());
        assert!(!KeyInput::char('\u{7}').is_printable());
    }

    #[test]
    fn display_uses_vim_notation() {
        assert_eq!(KeyInput::char('a').to_string(), "a");
        assert_eq!(KeyInput::char('<').to_string(), "<lt>");
        assert_eq!(KeyInput::ctrl('d').to_string(), "<C-d>");
        assert_eq!(KeyInput::named(KeyCode::Escape).to_string(), "<Esc>");
        assert_eq!(
            KeyInput::new(KeyCode::Tab, KeyModifiers::SHIFT).to_string(),
            "<S-Tab>"
        );
        assert_eq!(KeyInput::named(KeyCode::F(5)).to_string(), "<F5>");
    }

    #[test]
    fn ordering_is_total_and_stable() {
        let mut keys = vec![
            KeyInput::ctrl('a'),
            KeyInput::named(KeyCode::Enter),
            KeyInput::char('b'),
            KeyInput::char('a'),
        ];
        keys.sort();
        assert_eq!(keys[0], KeyInput::char('a'));
        assert_eq!(keys[1], KeyInput::ctrl('a'));
        assert_eq!(keys[2], KeyInput::char('b'));
        assert_eq!(keys[3], KeyInput::named(KeyCode::Enter));
    }
}
