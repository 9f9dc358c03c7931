use core_events::{KeyCode, KeyInput, KeyModifiers};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("unknown key name <{0}>")]
    UnknownKey(String),
    #[error("expected exactly one key, found {0}")]
    NotSingleKey(usize),
}

/// Parse a key script into its keystrokes.
pub fn parse_keys(script: &str) -> Result<Vec<KeyInput>, NotationError> {
    let mut out = Vec::with_capacity(script.len());
    let mut rest = script;
    while let Some(c) = rest.chars().next() {
        // A token ends at the first `>`; another `<` before it makes this one literal.
        if c == '<'
            && let Some(close) = rest[1..].find(['<', '>']).map(|idx| idx + 1)
            && rest[close..].starts_with('>')
        {
            let body = &rest[1..close];
            if !body.is_empty() && !body.contains(char::is_whitespace) {
                out.push(parse_token(body)?);
                rest = &rest[close + 1..];
                continue;
            }
        }
        out.push(KeyInput::char(c));
        rest = &rest[c.len_utf8()..];
    }
    trace!(target: "input.notation", keys = out.len(), "parsed");
    Ok(out)
}

/// Parse exactly one keystroke (`"a"`, `"<C-o>"`).
pub fn parse_key(notation: &str) -> Result<KeyInput, NotationError> {
    let keys = parse_keys(notation)?;
    match keys.as_slice() {
        [key] => Ok(*key),
        other => Err(NotationError::NotSingleKey(other.len())),
    }
}

fn parse_token(body: &str) -> Result<KeyInput, NotationError> {
    let mut mods = KeyModifiers::empty();
    let mut name = body;
    // Modifier prefixes; a trailing '-' is the key itself (`<C-->`).
    while name.len() > 2 && name.as_bytes()[1] == b'-' {
        let flag = match name.as_bytes()[0].to_ascii_uppercase() {
            b'C' => KeyModifiers::CONTROL,
            b'S' => KeyModifiers::SHIFT,
            b'A' | b'M' => KeyModifiers::ALT,
            _ => break,
        };
        mods |= flag;
        name = &name[2..];
    }

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if mods.is_empty() {
            return Err(NotationError::UnknownKey(body.to_string()));
        }
        let c = if mods.contains(KeyModifiers::CONTROL) {
            c.to_ascii_lowercase()
        } else {
            c
        };
        return Ok(KeyInput::new(KeyCode::Char(c), mods));
    }

    let code = match name.to_ascii_lowercase().as_str() {
        "esc" | "escape" => KeyCode::Escape,
        "cr" | "enter" | "return" => KeyCode::Enter,
        "bs" | "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "del" | "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "insert" => KeyCode::Insert,
        "space" => KeyCode::Char(' '),
        "lt" => KeyCode::Char('<'),
        "bar" => KeyCode::Char('|'),
        "bslash" => KeyCode::Char('\\'),
        lower => match lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            Some(n) if (1..=12).contains(&n) => KeyCode::F(n),
            _ => return Err(NotationError::UnknownKey(body.to_string())),
        },
    };
    Ok(KeyInput::new(code, mods))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_characters_type_themselves() {
        let keys = parse_keys("hi!").unwrap();
        assert_eq!(
            keys,
            vec![KeyInput::char('h'), KeyInput::char('i'), KeyInput::char('!')]
        );
    }

    #[test]
    fn named_keys_and_chords() {
        let keys = parse_keys("a<Esc><C-D><cr><S-Tab>").unwrap();
        assert_eq!(
            keys,
            vec![
                KeyInput::char('a'),
                KeyInput::named(KeyCode::Escape),
                KeyInput::ctrl('d'),
                KeyInput::named(KeyCode::Enter),
                KeyInput::new(KeyCode::Tab, KeyModifiers::SHIFT),
            ]
        );
    }

    #[test]
    fn lone_angle_bracket_is_literal() {
        let keys = parse_keys("a < b").unwrap();
        assert_eq!(keys.len(), 5);
        assert_eq!(keys[2], KeyInput::char('<'));
        assert_eq!(parse_keys("<").unwrap(), vec![KeyInput::char('<')]);
        assert_eq!(parse_keys("<lt>").unwrap(), vec![KeyInput::char('<')]);
    }

    #[test]
    fn angle_bracket_before_a_token_is_literal() {
        assert_eq!(
            parse_keys("<ab<Esc>").unwrap(),
            vec![
                KeyInput::char('<'),
                KeyInput::char('a'),
                KeyInput::char('b'),
                KeyInput::named(KeyCode::Escape),
            ]
        );
        assert_eq!(
            parse_keys("<<C-w>").unwrap(),
            vec![KeyInput::char('<'), KeyInput::ctrl('w')]
        );
    }

    #[test]
    fn unknown_name_is_an_error() {
        assert_eq!(
            parse_keys("<Bogus>"),
            Err(NotationError::UnknownKey("Bogus".to_string()))
        );
        assert!(parse_keys("<x>").is_err());
    }

    #[test]
    fn function_keys_and_control_bracket() {
        assert_eq!(parse_key("<F12>").unwrap(), KeyInput::named(KeyCode::F(12)));
        assert_eq!(parse_key("<C-[>").unwrap(), KeyInput::ctrl('['));
        assert!(parse_key("<F13>").is_err());
    }

    #[test]
    fn display_round_trips_through_parser() {
        for key in [
            KeyInput::ctrl('n'),
            KeyInput::ctrl('['),
            KeyInput::named(KeyCode::Down),
            KeyInput::named(KeyCode::Backspace),
            KeyInput::char('<'),
            KeyInput::char(' '),
            KeyInput::char('z'),
        ] {
            assert_eq!(parse_key(&key.to_string()).unwrap(), key);
        }
    }

    #[test]
    fn parse_key_rejects_sequences() {
        assert_eq!(parse_key("ab"), Err(NotationError::NotSingleKey(2)));
        assert_eq!(parse_key(""), Err(NotationError::NotSingleKey(0)));
    }
}
