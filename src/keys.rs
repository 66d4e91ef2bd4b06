use crate::player::CuePlayer;

/// A keypad press the host forwards to the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Number(i32),
    Operator(String),
    Dot,
    Equals,
}

impl KeyAction {
    /// Maps a key label (`"7"`, `"+"`, `"÷"`, `"."`, `"="`) to its action.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "." => Some(Self::Dot),
            "=" => Some(Self::Equals),
            "+" | "-" | "\u{2212}" | "\u{00d7}" | "\u{00f7}" => Some(Self::Operator(label.to_string())),
            _ => {
                let mut chars = label.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => c.to_digit(10).map(|d| Self::Number(d as i32)),
                    _ => None,
                }
            }
        }
    }
}

pub fn dispatch(player: &CuePlayer, action: &KeyAction) {
    match action {
        KeyAction::Number(d) => player.play_number(*d),
        KeyAction::Operator(symbol) => player.play_operator(symbol),
        KeyAction::Dot => player.play_dot(),
        KeyAction::Equals => player.play_equals(),
    }
}

/// Plays every recognised key in `line`, one character per key.
pub fn handle_line(player: &CuePlayer, line: &str) -> usize {
    let mut handled = 0;
    for c in line.chars() {
        let mut buf = [0u8; 4];
        match KeyAction::parse(c.encode_utf8(&mut buf)) {
            Some(action) => {
                dispatch(player, &action);
                handled += 1;
            }
            None if c.is_whitespace() => {}
            None => tracing::debug!("No cue for key '{}'", c),
        }
    }
    handled
}
