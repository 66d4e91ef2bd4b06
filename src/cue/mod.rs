pub mod library;

use serde::{Serialize, Deserialize};

use crate::audio::SoundId;

pub use library::{CueLibrary, CueTable};

/// Arithmetic operator keys that carry a cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    /// Parses a keypad operator symbol. ASCII `-` and the minus sign `−` are both subtract.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Add),
            "-" | "\u{2212}" => Some(Self::Subtract),
            "\u{00d7}" => Some(Self::Multiply),
            "\u{00f7}" => Some(Self::Divide),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "\u{2212}",
            Self::Multiply => "\u{00d7}",
            Self::Divide => "\u{00f7}",
        }
    }
}

/// Logical identifier of a cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueKey {
    Digit(u8),
    Operator(Operator),
    Dot,
    Equals,
}

impl CueKey {
    /// Digit key for `value`, or `None` outside 0..=9.
    pub fn digit(value: i32) -> Option<Self> {
        if (0..=9).contains(&value) {
            Some(Self::Digit(value as u8))
        } else {
            None
        }
    }

    /// Every key that can carry a cue: digits 0-9, the four operators, dot, equals.
    pub fn all() -> Vec<CueKey> {
        let mut keys: Vec<CueKey> = (0..=9).map(CueKey::Digit).collect();
        keys.extend(Operator::ALL.iter().map(|op| CueKey::Operator(*op)));
        keys.push(CueKey::Dot);
        keys.push(CueKey::Equals);
        keys
    }

    /// Asset name for this key, e.g. `num_7`, `op_add`, `num_dot`.
    pub fn resource_name(&self) -> String {
        match self {
            Self::Digit(d) => format!("num_{}", d),
            Self::Dot => "num_dot".to_string(),
            Self::Equals => "op_equals".to_string(),
            Self::Operator(Operator::Add) => "op_add".to_string(),
            Self::Operator(Operator::Subtract) => "op_subtract".to_string(),
            Self::Operator(Operator::Multiply) => "op_multiply".to_string(),
            Self::Operator(Operator::Divide) => "op_divide".to_string(),
        }
    }
}

/// A loaded cue: the output subsystem's handle plus its measured length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cue {
    pub sound: SoundId,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_names_follow_convention() {
        assert_eq!(CueKey::Digit(7).resource_name(), "num_7");
        assert_eq!(CueKey::Digit(0).resource_name(), "num_0");
        assert_eq!(CueKey::Dot.resource_name(), "num_dot");
        assert_eq!(CueKey::Equals.resource_name(), "op_equals");
        assert_eq!(CueKey::Operator(Operator::Add).resource_name(), "op_add");
        assert_eq!(CueKey::Operator(Operator::Subtract).resource_name(), "op_subtract");
        assert_eq!(CueKey::Operator(Operator::Multiply).resource_name(), "op_multiply");
        assert_eq!(CueKey::Operator(Operator::Divide).resource_name(), "op_divide");
    }

    #[test]
    fn digit_rejects_out_of_range() {
        assert_eq!(CueKey::digit(0), Some(CueKey::Digit(0)));
        assert_eq!(CueKey::digit(9), Some(CueKey::Digit(9)));
        assert_eq!(CueKey::digit(10), None);
        assert_eq!(CueKey::digit(-1), None);
    }

    #[test]
    fn operator_symbols() {
        assert_eq!(Operator::from_symbol("+"), Some(Operator::Add));
        assert_eq!(Operator::from_symbol("-"), Some(Operator::Subtract));
        assert_eq!(Operator::from_symbol("−"), Some(Operator::Subtract));
        assert_eq!(Operator::from_symbol("×"), Some(Operator::Multiply));
        assert_eq!(Operator::from_symbol("÷"), Some(Operator::Divide));
        assert_eq!(Operator::from_symbol("*"), None);
        assert_eq!(Operator::from_symbol("/"), None);
        assert_eq!(Operator::from_symbol(""), None);
        for op in Operator::ALL {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
    }

    #[test]
    fn all_keys_are_unique() {
        let keys = CueKey::all();
        assert_eq!(keys.len(), 16);
        let names: std::collections::HashSet<String> =
            keys.iter().map(|k| k.resource_name()).collect();
        assert_eq!(names.len(), 16);
    }
}
