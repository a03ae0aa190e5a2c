use serde::{Deserialize, Serialize};

/// What the remote processor does with a submitted batch.
///
/// Chosen by the mode toggle; sent as the `action` form field.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    #[default]
    Encrypt,
    Decrypt,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "encrypt" => Some(Self::Encrypt),
            "decrypt" => Some(Self::Decrypt),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_strings() {
        assert_eq!(Action::from_str("encrypt"), Some(Action::Encrypt));
        assert_eq!(Action::from_str("decrypt"), Some(Action::Decrypt));
        assert_eq!(Action::from_str("compress"), None);
    }

    #[test]
    fn defaults_to_encrypt() {
        assert_eq!(Action::default(), Action::Encrypt);
        assert_eq!(Action::default().to_string(), "encrypt");
    }
}
