use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a dice notation string was rejected by strict parsing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum DiceError {
    Empty,
    Malformed { input: String },
    Overflow { input: String },
}

impl fmt::Display for DiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiceError::Empty => write!(f, "dice expression is empty"),
            DiceError::Malformed { input } => {
                write!(f, "`{input}` is not NdS, NdS+M or NdS-M notation")
            }
            DiceError::Overflow { input } => {
                write!(f, "`{input}` has a number too large to roll")
            }
        }
    }
}

impl std::error::Error for DiceError {}

/// Failures at the JavaScript boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum CoreError {
    InvalidInput { field: String, message: String },
    Encoding { message: String },
    Dice { error: DiceError },
}

impl CoreError {
    pub fn invalid_input(field: impl Into<String>, error: impl fmt::Display) -> Self {
        CoreError::InvalidInput {
            field: field.into(),
            message: error.to_string(),
        }
    }

    pub fn encoding(error: impl fmt::Display) -> Self {
        CoreError::Encoding {
            message: error.to_string(),
        }
    }
}

impl From<DiceError> for CoreError {
    fn from(error: DiceError) -> Self {
        CoreError::Dice { error }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidInput { field, message } => {
                write!(f, "invalid `{field}`: {message}")
            }
            CoreError::Encoding { message } => write!(f, "encoding failed: {message}"),
            CoreError::Dice { error } => error.fmt(f),
        }
    }
}

impl std::error::Error for CoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_serialize_with_type_tag() {
        let json = serde_json::to_string(&DiceError::Malformed {
            input: "2x6".into(),
        })
        .expect("dice error should serialize");
        assert_eq!(json, r#"{"type":"Malformed","input":"2x6"}"#);

        let wrapped = CoreError::from(DiceError::Empty);
        let json = serde_json::to_string(&wrapped).expect("core error should serialize");
        assert_eq!(json, r#"{"type":"Dice","error":{"type":"Empty"}}"#);
    }

    #[test]
    fn display_names_the_offending_field() {
        let error = CoreError::invalid_input("rect", "expected a number");
        assert_eq!(error.to_string(), "invalid `rect`: expected a number");
    }
}
