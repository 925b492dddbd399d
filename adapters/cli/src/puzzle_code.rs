use std::{error::Error, fmt};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use robo_trail_core::GridModel;
use serde::{Deserialize, Serialize};

const CODE_DOMAIN: &str = "robo";
const CODE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded puzzle payload.
pub(crate) const CODE_HEADER: &str = "robo:v1";
/// Delimiter used to separate the prefix from the payload.
const FIELD_DELIMITER: char = ':';

/// A puzzle packed into a single line so it can be shared and replayed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PuzzleCode {
    /// Title shown for the puzzle.
    pub(crate) name: String,
    /// Level geometry, re-validated on decode.
    pub(crate) grid: GridModel,
}

impl PuzzleCode {
    /// Encodes the puzzle into a single-line string.
    pub(crate) fn encode(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(format!("{CODE_HEADER}:{}", URL_SAFE_NO_PAD.encode(json)))
    }

    /// Decodes a puzzle from its string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, PuzzleCodeError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PuzzleCodeError::EmptyPayload);
        }

        let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
        let domain = parts.next().ok_or(PuzzleCodeError::MissingPrefix)?;
        let version = parts.next().ok_or(PuzzleCodeError::MissingVersion)?;
        let payload = parts.next().ok_or(PuzzleCodeError::MissingPayload)?;

        if domain != CODE_DOMAIN {
            return Err(PuzzleCodeError::InvalidPrefix(domain.to_owned()));
        }
        if version != CODE_VERSION {
            return Err(PuzzleCodeError::UnsupportedVersion(version.to_owned()));
        }

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.as_bytes())
            .map_err(PuzzleCodeError::InvalidEncoding)?;
        serde_json::from_slice(&bytes).map_err(PuzzleCodeError::InvalidPayload)
    }
}

/// Errors that can occur while decoding puzzle codes.
#[derive(Debug)]
pub(crate) enum PuzzleCodeError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing.
    MissingPrefix,
    /// The version segment was missing.
    MissingVersion,
    /// The payload segment was missing.
    MissingPayload,
    /// The code used an unexpected prefix.
    InvalidPrefix(String),
    /// The code used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload was not a valid puzzle.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for PuzzleCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "puzzle code was empty"),
            Self::MissingPrefix => write!(f, "puzzle code is missing the prefix"),
            Self::MissingVersion => write!(f, "puzzle code is missing the version"),
            Self::MissingPayload => write!(f, "puzzle code is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "puzzle prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "puzzle code version '{version}' is not supported")
            }
            Self::InvalidEncoding(error) => write!(f, "could not decode puzzle payload: {error}"),
            Self::InvalidPayload(error) => write!(f, "could not read puzzle payload: {error}"),
        }
    }
}

impl Error for PuzzleCodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use robo_trail_core::{Bonus, CellCoord, GridLayout, StartPose, CANONICAL_FINISH};

    use super::*;

    fn sample() -> PuzzleCode {
        let layout = GridLayout::new(StartPose::CANONICAL, CANONICAL_FINISH)
            .with_walls([CellCoord::new(4, 4), CellCoord::new(5, 1)])
            .with_stars([CellCoord::new(1, 7)])
            .with_bonus([Bonus::new(CellCoord::new(6, 6), 30)]);
        PuzzleCode {
            name: "Generated Puzzle (Medium)".to_owned(),
            grid: GridModel::try_from(layout).expect("valid layout"),
        }
    }

    #[test]
    fn encoded_code_decodes_to_the_same_puzzle() {
        let code = sample();
        let encoded = code.encode().expect("puzzle encodes");
        assert!(encoded.starts_with(&format!("{CODE_HEADER}:")));
        assert_eq!(PuzzleCode::decode(&encoded).expect("code decodes"), code);
    }

    #[test]
    fn foreign_prefixes_are_rejected() {
        assert!(matches!(
            PuzzleCode::decode("maze:v1:abc"),
            Err(PuzzleCodeError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            PuzzleCode::decode("robo:v9:abc"),
            Err(PuzzleCodeError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            PuzzleCode::decode("   "),
            Err(PuzzleCodeError::EmptyPayload)
        ));
    }

    #[test]
    fn layouts_breaking_grid_rules_are_rejected() {
        let json = r#"{"name":"bad","grid":{"bounds":{"columns":8,"rows":8},"start":{"cell":{"column":0,"row":7},"facing":"East"},"finish":{"column":7,"row":0},"walls":[{"column":7,"row":0}],"stars":[],"bonus":[]}}"#;
        let encoded = format!("{CODE_HEADER}:{}", URL_SAFE_NO_PAD.encode(json));
        assert!(matches!(
            PuzzleCode::decode(&encoded),
            Err(PuzzleCodeError::InvalidPayload(_))
        ));
    }
}
