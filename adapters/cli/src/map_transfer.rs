//! Single-line share codes for terrain maps.
//!
//! A code reads `cavern:v1:<size>:<payload>` where the payload is the
//! unpadded base64 encoding of the map's JSON [`GridState`].

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use cavern_defence_core::GridState;
use thiserror::Error;

const CODE_DOMAIN: &str = "cavern";
const CODE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded map payload.
pub(crate) const CODE_HEADER: &str = "cavern:v1";
/// Delimiter separating the prefix, grid size and payload.
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while encoding or decoding share codes.
#[derive(Debug, Error)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("share code was empty")]
    EmptyPayload,
    /// A required segment was missing.
    #[error("share code is missing the {0}")]
    MissingSegment(&'static str),
    /// The code used an unexpected prefix segment.
    #[error("share code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The code used an unsupported version identifier.
    #[error("share code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid size segment could not be parsed.
    #[error("could not parse grid size '{0}'")]
    InvalidSize(String),
    /// The size segment disagrees with the size inside the payload.
    #[error("share code declares grid size {declared} but carries a {payload} grid")]
    SizeMismatch {
        /// Size from the header.
        declared: u32,
        /// Size from the decoded payload.
        payload: u32,
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode map payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not process map payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Encodes a map into a share code.
pub(crate) fn encode(state: &GridState) -> Result<String, TransferError> {
    let json = serde_json::to_vec(state)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{CODE_HEADER}:{}:{encoded}", state.grid_size))
}

/// Decodes a map from a share code.
pub(crate) fn decode(value: &str) -> Result<GridState, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(4, FIELD_DELIMITER);
    let domain = parts.next().ok_or(TransferError::MissingSegment("prefix"))?;
    let version = parts.next().ok_or(TransferError::MissingSegment("version"))?;
    let size = parts.next().ok_or(TransferError::MissingSegment("grid size"))?;
    let payload = parts.next().ok_or(TransferError::MissingSegment("payload"))?;

    if domain != CODE_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != CODE_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }

    let declared = parse_size(size)?;
    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    let state: GridState = serde_json::from_slice(&bytes)?;
    if state.grid_size != declared {
        return Err(TransferError::SizeMismatch {
            declared,
            payload: state.grid_size,
        });
    }

    Ok(state)
}

/// Reports whether the text looks like a share code rather than a JSON document.
pub(crate) fn is_share_code(value: &str) -> bool {
    value
        .trim_start()
        .starts_with(&format!("{CODE_DOMAIN}{FIELD_DELIMITER}"))
}

fn parse_size(size: &str) -> Result<u32, TransferError> {
    match size.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(TransferError::InvalidSize(size.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cavern_defence_core::CellCoord;

    fn sample_state() -> GridState {
        GridState {
            grid_size: 3,
            tiles: vec![vec![0, 1, 2], vec![3, 0, 0], vec![0, 0, 1]],
            height_map: vec![vec![1.0, 2.5, 0.0]; 3],
            spawn_point: Some(CellCoord::new(0, 1)),
            exit_point: Some(CellCoord::new(2, 1)),
            version: "1.0".to_owned(),
        }
    }

    #[test]
    fn round_trip_preserves_state() {
        let state = sample_state();

        let encoded = encode(&state).expect("encodes");
        assert!(encoded.starts_with(&format!("{CODE_HEADER}:3:")));
        assert!(is_share_code(&encoded));

        let decoded = decode(&format!("  {encoded}\n")).expect("decodes");
        assert_eq!(decoded, state);
    }

    #[test]
    fn rejects_foreign_prefix_and_version() {
        assert!(matches!(
            decode("dungeon:v1:3:e30"),
            Err(TransferError::InvalidPrefix(prefix)) if prefix == "dungeon"
        ));
        assert!(matches!(
            decode("cavern:v2:3:e30"),
            Err(TransferError::UnsupportedVersion(version)) if version == "v2"
        ));
    }

    #[test]
    fn rejects_truncated_codes() {
        assert!(matches!(decode("   "), Err(TransferError::EmptyPayload)));
        assert!(matches!(
            decode("cavern:v1:3"),
            Err(TransferError::MissingSegment("payload"))
        ));
        assert!(matches!(
            decode("cavern:v1:zero:e30"),
            Err(TransferError::InvalidSize(_))
        ));
    }

    #[test]
    fn rejects_mismatched_size_header() {
        let encoded = encode(&sample_state()).expect("encodes");
        let tampered = encoded.replacen(":3:", ":4:", 1);

        assert!(matches!(
            decode(&tampered),
            Err(TransferError::SizeMismatch {
                declared: 4,
                payload: 3
            })
        ));
    }

    #[test]
    fn json_documents_are_not_share_codes() {
        assert!(!is_share_code("{\"gridSize\": 3}"));
    }
}
