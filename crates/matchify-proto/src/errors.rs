//! Protocol error types.

use thiserror::Error;

use crate::FrameType;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced while decoding or encoding frames.
///
/// None of these are fatal to a session. A frame that fails to decode is
/// dropped by the caller and the session carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame text is not valid JSON.
    #[error("malformed JSON: {0}")]
    Json(String),

    /// Frame is valid JSON but not an object.
    #[error("frame is not a JSON object")]
    NotAnObject,

    /// Frame object has no string `type` field.
    #[error("frame has no `type` discriminator")]
    MissingType,

    /// Frame `type` is not one of the known frame types.
    #[error("unknown frame type: {0:?}")]
    UnknownType(String),

    /// Frame type is known but its fields are missing or mistyped.
    #[error("invalid {frame_type} frame: {reason}")]
    InvalidFrame {
        /// Type of the offending frame
        frame_type: FrameType,
        /// Deserializer message
        reason: String,
    },

    /// Frame type is valid on the wire but not in this direction.
    #[error("{0} frames are not sent by clients")]
    WrongDirection(FrameType),

    /// Category name does not match any matching category.
    #[error("unknown category: {0:?}")]
    UnknownCategory(String),

    /// Serialization failed.
    #[error("failed to encode frame: {0}")]
    Encode(String),
}

impl ProtocolError {
    /// Returns true if the frame could not even be classified.
    ///
    /// Unclassifiable frames are noise (bad JSON, missing or unknown type).
    /// Classified-but-invalid frames usually indicate a server version skew.
    pub fn is_unclassified(&self) -> bool {
        matches!(self, Self::Json(_) | Self::NotAnObject | Self::MissingType | Self::UnknownType(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unclassified_errors() {
        assert!(ProtocolError::Json("eof".into()).is_unclassified());
        assert!(ProtocolError::NotAnObject.is_unclassified());
        assert!(ProtocolError::MissingType.is_unclassified());
        assert!(ProtocolError::UnknownType("PING".into()).is_unclassified());

        assert!(
            !ProtocolError::InvalidFrame {
                frame_type: FrameType::Message,
                reason: "missing field `from`".into(),
            }
            .is_unclassified()
        );
        assert!(!ProtocolError::WrongDirection(FrameType::Connected).is_unclassified());
    }

    #[test]
    fn display_names_frame_type() {
        let err = ProtocolError::InvalidFrame {
            frame_type: FrameType::State,
            reason: "missing field `typing`".into(),
        };
        assert_eq!(err.to_string(), "invalid STATE frame: missing field `typing`");
    }
}
