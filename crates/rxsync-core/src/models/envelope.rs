//! Result envelope returned by the operation surface

use serde::Serialize;

/// `{success, data?, id?, error?}` shape handed back to calling code.
///
/// Mutations succeed or fail locally; sync outcomes never show up here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Success with a payload.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            id: None,
            error: None,
        }
    }

    /// Success with a payload and the id it concerns.
    #[must_use]
    pub fn ok_with_id(id: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            id: Some(id.into()),
            error: None,
        }
    }

    /// Success with no payload.
    #[must_use]
    pub const fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            id: None,
            error: None,
        }
    }

    /// Failure with a message.
    #[must_use]
    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            data: None,
            id: None,
            error: Some(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_with_id_carries_both() {
        let envelope = Envelope::ok_with_id("prec-42", 7);
        assert!(envelope.success);
        assert_eq!(envelope.id.as_deref(), Some("prec-42"));
        assert_eq!(envelope.data, Some(7));
        assert_eq!(envelope.error, None);
    }

    #[test]
    fn failure_keeps_message_only() {
        let envelope: Envelope<()> = Envelope::failure("boom");
        assert!(!envelope.success);
        assert_eq!(envelope.error.as_deref(), Some("boom"));
        assert_eq!(envelope.data, None);
    }

    #[test]
    fn serializes_without_empty_fields() {
        let envelope: Envelope<()> = Envelope::ok_empty();
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
    }
}
