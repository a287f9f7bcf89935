//! Boundary checks for raw inbound frames.

use mentorlink_core::error::AppError;

use super::types::InboundEvent;

/// Validates a raw frame and parses its envelope.
pub fn parse_inbound(raw: &str, max_bytes: usize) -> Result<InboundEvent, AppError> {
    if raw.len() > max_bytes {
        return Err(AppError::invalid_input(format!(
            "Message exceeds maximum size of {max_bytes} bytes"
        )));
    }

    if raw.trim().is_empty() {
        return Err(AppError::invalid_input("Empty message"));
    }

    serde_json::from_str(raw)
        .map_err(|e| AppError::invalid_input(format!("Malformed event: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentorlink_core::ErrorKind;

    #[test]
    fn test_size_and_empty() {
        let err = parse_inbound(&"x".repeat(33), 32).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);

        let err = parse_inbound("  ", 32).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn test_shape() {
        let err = parse_inbound(r#"{"type":"subscribe"}"#, 1024).unwrap_err();
        assert!(err.message.starts_with("Malformed event"));

        let user = mentorlink_core::types::UserId::new();
        let raw = format!(r#"{{"event":"join","data":{{"userId":"{user}"}}}}"#);
        assert_eq!(parse_inbound(&raw, 1024).unwrap().name(), "join");
    }
}
