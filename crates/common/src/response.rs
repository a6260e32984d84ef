use serde::{Deserialize, Serialize};

/// Machine-readable error payload attached to failed responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub error_code: String,
    pub error_message: String,
}

/// Success/error envelope for every HTTP response.
///
/// A successful response carries `data`; a failed one carries `error` with a
/// stable error code. The HTTP gateway client decodes this same envelope, so
/// business rejections survive the wire with their codes intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
}

impl<T> ApiResponse<T> {
    /// Builds a success envelope with a payload.
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }

    /// Builds a success envelope with no payload (deletes, acknowledgements).
    pub fn success_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            error: None,
        }
    }

    /// Builds a failure envelope with a stable error code.
    pub fn error(error_code: impl Into<String>, error_message: impl Into<String>) -> Self {
        let error_message = error_message.into();
        Self {
            success: false,
            message: error_message.clone(),
            data: None,
            error: Some(ErrorDetails {
                error_code: error_code.into(),
                error_message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_carries_data() {
        let resp = ApiResponse::success("ok", 42);
        assert!(resp.success);
        assert_eq!(resp.data, Some(42));
        assert!(resp.error.is_none());
    }

    #[test]
    fn error_envelope_carries_code() {
        let resp: ApiResponse<()> = ApiResponse::error("ORD_001", "Order not found");
        assert!(!resp.success);
        assert!(resp.data.is_none());
        let err = resp.error.unwrap();
        assert_eq!(err.error_code, "ORD_001");
        assert_eq!(err.error_message, "Order not found");
    }

    #[test]
    fn envelope_roundtrip() {
        let resp = ApiResponse::success("created", vec![1, 2, 3]);
        let json = serde_json::to_string(&resp).unwrap();
        let back: ApiResponse<Vec<i32>> = serde_json::from_str(&json).unwrap();
        assert!(back.success);
        assert_eq!(back.data, Some(vec![1, 2, 3]));
    }

    #[test]
    fn error_fields_omitted_on_success() {
        let resp = ApiResponse::success("ok", 1);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("\"error\""));
    }
}
