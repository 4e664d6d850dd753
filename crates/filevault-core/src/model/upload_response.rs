use serde::{Deserialize, Serialize};

/// Message carried by a successful upload envelope
pub const UPLOAD_OK: &str = "UPLOAD OK";

/// Response envelope returned to the uploading caller
///
/// Serialized as `{"success": .., "message": .., "fileId": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub file_id: Option<String>,
}

impl UploadResponse {
    /// Envelope for a committed upload
    pub fn ok(file_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message: UPLOAD_OK.to_string(),
            file_id: Some(file_id.into()),
        }
    }

    /// Envelope for a failed upload; no file id is ever reported
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            file_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_json_shape() {
        let json = serde_json::to_value(UploadResponse::ok("f1")).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], UPLOAD_OK);
        assert_eq!(json["fileId"], "f1");
    }

    #[test]
    fn test_failed_envelope_has_null_file_id() {
        let json = serde_json::to_value(UploadResponse::failed("boom")).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["fileId"].is_null());
    }
}
