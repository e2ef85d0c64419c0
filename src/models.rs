use serde::{Deserialize, Serialize};

/// Document-upload request: the source filename plus its extracted text.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub text: String,
}

/// Document-upload response
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub chunks: usize,
    /// Present when the snapshot write failed; the upload itself succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Context-retrieval request
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    1
}

/// Context-retrieval response
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    pub context: String,
}

/// File-listing response
#[derive(Debug, Clone, Serialize)]
pub struct FilesResponse {
    pub files: Vec<String>,
}

/// Generic message response (reset)
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Chat request
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

/// A single chat turn sent to the completion backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_top_k_defaults_to_one() {
        let req: QueryRequest = serde_json::from_str(r#"{"question":"hi"}"#).unwrap();
        assert_eq!(req.top_k, 1);
    }

    #[test]
    fn test_query_request_top_k_override() {
        let req: QueryRequest =
            serde_json::from_str(r#"{"question":"hi","top_k":3}"#).unwrap();
        assert_eq!(req.top_k, 3);
    }

    #[test]
    fn test_upload_response_omits_empty_warning() {
        let resp = UploadResponse {
            message: "ok".into(),
            chunks: 2,
            warning: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("warning").is_none());
    }

    #[test]
    fn test_upload_response_includes_warning() {
        let resp = UploadResponse {
            message: "ok".into(),
            chunks: 2,
            warning: Some("disk full".into()),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["warning"], "disk full");
    }
}
