//! REST endpoints for the FAQ pipeline.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use triptych_agents::{PipelineStatus, SystemStatus};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Notice returned when the pipeline produced no answer text.
const EMPTY_RESPONSE_NOTICE: &str =
    "No response generated. Please check if documents are ingested and context is available.";

/// Service banner for `GET /`.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
    pub version: String,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Welcome to the Triptych FAQ service".to_string(),
        status: "operational".to_string(),
        version: VERSION.to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
    })
}

/// Incoming chat message.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub id: String,
    pub content: String,
}

/// Generated answer, wrapped as a chat message.
#[derive(Debug, Serialize)]
pub struct ResponseMessage {
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: u8,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub id: String,
    pub message: ResponseMessage,
}

/// Run the full pipeline for a query and return the generated answer.
pub async fn answer_query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, StatusCode> {
    let result = state
        .orchestrator
        .process_query(&req.content, state.default_top_k)
        .await;

    if result.status == PipelineStatus::Error {
        tracing::error!(
            query = %req.content,
            error = result.error.as_deref().unwrap_or("unknown"),
            "pipeline returned an error"
        );
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let content = result
        .response
        .map(|generated| generated.response)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| EMPTY_RESPONSE_NOTICE.to_string());

    Ok(Json(QueryResponse {
        id: req.id,
        message: ResponseMessage {
            content,
            message_type: 1,
            id: Uuid::new_v4().to_string(),
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    pub documents: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents_added: Option<usize>,
}

/// Add documents to the retrieval index.
pub async fn add_documents(
    State(state): State<AppState>,
    Json(req): Json<DocumentRequest>,
) -> Result<Json<DocumentResponse>, StatusCode> {
    if let Err(e) = state.orchestrator.add_documents(&req.documents).await {
        tracing::error!(error = %e, "failed to add documents");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    Ok(Json(DocumentResponse {
        status: "success".to_string(),
        message: "Documents added successfully".to_string(),
        documents_added: Some(req.documents.len()),
    }))
}

/// Drop every indexed document.
pub async fn clear_documents(
    State(state): State<AppState>,
) -> Result<Json<DocumentResponse>, StatusCode> {
    if let Err(e) = state.orchestrator.clear_index() {
        tracing::error!(error = %e, "failed to clear documents");
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    Ok(Json(DocumentResponse {
        status: "success".to_string(),
        message: "All documents cleared".to_string(),
        documents_added: None,
    }))
}

/// Report per-agent status and index statistics.
pub async fn get_status(State(state): State<AppState>) -> Result<Json<SystemStatus>, StatusCode> {
    match state.orchestrator.system_status() {
        Ok(status) => Ok(Json(status)),
        Err(e) => {
            tracing::error!(error = %e, "failed to collect system status");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_accepts_chat_message() {
        let req: QueryRequest =
            serde_json::from_str(r#"{"id": "msg-1", "content": "What is phagocytosis?"}"#).unwrap();

        assert_eq!(req.id, "msg-1");
        assert_eq!(req.content, "What is phagocytosis?");
    }

    #[test]
    fn test_query_response_wire_shape() {
        let response = QueryResponse {
            id: "msg-1".to_string(),
            message: ResponseMessage {
                content: "An answer".to_string(),
                message_type: 1,
                id: "00000000-0000-0000-0000-000000000000".to_string(),
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["id"], "msg-1");
        assert_eq!(json["message"]["content"], "An answer");
        assert_eq!(json["message"]["type"], 1);
    }

    #[test]
    fn test_document_response_omits_count_when_clearing() {
        let response = DocumentResponse {
            status: "success".to_string(),
            message: "All documents cleared".to_string(),
            documents_added: None,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("documents_added").is_none());
    }
}
