//! # API Facade
//!
//! The API layer is a **thin facade** over [`PageRepository`] shaped like the
//! admin endpoints the page builder talks to. It does not know about HTTP
//! servers; a web handler deserializes a body, calls [`FolioApi::handle`] and
//! writes out the [`ApiResponse`] with its status code.
//!
//! ## Request Context
//!
//! Who is making a request is an explicit [`RequestContext`] passed into every
//! call. There is no ambient session lookup: the handler that authenticated the
//! request builds the context and threads it through.
//!
//! ## Wire Format
//!
//! Requests are tagged by `action`:
//!
//! ```json
//! {"action": "update_content", "page_id": 7, "content": "<p>Hello world</p>"}
//! {"action": "save_draft", "page_id": 7, "content": "<p>wip</p>", "timestamp": 1700000000}
//! {"action": "load_draft", "page_id": 7}
//! {"action": "delete_draft", "page_id": 7}
//! {"action": "history", "page_id": 7, "limit": 5}
//! {"action": "list_blocks"}
//! {"action": "load_block", "name": "hero.html"}
//! ```
//!
//! Responses always carry `success`. Failures add `error` and use the status
//! code of the [`FolioError`]; an unparsable request is a 400.

use crate::error::{FolioError, Result};
use crate::repository::PageRepository;
use crate::store::StorageBackend;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Identity of the caller, established by whoever authenticated the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    username: String,
}

impl RequestContext {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ApiRequest {
    UpdateContent {
        page_id: i64,
        content: String,
    },
    SaveDraft {
        page_id: i64,
        content: String,
        #[serde(default)]
        timestamp: Option<i64>,
    },
    LoadDraft {
        page_id: i64,
    },
    DeleteDraft {
        page_id: i64,
    },
    History {
        page_id: i64,
        #[serde(default)]
        limit: Option<i64>,
    },
    ListBlocks,
    LoadBlock {
        name: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(mut body: Value) -> Self {
        if let Some(fields) = body.as_object_mut() {
            fields.insert("success".to_string(), Value::Bool(true));
        }
        Self { status: 200, body }
    }

    pub fn from_error(err: &FolioError) -> Self {
        Self {
            status: err.status_code(),
            body: json!({
                "success": false,
                "error": err.to_string(),
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The main API facade for folio operations.
///
/// Generic over `StorageBackend` to allow different storage backends.
pub struct FolioApi<B: StorageBackend> {
    repository: PageRepository<B>,
}

impl<B: StorageBackend> FolioApi<B> {
    pub fn new(repository: PageRepository<B>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &PageRepository<B> {
        &self.repository
    }

    /// Parse a raw request body and dispatch it.
    pub fn handle_json(&self, ctx: &RequestContext, body: &str) -> ApiResponse {
        match serde_json::from_str::<ApiRequest>(body) {
            Ok(request) => self.handle(ctx, request),
            Err(err) => ApiResponse::from_error(&FolioError::BadRequest(err.to_string())),
        }
    }

    pub fn handle(&self, ctx: &RequestContext, request: ApiRequest) -> ApiResponse {
        match self.dispatch(ctx, request) {
            Ok(body) => ApiResponse::ok(body),
            Err(err) => ApiResponse::from_error(&err),
        }
    }

    fn dispatch(&self, ctx: &RequestContext, request: ApiRequest) -> Result<Value> {
        match request {
            ApiRequest::UpdateContent { page_id, content } => {
                let update =
                    self.repository
                        .update_page_content(page_id, &content, ctx.username())?;
                Ok(serde_json::to_value(update)?)
            }
            ApiRequest::SaveDraft {
                page_id,
                content,
                timestamp,
            } => {
                let timestamp = timestamp.unwrap_or_else(|| Utc::now().timestamp());
                self.repository
                    .save_draft(page_id, &content, Some(timestamp))?;
                Ok(json!({ "timestamp": timestamp }))
            }
            ApiRequest::LoadDraft { page_id } => {
                let draft = self.repository.load_draft(page_id)?;
                Ok(json!({ "draft": draft }))
            }
            ApiRequest::DeleteDraft { page_id } => {
                self.repository.delete_draft(page_id)?;
                Ok(json!({}))
            }
            ApiRequest::History { page_id, limit } => {
                let history = self.repository.get_history(page_id, limit)?;
                Ok(json!({ "history": history }))
            }
            ApiRequest::ListBlocks => Ok(json!({ "blocks": self.repository.list_blocks() })),
            ApiRequest::LoadBlock { name } => {
                let content = self.repository.load_block(&name)?;
                Ok(json!({ "name": name, "content": content }))
            }
        }
    }
}
