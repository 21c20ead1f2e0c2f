//! Shared fakes for router tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::Utc;
use tower::ServiceExt;
use uuid::Uuid;

use jotwise_api::{router, AppState, DEFAULT_BODY_LIMIT};
use jotwise_core::{
    CreateNoteRequest, Error, Note, NoteRepository, Result, SessionGateway, SessionUser,
    UpdateNoteRequest,
};
use jotwise_inference::mock::MockStreamingBackend;
use jotwise_inference::SummarizeService;

pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_TOKEN: &str = "bob-token";

pub fn alice() -> Uuid {
    Uuid::from_u128(0xA11CE)
}

pub fn bob() -> Uuid {
    Uuid::from_u128(0xB0B)
}

/// Notes kept in memory, scoped by user like the real repository.
#[derive(Default)]
pub struct InMemoryNotes {
    notes: Mutex<HashMap<Uuid, Note>>,
}

impl InMemoryNotes {
    fn owned(&self, user_id: Uuid, id: Uuid) -> Result<Note> {
        self.notes
            .lock()
            .unwrap()
            .get(&id)
            .filter(|n| n.user_id == user_id)
            .cloned()
            .ok_or(Error::NoteNotFound(id))
    }

    fn modify(&self, user_id: Uuid, id: Uuid, f: impl FnOnce(&mut Note)) -> Result<Note> {
        let mut notes = self.notes.lock().unwrap();
        match notes.get_mut(&id) {
            Some(note) if note.user_id == user_id => {
                f(note);
                Ok(note.clone())
            }
            _ => Err(Error::NoteNotFound(id)),
        }
    }
}

#[async_trait]
impl NoteRepository for InMemoryNotes {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Note>> {
        let mut notes: Vec<Note> = self
            .notes
            .lock()
            .unwrap()
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<Note> {
        self.owned(user_id, id)
    }

    async fn insert(&self, user_id: Uuid, req: CreateNoteRequest) -> Result<Note> {
        let note = Note {
            id: Uuid::now_v7(),
            user_id,
            title: req.title.trim().to_string(),
            content: req.content,
            summary: None,
            created_at: Utc::now(),
        };
        self.notes.lock().unwrap().insert(note.id, note.clone());
        Ok(note)
    }

    async fn update(&self, user_id: Uuid, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        self.modify(user_id, id, |note| {
            if let Some(title) = req.title {
                note.title = title.trim().to_string();
            }
            if let Some(content) = req.content {
                note.content = content;
            }
        })
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        self.owned(user_id, id)?;
        self.notes.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn update_summary(&self, user_id: Uuid, id: Uuid, summary: &str) -> Result<Note> {
        self.modify(user_id, id, |note| note.summary = Some(summary.to_string()))
    }
}

/// Two fixed users, one token each.
pub struct StaticSessions;

#[async_trait]
impl SessionGateway for StaticSessions {
    async fn resolve(&self, access_token: &str) -> Result<SessionUser> {
        let id = match access_token {
            ALICE_TOKEN => alice(),
            BOB_TOKEN => bob(),
            _ => return Err(Error::Unauthorized("Invalid or expired session".to_string())),
        };
        Ok(SessionUser { id, email: None })
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub notes: Arc<InMemoryNotes>,
    pub backend: MockStreamingBackend,
}

impl TestApp {
    pub fn new(backend: MockStreamingBackend) -> Self {
        let notes = Arc::new(InMemoryNotes::default());
        let state = AppState::new(
            notes.clone(),
            Arc::new(StaticSessions),
            SummarizeService::new(Arc::new(backend.clone())),
        );
        Self::with_state(state, notes, backend)
    }

    pub fn with_state(state: AppState, notes: Arc<InMemoryNotes>, backend: MockStreamingBackend) -> Self {
        let router = router(
            state.clone(),
            vec!["http://localhost:3000".parse().unwrap()],
            DEFAULT_BODY_LIMIT,
        );
        Self {
            router,
            state,
            notes,
            backend,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Insert a note directly, bypassing validation.
    pub async fn seed_note(&self, user_id: Uuid, content: &str) -> Note {
        self.notes
            .insert(
                user_id,
                CreateNoteRequest {
                    title: "Seeded".to_string(),
                    content: content.to_string(),
                },
            )
            .await
            .unwrap()
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
