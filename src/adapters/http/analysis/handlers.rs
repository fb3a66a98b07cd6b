//! HTTP handlers for analysis endpoints.

use std::collections::HashMap;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::application::handlers::analysis::{
    AnalysisCommandError, AnalysisSession, CreateAnalysisCommand, CreateAnalysisHandler,
    DeleteAnalysisHandler, ListAnalysesHandler, OpenAnalysisHandler,
};
use crate::application::{AutoSaveConfig, SyncStatus};
use crate::domain::analysis::AnalysisError;
use crate::domain::foundation::{AnalysisId, ErrorCode};
use crate::ports::AnalysisStore;

use super::dto::{
    AddScenarioRequest, AnalysisListResponse, AnalysisResponse, CreateAnalysisRequest,
    ErrorResponse, JudgmentRequest, NameRequest, RatingRequest, RenameAnalysisRequest,
    ScenarioCreatedResponse, WeightChangeResponse, WeightRequest,
};

/// Default time a fully saved session stays open without requests.
const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(300);

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

/// Where one analysis stands inside the HTTP layer.
enum Slot {
    /// No session; the next edit opens one from the store.
    Closed,
    Open(OpenSession),
    /// Terminal. Requests that reach a deleted slot answer 404.
    Deleted,
}

struct OpenSession {
    session: AnalysisSession,
    last_used: Instant,
}

impl OpenSession {
    fn new(session: AnalysisSession) -> Self {
        Self {
            session,
            last_used: Instant::now(),
        }
    }

    fn view(&self) -> AnalysisResponse {
        AnalysisResponse::new(self.session.record(), &self.session.sync_status())
    }

    /// Saved, nothing in flight and untouched for `idle`.
    fn is_idle(&self, now: Instant, idle: Duration) -> bool {
        !self.session.state().has_unsaved_changes()
            && now.saturating_duration_since(self.last_used) >= idle
    }
}

type SharedSlot = Arc<Mutex<Slot>>;

/// Shared state of the analysis endpoints.
///
/// Each analysis gets its own slot lock, so store I/O for one analysis never
/// holds up another. The map lock is only held to look slots up; slot handles
/// are cloned under it, which makes a strong count of one mean "unused".
///
/// Edits open a session on first use. Reads render from the open session if
/// there is one and load the record otherwise. Saved sessions left idle are
/// closed by [`evict_idle`](Self::evict_idle).
#[derive(Clone)]
pub struct AnalysisHandlers {
    create_handler: Arc<CreateAnalysisHandler>,
    open_handler: Arc<OpenAnalysisHandler>,
    list_handler: Arc<ListAnalysesHandler>,
    delete_handler: Arc<DeleteAnalysisHandler>,
    slots: Arc<Mutex<HashMap<AnalysisId, SharedSlot>>>,
    idle_timeout: Duration,
}

impl AnalysisHandlers {
    pub fn new(
        create_handler: Arc<CreateAnalysisHandler>,
        open_handler: Arc<OpenAnalysisHandler>,
        list_handler: Arc<ListAnalysesHandler>,
        delete_handler: Arc<DeleteAnalysisHandler>,
    ) -> Self {
        Self {
            create_handler,
            open_handler,
            list_handler,
            delete_handler,
            slots: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout: DEFAULT_SESSION_IDLE,
        }
    }

    /// Wires every handler to one store.
    pub fn from_store(store: Arc<dyn AnalysisStore>, autosave: AutoSaveConfig) -> Self {
        Self::new(
            Arc::new(CreateAnalysisHandler::new(Arc::clone(&store))),
            Arc::new(OpenAnalysisHandler::new(Arc::clone(&store), autosave)),
            Arc::new(ListAnalysesHandler::new(Arc::clone(&store))),
            Arc::new(DeleteAnalysisHandler::new(store)),
        )
    }

    /// Sets how long a saved session may sit unused before it is closed.
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    async fn slot(&self, id: AnalysisId) -> SharedSlot {
        let mut slots = self.slots.lock().await;
        Arc::clone(
            slots
                .entry(id)
                .or_insert_with(|| Arc::new(Mutex::new(Slot::Closed))),
        )
    }

    async fn existing_slot(&self, id: AnalysisId) -> Option<SharedSlot> {
        self.slots.lock().await.get(&id).cloned()
    }

    /// Drops our handle and removes the slot if nobody else holds it and it
    /// has no session.
    async fn forget_if_unused(&self, id: AnalysisId, slot: SharedSlot) {
        drop(slot);
        let mut slots = self.slots.lock().await;
        let unused = slots.get(&id).map_or(false, |slot| {
            Arc::strong_count(slot) == 1
                && slot
                    .try_lock()
                    .map(|guard| matches!(*guard, Slot::Closed))
                    .unwrap_or(false)
        });
        if unused {
            slots.remove(&id);
        }
    }

    /// Applies `edit` to the session of `id`, opening it if needed.
    ///
    /// Returns the edit's output with a view of the record afterwards.
    async fn with_session<T, F>(
        &self,
        id: AnalysisId,
        edit: F,
    ) -> Result<(T, AnalysisResponse), AnalysisCommandError>
    where
        F: FnOnce(&mut AnalysisSession) -> Result<T, AnalysisError> + Send,
    {
        let slot = self.slot(id).await;
        let mut guard = slot.lock().await;

        if matches!(*guard, Slot::Closed) {
            match self.open_handler.handle(id).await {
                Ok(session) => *guard = Slot::Open(OpenSession::new(session)),
                Err(e) => {
                    drop(guard);
                    self.forget_if_unused(id, slot).await;
                    return Err(e);
                }
            }
        }

        let open = match &mut *guard {
            Slot::Open(open) => open,
            Slot::Closed | Slot::Deleted => return Err(AnalysisCommandError::Deleted(id)),
        };
        open.last_used = Instant::now();

        let output = edit(&mut open.session)?;
        Ok((output, open.view()))
    }

    /// Renders the analysis without opening a session for it.
    async fn view(&self, id: AnalysisId) -> Result<AnalysisResponse, AnalysisCommandError> {
        if let Some(slot) = self.existing_slot(id).await {
            let guard = slot.lock().await;
            match &*guard {
                Slot::Open(open) => return Ok(open.view()),
                Slot::Deleted => return Err(AnalysisCommandError::Deleted(id)),
                Slot::Closed => {}
            }
        }

        let record = self.open_handler.load(id).await?;
        Ok(AnalysisResponse::new(
            &record,
            &SyncStatus::saved_at(record.revision()),
        ))
    }

    /// Closes the session of `id`, if any, and deletes the stored analysis.
    ///
    /// The slot stays locked until the store confirms, so no request can
    /// reopen the analysis in between.
    async fn delete(&self, id: AnalysisId) -> Result<(), AnalysisCommandError> {
        let slot = self.slot(id).await;
        let mut guard = slot.lock().await;

        let result = match mem::replace(&mut *guard, Slot::Deleted) {
            Slot::Deleted => return Err(AnalysisCommandError::Deleted(id)),
            Slot::Open(open) => self.delete_handler.handle(id, Some(open.session)).await,
            Slot::Closed => self.delete_handler.handle(id, None).await,
        };

        if let Err(e) = result {
            *guard = Slot::Closed;
            drop(guard);
            self.forget_if_unused(id, slot).await;
            return Err(e);
        }
        drop(guard);

        let mut slots = self.slots.lock().await;
        if slots.get(&id).map_or(false, |current| Arc::ptr_eq(current, &slot)) {
            slots.remove(&id);
        }
        Ok(())
    }

    /// Closes saved sessions that have not been used for the idle timeout.
    ///
    /// Sessions with unsaved edits, and slots another request is using, are
    /// left alone. Returns the number of sessions closed.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let idle_timeout = self.idle_timeout;

        let idle: Vec<AnalysisSession> = {
            let mut slots = self.slots.lock().await;
            let mut idle = Vec::new();
            slots.retain(|_, slot| {
                if Arc::strong_count(slot) > 1 {
                    return true;
                }
                let mut guard = match slot.try_lock() {
                    Ok(guard) => guard,
                    Err(_) => return true,
                };
                let evict = match &*guard {
                    Slot::Open(open) => open.is_idle(now, idle_timeout),
                    Slot::Closed | Slot::Deleted => true,
                };
                if evict {
                    if let Slot::Open(open) = mem::replace(&mut *guard, Slot::Closed) {
                        idle.push(open.session);
                    }
                }
                !evict
            });
            idle
        };

        let evicted = idle.len();
        for session in idle {
            let id = session.id();
            let (_, state) = session.close().await;
            tracing::debug!(analysis_id = %id, %state, "Idle session closed");
        }
        evicted
    }

    /// Runs [`evict_idle`](Self::evict_idle) once per idle timeout until aborted.
    pub fn spawn_idle_sweeper(&self) -> JoinHandle<()> {
        let handlers = self.clone();
        let period = self.idle_timeout.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let evicted = handlers.evict_idle().await;
                if evicted > 0 {
                    tracing::debug!(evicted, "Idle sessions swept");
                }
            }
        })
    }

    /// Number of analyses with an open session.
    pub async fn open_session_count(&self) -> usize {
        let slots: Vec<SharedSlot> = self.slots.lock().await.values().cloned().collect();
        let mut open = 0;
        for slot in slots {
            if matches!(*slot.lock().await, Slot::Open(_)) {
                open += 1;
            }
        }
        open
    }

    /// Closes all open sessions, letting in-flight saves finish.
    pub async fn close_all(&self) {
        let slots: Vec<SharedSlot> = {
            let mut slots = self.slots.lock().await;
            slots.drain().map(|(_, slot)| slot).collect()
        };
        for slot in slots {
            let mut guard = slot.lock().await;
            if let Slot::Open(open) = mem::replace(&mut *guard, Slot::Closed) {
                let id = open.session.id();
                let (_, state) = open.session.close().await;
                tracing::debug!(analysis_id = %id, %state, "Session closed");
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/analyses - Create a new analysis from the default template
pub async fn create_analysis(
    State(handlers): State<AnalysisHandlers>,
    Json(req): Json<CreateAnalysisRequest>,
) -> Response {
    let cmd = CreateAnalysisCommand {
        name: req.name,
        description: req.description,
    };

    match handlers.create_handler.handle(cmd).await {
        Ok(record) => {
            let response = AnalysisResponse::new(&record, &SyncStatus::saved_at(record.revision()));
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => handle_analysis_error(e),
    }
}

/// GET /api/analyses - List analyses, most recently updated first
pub async fn list_analyses(State(handlers): State<AnalysisHandlers>) -> Response {
    match handlers.list_handler.handle().await {
        Ok(summaries) => {
            let response: AnalysisListResponse = summaries.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_analysis_error(e),
    }
}

/// GET /api/analyses/:id - Return the current state of an analysis
pub async fn get_analysis(
    State(handlers): State<AnalysisHandlers>,
    Path(analysis_id): Path<String>,
) -> Response {
    let id = match parse_analysis_id(&analysis_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.view(id).await {
        Ok(analysis) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e) => handle_analysis_error(e),
    }
}

/// PATCH /api/analyses/:id - Rename an analysis
pub async fn rename_analysis(
    State(handlers): State<AnalysisHandlers>,
    Path(analysis_id): Path<String>,
    Json(req): Json<RenameAnalysisRequest>,
) -> Response {
    let id = match parse_analysis_id(&analysis_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .with_session(id, |session| session.rename(req.name, req.description))
        .await
    {
        Ok(((), analysis)) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e) => handle_analysis_error(e),
    }
}

/// DELETE /api/analyses/:id - Close the session and delete the analysis
pub async fn delete_analysis(
    State(handlers): State<AnalysisHandlers>,
    Path(analysis_id): Path<String>,
) -> Response {
    let id = match parse_analysis_id(&analysis_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => handle_analysis_error(e),
    }
}

/// PUT /api/analyses/:id/attributes/:attribute_id/weight - Set a manual weight
pub async fn set_attribute_weight(
    State(handlers): State<AnalysisHandlers>,
    Path((analysis_id, attribute_id)): Path<(String, u32)>,
    Json(req): Json<WeightRequest>,
) -> Response {
    let id = match parse_analysis_id(&analysis_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .with_session(id, |session| {
            session.set_attribute_weight(attribute_id, req.weight)
        })
        .await
    {
        Ok((applied, analysis)) => {
            let response = WeightChangeResponse {
                applied: applied.value(),
                analysis,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_analysis_error(e),
    }
}

/// PUT /api/analyses/:id/attributes/:attribute_id/name - Rename an attribute
pub async fn rename_attribute(
    State(handlers): State<AnalysisHandlers>,
    Path((analysis_id, attribute_id)): Path<(String, u32)>,
    Json(req): Json<NameRequest>,
) -> Response {
    let id = match parse_analysis_id(&analysis_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .with_session(id, |session| session.rename_attribute(attribute_id, req.name))
        .await
    {
        Ok(((), analysis)) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e) => handle_analysis_error(e),
    }
}

/// PUT /api/analyses/:id/scenarios/:scenario_id/ratings/:index - Set one rating
pub async fn set_rating(
    State(handlers): State<AnalysisHandlers>,
    Path((analysis_id, scenario_id, index)): Path<(String, u32, usize)>,
    Json(req): Json<RatingRequest>,
) -> Response {
    let id = match parse_analysis_id(&analysis_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .with_session(id, |session| session.set_rating(scenario_id, index, req.rating))
        .await
    {
        Ok(((), analysis)) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e) => handle_analysis_error(e),
    }
}

/// POST /api/analyses/:id/scenarios - Add a scenario
pub async fn add_scenario(
    State(handlers): State<AnalysisHandlers>,
    Path(analysis_id): Path<String>,
    Json(req): Json<AddScenarioRequest>,
) -> Response {
    let id = match parse_analysis_id(&analysis_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .with_session(id, |session| {
            session.add_scenario(req.name, req.description, &req.ratings)
        })
        .await
    {
        Ok((scenario_id, analysis)) => {
            let response = ScenarioCreatedResponse {
                scenario_id,
                analysis,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => handle_analysis_error(e),
    }
}

/// DELETE /api/analyses/:id/scenarios/:scenario_id - Remove a scenario
pub async fn remove_scenario(
    State(handlers): State<AnalysisHandlers>,
    Path((analysis_id, scenario_id)): Path<(String, u32)>,
) -> Response {
    let id = match parse_analysis_id(&analysis_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .with_session(id, |session| session.remove_scenario(scenario_id))
        .await
    {
        Ok((_, analysis)) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e) => handle_analysis_error(e),
    }
}

/// PUT /api/analyses/:id/judgments - Set a pairwise judgment
pub async fn set_judgment(
    State(handlers): State<AnalysisHandlers>,
    Path(analysis_id): Path<String>,
    Json(req): Json<JudgmentRequest>,
) -> Response {
    let id = match parse_analysis_id(&analysis_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .with_session(id, |session| session.set_judgment(req.i, req.j, req.slider))
        .await
    {
        Ok(((), analysis)) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e) => handle_analysis_error(e),
    }
}

/// POST /api/analyses/:id/weights/derive - Score with weights derived from the judgments
pub async fn derive_weights(
    State(handlers): State<AnalysisHandlers>,
    Path(analysis_id): Path<String>,
) -> Response {
    let id = match parse_analysis_id(&analysis_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .with_session(id, |session| session.derive_weights())
        .await
    {
        Ok((_, analysis)) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e) => handle_analysis_error(e),
    }
}

/// POST /api/analyses/:id/weights/manual - Score with the manual weights again
pub async fn use_manual_weights(
    State(handlers): State<AnalysisHandlers>,
    Path(analysis_id): Path<String>,
) -> Response {
    let id = match parse_analysis_id(&analysis_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .with_session(id, |session| session.use_manual_weights())
        .await
    {
        Ok(((), analysis)) => (StatusCode::OK, Json(analysis)).into_response(),
        Err(e) => handle_analysis_error(e),
    }
}

/// POST /api/analyses/:id/save - Re-save the current revision now
pub async fn save_analysis(
    State(handlers): State<AnalysisHandlers>,
    Path(analysis_id): Path<String>,
) -> Response {
    let id = match parse_analysis_id(&analysis_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .with_session(id, |session| {
            session.save_now();
            Ok(())
        })
        .await
    {
        Ok(((), analysis)) => (StatusCode::ACCEPTED, Json(analysis.sync)).into_response(),
        Err(e) => handle_analysis_error(e),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn parse_analysis_id(raw: &str) -> Result<AnalysisId, Response> {
    raw.parse::<AnalysisId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid analysis ID")),
        )
            .into_response()
    })
}

fn handle_analysis_error(error: AnalysisCommandError) -> Response {
    let code = error.code();
    let status = match code {
        ErrorCode::AnalysisNotFound | ErrorCode::AttributeNotFound | ErrorCode::ScenarioNotFound => {
            StatusCode::NOT_FOUND
        }
        ErrorCode::ValidationFailed | ErrorCode::ShapeMismatch => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::InvalidStateTransition => StatusCode::CONFLICT,
        ErrorCode::MalformedRecord | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    };

    if status.is_server_error() {
        tracing::warn!(error = %error, %code, "Analysis request failed");
    }

    (status, Json(ErrorResponse::new(code, error.to_string()))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryAnalysisStore;
    use crate::domain::analysis::{
        AnalysisRecord, AnalysisSnapshot, AnalysisSummary, RecordState, Shape,
    };
    use crate::domain::foundation::ValidationError;
    use crate::ports::StoreError;
    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::time::sleep;

    /// In-memory store whose loads and deletes take a while.
    struct SlowStore {
        inner: InMemoryAnalysisStore,
        load_latency: Duration,
        delete_latency: Duration,
    }

    #[async_trait]
    impl AnalysisStore for SlowStore {
        async fn create(&self, record: &AnalysisRecord) -> Result<AnalysisRecord, StoreError> {
            self.inner.create(record).await
        }

        async fn load(&self, id: AnalysisId) -> Result<Value, StoreError> {
            sleep(self.load_latency).await;
            self.inner.load(id).await
        }

        async fn save(&self, id: AnalysisId, snapshot: &AnalysisSnapshot) -> Result<(), StoreError> {
            self.inner.save(id, snapshot).await
        }

        async fn delete(&self, id: AnalysisId) -> Result<(), StoreError> {
            sleep(self.delete_latency).await;
            self.inner.delete(id).await
        }

        async fn list(&self) -> Result<Vec<AnalysisSummary>, StoreError> {
            self.inner.list().await
        }
    }

    fn handlers_with(load_latency: Duration, delete_latency: Duration) -> AnalysisHandlers {
        let store = Arc::new(SlowStore {
            inner: InMemoryAnalysisStore::new(),
            load_latency,
            delete_latency,
        });
        AnalysisHandlers::from_store(store, AutoSaveConfig::default())
            .with_idle_timeout(Duration::from_secs(60))
    }

    async fn create(handlers: &AnalysisHandlers, name: &str) -> AnalysisId {
        let cmd = CreateAnalysisCommand {
            name: name.to_string(),
            description: None,
        };
        handlers.create_handler.handle(cmd).await.unwrap().id()
    }

    async fn edit(handlers: &AnalysisHandlers, id: AnalysisId) -> Result<(), AnalysisCommandError> {
        handlers
            .with_session(id, |session| session.set_rating(1, 0, 42))
            .await
            .map(|_| ())
    }

    #[tokio::test(start_paused = true)]
    async fn reads_do_not_open_sessions() {
        let handlers = handlers_with(Duration::ZERO, Duration::ZERO);
        let mut ids = Vec::new();
        for n in 0..20 {
            ids.push(create(&handlers, &format!("Analysis {}", n)).await);
        }

        for id in &ids {
            let view = handlers.view(*id).await.unwrap();
            assert_eq!(view.sync.state, RecordState::Loaded);
        }

        assert_eq!(handlers.open_session_count().await, 0);
        assert!(handlers.slots.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_analysis_leaves_no_slot_behind() {
        let handlers = handlers_with(Duration::ZERO, Duration::ZERO);

        let result = edit(&handlers, AnalysisId::new()).await;

        assert!(matches!(result, Err(AnalysisCommandError::Store(StoreError::NotFound(_)))));
        assert!(handlers.slots.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn saved_sessions_are_closed_once_idle() {
        let handlers = handlers_with(Duration::ZERO, Duration::ZERO);
        let saved = create(&handlers, "Saved").await;
        let dirty = create(&handlers, "Dirty").await;

        edit(&handlers, saved).await.unwrap();
        sleep(Duration::from_secs(2)).await;
        edit(&handlers, dirty).await.unwrap();
        assert_eq!(handlers.open_session_count().await, 2);

        // Not idle long enough yet.
        assert_eq!(handlers.evict_idle().await, 0);

        sleep(Duration::from_secs(60)).await;
        handlers
            .with_session(dirty, |session| session.set_rating(1, 0, 43))
            .await
            .unwrap();
        sleep(Duration::from_millis(500)).await;

        assert_eq!(handlers.evict_idle().await, 1);
        assert_eq!(handlers.open_session_count().await, 1);

        let view = handlers.view(saved).await.unwrap();
        assert_eq!(view.scenarios[0].ratings[0].value, 42);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_load_does_not_block_other_analyses() {
        let handlers = handlers_with(Duration::from_secs(1), Duration::ZERO);
        let first = create(&handlers, "First").await;
        let second = create(&handlers, "Second").await;
        let started = Instant::now();

        let background = handlers.clone();
        let first_edit = tokio::spawn(async move { edit(&background, first).await });
        sleep(Duration::from_millis(10)).await;
        edit(&handlers, second).await.unwrap();
        first_edit.await.unwrap().unwrap();

        assert!(started.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn analysis_cannot_be_reopened_while_it_is_being_deleted() {
        let handlers = handlers_with(Duration::ZERO, Duration::from_millis(200));
        let id = create(&handlers, "Doomed").await;
        edit(&handlers, id).await.unwrap();

        let background = handlers.clone();
        let deletion = tokio::spawn(async move { background.delete(id).await });
        sleep(Duration::from_millis(50)).await;

        let during = edit(&handlers, id).await;
        deletion.await.unwrap().unwrap();

        assert_eq!(during.unwrap_err().code(), ErrorCode::AnalysisNotFound);
        assert_eq!(
            handlers.view(id).await.unwrap_err().code(),
            ErrorCode::AnalysisNotFound
        );
        assert_eq!(edit(&handlers, id).await.unwrap_err().code(), ErrorCode::AnalysisNotFound);
        assert_eq!(handlers.open_session_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn read_during_delete_is_not_found() {
        let handlers = handlers_with(Duration::ZERO, Duration::from_millis(200));
        let id = create(&handlers, "Doomed").await;

        let background = handlers.clone();
        let deletion = tokio::spawn(async move { background.delete(id).await });
        sleep(Duration::from_millis(50)).await;

        let during = handlers.view(id).await;
        deletion.await.unwrap().unwrap();

        assert_eq!(during.unwrap_err().code(), ErrorCode::AnalysisNotFound);
        assert!(handlers.slots.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn close_all_closes_every_session() {
        let handlers = handlers_with(Duration::ZERO, Duration::ZERO);
        let id = create(&handlers, "Open").await;
        edit(&handlers, id).await.unwrap();

        handlers.close_all().await;

        assert_eq!(handlers.open_session_count().await, 0);
    }

    #[test]
    fn analysis_not_found_maps_to_404() {
        let error = AnalysisCommandError::from(StoreError::NotFound(AnalysisId::new()));
        let response = handle_analysis_error(error);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unknown_scenario_maps_to_404() {
        let error = AnalysisCommandError::from(AnalysisError::ScenarioNotFound(9));
        let response = handle_analysis_error(error);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_failed_maps_to_422() {
        let error = AnalysisCommandError::from(ValidationError::empty_field("name"));
        let response = handle_analysis_error(error);
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn shape_mismatch_maps_to_422() {
        let error = AnalysisCommandError::from(AnalysisError::shape_mismatch(
            Shape::ScenarioRatings(7),
            6,
            5,
        ));
        let response = handle_analysis_error(error);
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn malformed_record_maps_to_500() {
        let error = AnalysisCommandError::from(AnalysisError::malformed("weights"));
        let response = handle_analysis_error(error);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unavailable_store_maps_to_503() {
        let error = AnalysisCommandError::from(StoreError::Unavailable("pool closed".into()));
        let response = handle_analysis_error(error);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn invalid_id_maps_to_400() {
        let response = parse_analysis_id("not-a-uuid").unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
