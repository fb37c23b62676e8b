// libs/scheduling-cell/src/handlers.rs
use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use navigation_cell::NavigationFrame;
use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{DialogChoice, Notice, RowTarget, SchedulingError, Screen, ScreenState};
use crate::services::{IntentOutcome, RecordingView, SchedulingController, SessionContext};

// ==============================================================================
// SHARED STATE
// ==============================================================================

/// One scheduling window per process. The mutex makes every intent run to
/// completion before the next one is looked at.
pub struct SchedulingState {
    pub config: AppConfig,
    pub desk: Mutex<SchedulingController<RecordingView>>,
}

impl SchedulingState {
    pub fn new(config: &AppConfig) -> Result<Self, SchedulingError> {
        let controller = SchedulingController::from_config(config, RecordingView::new())?;
        Ok(Self {
            config: config.clone(),
            desk: Mutex::new(controller),
        })
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct OpenSchedulingRequest {
    pub session: SessionContext,
    pub return_frame: NavigationFrame,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub to: Screen,
}

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub target: RowTarget,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogAction {
    Book,
    Confirm,
    Unconfirm,
    Delete,
    Cancel,
    /// Dialog window closed without picking an option.
    Dismiss,
}

#[derive(Debug, Deserialize)]
pub struct ChooseRequest {
    pub choice: DialogAction,
}

#[derive(Debug, Serialize)]
pub struct SchedulingSnapshot {
    pub outcome: &'static str,
    pub rejection: Option<String>,
    pub state: ScreenState,
    pub notices: Vec<Notice>,
    pub restored_frame: Option<NavigationFrame>,
    pub exited: bool,
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::NotFound(_) => AppError::NotFound(err.to_string()),
            SchedulingError::Unauthorized { .. } => AppError::Forbidden(err.to_string()),
            SchedulingError::InvalidSlotWindow(_) => AppError::Internal(err.to_string()),
            SchedulingError::EmptyStack
            | SchedulingError::NoDialog
            | SchedulingError::ChoiceNotOffered(_)
            | SchedulingError::DialogOpen
            | SchedulingError::InvalidNavigation { .. }
            | SchedulingError::SessionActive
            | SchedulingError::NoSession => AppError::Conflict(err.to_string()),
        }
    }
}

fn snapshot(
    desk: &mut SchedulingController<RecordingView>,
    outcome: IntentOutcome,
) -> Result<Json<SchedulingSnapshot>, AppError> {
    let (label, rejection, restored) = match outcome {
        // intents without a session never reached the screen
        IntentOutcome::Rejected(SchedulingError::NoSession) => {
            return Err(SchedulingError::NoSession.into());
        }
        IntentOutcome::Rendered(_) => ("rendered", None, None),
        IntentOutcome::Ignored => ("ignored", None, None),
        IntentOutcome::Rejected(err) => ("rejected", Some(err.to_string()), None),
        IntentOutcome::Closed { restored } => ("closed", None, restored),
    };

    let state = desk.screen_state();
    let view = desk.view_mut();
    // the restore callback already carries the frame; drain it so it is reported once
    let restored_frame = view.take_restored().or(restored);

    Ok(Json(SchedulingSnapshot {
        outcome: label,
        rejection,
        state,
        notices: view.take_notices(),
        restored_frame,
        exited: view.take_exited(),
    }))
}

// ==============================================================================
// INTENT HANDLERS
// ==============================================================================

pub async fn get_snapshot(
    State(state): State<Arc<SchedulingState>>,
) -> Result<Json<SchedulingSnapshot>, AppError> {
    let mut desk = state.desk.lock().await;
    let screen = desk.screen();
    snapshot(&mut desk, IntentOutcome::Rendered(screen))
}

pub async fn open_scheduling(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<OpenSchedulingRequest>,
) -> Result<Json<SchedulingSnapshot>, AppError> {
    debug!("Open scheduling request for '{}'", request.session.identity);

    let mut desk = state.desk.lock().await;
    desk.open(request.session, request.return_frame)?;
    snapshot(&mut desk, IntentOutcome::Rendered(Screen::Start))
}

pub async fn navigate(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<NavigateRequest>,
) -> Result<Json<SchedulingSnapshot>, AppError> {
    let mut desk = state.desk.lock().await;
    let outcome = desk.navigate(request.to);
    snapshot(&mut desk, outcome)
}

pub async fn activate_row(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<ActivateRequest>,
) -> Result<Json<SchedulingSnapshot>, AppError> {
    let mut desk = state.desk.lock().await;
    let outcome = desk.activate(request.target);
    snapshot(&mut desk, outcome)
}

pub async fn choose(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<ChooseRequest>,
) -> Result<Json<SchedulingSnapshot>, AppError> {
    let mut desk = state.desk.lock().await;
    let outcome = match request.choice {
        DialogAction::Book => desk.choose(DialogChoice::Book),
        DialogAction::Confirm => desk.choose(DialogChoice::Confirm),
        DialogAction::Unconfirm => desk.choose(DialogChoice::Unconfirm),
        DialogAction::Delete => desk.choose(DialogChoice::Delete),
        DialogAction::Cancel => desk.choose(DialogChoice::Cancel),
        DialogAction::Dismiss => desk.dismiss_dialog(),
    };
    snapshot(&mut desk, outcome)
}

pub async fn back(
    State(state): State<Arc<SchedulingState>>,
) -> Result<Json<SchedulingSnapshot>, AppError> {
    let mut desk = state.desk.lock().await;
    let outcome = desk.back();
    snapshot(&mut desk, outcome)
}

pub async fn close(
    State(state): State<Arc<SchedulingState>>,
) -> Result<Json<SchedulingSnapshot>, AppError> {
    let mut desk = state.desk.lock().await;
    let outcome = desk.close();
    snapshot(&mut desk, outcome)
}
