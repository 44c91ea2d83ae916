use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    ClothingRecord, Gender, Style, TemperatureBounds, WizardError, WizardSession, WizardStep,
};
use crate::services;

use super::extract::{JsonBody, PathParam, QueryParams};
use super::state::Pick;
use super::AppState;

// Request/Response types

#[derive(Debug, Serialize)]
pub struct StyleOption {
    pub code: Style,
    pub label: &'static str,
    pub label_ko: &'static str,
}

impl From<Style> for StyleOption {
    fn from(style: Style) -> Self {
        Self {
            code: style,
            label: style.label(),
            label_ko: style.label_ko(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenderOption {
    pub code: Gender,
    pub label: &'static str,
    pub label_ko: &'static str,
    pub styles: Vec<StyleOption>,
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub genders: Vec<GenderOption>,
    pub temperature: TemperatureBounds,
}

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    pub gender: Gender,
    pub style: Style,
    pub temperature: i32,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub matched: bool,
    pub candidates: usize,
    pub record: Option<ClothingRecord>,
}

impl From<Option<Pick>> for RecommendationResponse {
    fn from(pick: Option<Pick>) -> Self {
        match pick {
            Some(pick) => Self {
                matched: true,
                candidates: pick.candidates,
                record: Some(pick.record),
            },
            None => Self {
                matched: false,
                candidates: 0,
                record: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub step: WizardStep,
    pub gender: Option<Gender>,
    pub style: Option<Style>,
    pub temperature: i32,
    /// Styles selectable for the chosen gender
    pub styles: Vec<Style>,
    pub temperature_bounds: TemperatureBounds,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&WizardSession> for SessionResponse {
    fn from(session: &WizardSession) -> Self {
        Self {
            id: session.id,
            step: session.step,
            gender: session.gender,
            style: session.style,
            temperature: session.temperature,
            styles: session
                .gender
                .map(|g| Style::offered_for(g).to_vec())
                .unwrap_or_default(),
            temperature_bounds: session.bounds(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectGenderRequest {
    pub gender: Gender,
}

#[derive(Debug, Deserialize)]
pub struct SelectStyleRequest {
    pub style: Style,
}

#[derive(Debug, Deserialize)]
pub struct SetTemperatureRequest {
    pub temperature: i32,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub image_ref: String,
    pub data_url: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResultResponse {
    pub session: SessionResponse,
    #[serde(flatten)]
    pub recommendation: RecommendationResponse,
    /// Embedded image as a `data:` URL when the file could be read
    pub image_data_url: Option<String>,
    pub image_error: Option<String>,
}

// Handlers

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "records": state.catalog.len() })),
    )
}

/// Genders with their styles, plus the temperature slider range
pub async fn get_options(State(state): State<AppState>) -> Json<OptionsResponse> {
    let genders = Gender::ALL
        .iter()
        .map(|&gender| GenderOption {
            code: gender,
            label: gender.label(),
            label_ko: gender.label_ko(),
            styles: Style::offered_for(gender)
                .iter()
                .copied()
                .map(StyleOption::from)
                .collect(),
        })
        .collect();

    Json(OptionsResponse {
        genders,
        temperature: state.bounds,
    })
}

/// Stateless recommendation for an explicit gender, style and temperature
pub async fn recommend(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<RecommendParams>,
) -> AppResult<Json<RecommendationResponse>> {
    let query = services::Query {
        gender: params.gender,
        style: params.style,
        temperature: params.temperature,
    };
    let pick = state.recommend(&query);

    tracing::debug!(
        gender = %query.gender,
        style = %query.style,
        temperature = query.temperature,
        matched = pick.is_some(),
        "Recommendation query"
    );

    Ok(Json(pick.into()))
}

/// Any image from the image directory (intro artwork or an outfit), embedded as a `data:` URL
pub async fn get_image(
    State(state): State<AppState>,
    PathParam(image_ref): PathParam<String>,
) -> AppResult<Json<ImageResponse>> {
    let data_url = state.images.embed(&image_ref).await?;
    Ok(Json(ImageResponse {
        image_ref,
        data_url,
    }))
}

/// Start a new wizard session
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionResponse>) {
    let session = WizardSession::new(state.bounds);
    let response = SessionResponse::from(&session);

    tracing::info!(session_id = %session.id, "Wizard session created");
    state.sessions.insert(session).await;

    (StatusCode::CREATED, Json(response))
}

/// Current view of a session, after redirecting incomplete pages
pub async fn get_session(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    with_session(&state, id, |_| Ok(())).await.map(Json)
}

/// Drop a session
pub async fn delete_session(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<StatusCode> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SessionNotFound(id))
    }
}

/// Move to the next page
pub async fn next_step(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    with_session(&state, id, |s| s.advance().map(|_| ())).await.map(Json)
}

/// Move to the previous page
pub async fn previous_step(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    with_session(&state, id, |s| {
        s.back();
        Ok(())
    })
    .await
    .map(Json)
}

/// Start over
pub async fn reset_session(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<SessionResponse>> {
    with_session(&state, id, |s| {
        s.reset();
        Ok(())
    })
    .await
    .map(Json)
}

pub async fn select_gender(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(request): JsonBody<SelectGenderRequest>,
) -> AppResult<Json<SessionResponse>> {
    with_session(&state, id, |s| s.select_gender(request.gender))
        .await
        .map(Json)
}

pub async fn select_style(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(request): JsonBody<SelectStyleRequest>,
) -> AppResult<Json<SessionResponse>> {
    with_session(&state, id, |s| s.select_style(request.style))
        .await
        .map(Json)
}

pub async fn set_temperature(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    JsonBody(request): JsonBody<SetTemperatureRequest>,
) -> AppResult<Json<SessionResponse>> {
    with_session(&state, id, |s| s.set_temperature(request.temperature))
        .await
        .map(Json)
}

/// Recommendation for a session that reached its result page
pub async fn session_result(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> AppResult<Json<SessionResultResponse>> {
    let (view, query) = state
        .sessions
        .update(id, |session| {
            session.normalize();

            let (gender, style, temperature) = session.query().ok_or(WizardError::WrongStep {
                action: "show a result",
                step: session.step,
            })?;
            Ok::<_, WizardError>((
                SessionResponse::from(&*session),
                services::Query {
                    gender,
                    style,
                    temperature,
                },
            ))
        })
        .await
        .ok_or(AppError::SessionNotFound(id))??;

    let pick = state.recommend(&query);

    let (image_data_url, image_error) = match &pick {
        Some(pick) => match state.images.embed(&pick.record.image_ref).await {
            Ok(url) => (Some(url), None),
            Err(e) => {
                tracing::warn!(session_id = %id, error = %e, "Recommended image unavailable");
                (None, Some(e.to_string()))
            }
        },
        None => {
            tracing::info!(
                session_id = %id,
                gender = %query.gender,
                style = %query.style,
                temperature = query.temperature,
                "No catalog entry matches the selection"
            );
            (None, None)
        }
    };

    Ok(Json(SessionResultResponse {
        session: view,
        recommendation: pick.into(),
        image_data_url,
        image_error,
    }))
}

/// Applies a transition to a live session and returns its new view.
///
/// Guards run before the transition so it always sees a consistent page.
/// Expired sessions are reported as not found.
async fn with_session<F>(state: &AppState, id: Uuid, transition: F) -> AppResult<SessionResponse>
where
    F: FnOnce(&mut WizardSession) -> Result<(), WizardError>,
{
    let view = state
        .sessions
        .update(id, |session| {
            if session.normalize() {
                tracing::debug!(session_id = %id, step = %session.step, "Session redirected");
            }

            let before = session.step;
            transition(session)?;
            if before != session.step {
                tracing::info!(
                    session_id = %id,
                    from = %before,
                    to = %session.step,
                    "Wizard step changed"
                );
            }

            Ok::<_, WizardError>(SessionResponse::from(&*session))
        })
        .await
        .ok_or(AppError::SessionNotFound(id))??;

    Ok(view)
}
