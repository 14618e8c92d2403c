//! Endpoint handlers.
//!
//! Rendering and conversion are blocking work and run on tokio's blocking
//! pool; handlers only shuffle requests and responses.

use axum::{
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::info;

use crate::proposal::{RenderRequest, safe_filename_component};
use crate::server::{ApiError, AppState};

const PPTX_MEDIA_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Body of `POST /render_pdf_custom`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomRenderRequest {
    pub request: RenderRequest,
    /// 1-based slide numbers to drop from the rendered deck
    #[serde(default)]
    pub remove_slides: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// `POST /render`: the rendered .pptx.
pub async fn render(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> Result<Response, ApiError> {
    let renderer = state.renderer.clone();
    let replacements = req.replacements();
    let toggles = req.slide_toggles.clone();

    let deck = task::spawn_blocking(move || renderer.render(&replacements, &toggles)).await??;

    let filename = format!(
        "proposal_{}.pptx",
        safe_filename_component(&req.company_name.replace(' ', "_"))
    );
    info!(company = %req.company_name, slides = deck.report().slide_count, "rendered pptx");
    attachment(deck.into_bytes(), PPTX_MEDIA_TYPE, &filename)
}

/// `POST /render_pdf`: the rendered deck converted to PDF.
pub async fn render_pdf(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> Result<Response, ApiError> {
    let pdf = render_and_convert(&state, &req, Vec::new()).await?;
    let filename = format!(
        "proposal_eic_template_{}.pdf",
        safe_filename_component(&req.company_name)
    );
    attachment(pdf, PDF_MEDIA_TYPE, &filename)
}

/// `POST /render_pdf_custom`: like `/render_pdf`, minus chosen slides.
pub async fn render_pdf_custom(
    State(state): State<AppState>,
    Json(body): Json<CustomRenderRequest>,
) -> Result<Response, ApiError> {
    let CustomRenderRequest {
        request,
        remove_slides,
    } = body;
    let pdf = render_and_convert(&state, &request, remove_slides).await?;
    let filename = format!(
        "proposal_custom_{}.pdf",
        safe_filename_component(&request.company_name)
    );
    attachment(pdf, PDF_MEDIA_TYPE, &filename)
}

async fn render_and_convert(
    state: &AppState,
    req: &RenderRequest,
    remove_slides: Vec<i64>,
) -> Result<Vec<u8>, ApiError> {
    if !state.renderer.source().exists() {
        return Err(ApiError::TemplateNotFound);
    }

    let renderer = state.renderer.clone();
    let converter = state.converter.clone();
    let replacements = req.replacements_with_date();
    let toggles = req.slide_toggles.clone();

    let pdf = task::spawn_blocking(move || {
        let deck = renderer.render_with_removals(&replacements, &toggles, &remove_slides)?;
        deck.convert(converter.as_ref())
    })
    .await??;

    info!(company = %req.company_name, bytes = pdf.len(), "rendered pdf");
    Ok(pdf)
}

fn attachment(body: Vec<u8>, media_type: &'static str, filename: &str) -> Result<Response, ApiError> {
    let disposition = HeaderValue::from_bytes(format!("attachment; filename=\"{}\"", filename).as_bytes())
        .map_err(|e| ApiError::Internal(format!("invalid filename {:?}: {}", filename, e)))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(media_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
