//! HTTP service with Axum
//!
//! Renders proposal decks from the configured template:
//!
//! - `POST /render` returns the .pptx
//! - `POST /render_pdf` returns it converted to PDF
//! - `POST /render_pdf_custom` returns the PDF with chosen slides removed
//! - `GET /health` is a liveness probe

mod error;
mod handlers;

use anyhow::Result;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::convert::{Converter, LibreOfficeConverter};
use crate::template::{TemplateRenderer, TemplateSource};

pub use error::{ApiError, ErrorResponse};
pub use handlers::{CustomRenderRequest, HealthResponse};

/// Shared, read-only state of the service.
#[derive(Clone)]
pub struct AppState {
    pub renderer: Arc<TemplateRenderer>,
    pub converter: Arc<dyn Converter>,
}

impl AppState {
    /// Renderer over the configured template and a LibreOffice converter.
    pub fn new(config: &Config) -> Self {
        let renderer = TemplateRenderer::new(TemplateSource::path(&config.template_path));
        let converter = LibreOfficeConverter::new(&config.soffice)
            .with_timeout(config.conversion_timeout());
        Self::with_parts(renderer, Arc::new(converter))
    }

    /// State with a caller-provided renderer and converter.
    pub fn with_parts(renderer: TemplateRenderer, converter: Arc<dyn Converter>) -> Self {
        Self {
            renderer: Arc::new(renderer),
            converter,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/render", post(handlers::render))
        .route("/render_pdf", post(handlers::render_pdf))
        .route("/render_pdf_custom", post(handlers::render_pdf_custom))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl+C.
pub async fn run_server(config: &Config) -> Result<()> {
    let bind_addr = config.bind;
    let app = create_router(AppState::new(config));

    info!("Starting HTTP server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("HTTP server shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::ConversionError;
    use crate::ooxml::pptx::Package;
    use crate::ooxml::pptx::testing::{DeckBuilder, slide_texts};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Records the deck it was given and answers with a fixed PDF.
    #[derive(Default)]
    struct RecordingConverter {
        last_deck: Mutex<Option<Vec<u8>>>,
    }

    impl Converter for RecordingConverter {
        fn convert(&self, deck: &[u8]) -> Result<Vec<u8>, ConversionError> {
            if let Ok(mut last) = self.last_deck.lock() {
                *last = Some(deck.to_vec());
            }
            Ok(b"%PDF-1.7 test".to_vec())
        }
    }

    struct FailingConverter;

    impl Converter for FailingConverter {
        fn convert(&self, _deck: &[u8]) -> Result<Vec<u8>, ConversionError> {
            Err(ConversionError::Failed {
                status: "exit status: 1".to_string(),
                stderr: "no office".to_string(),
            })
        }
    }

    fn template() -> Vec<u8> {
        DeckBuilder::new()
            .slide(&["Proposal for {{COMPANY_NAME}}", "{{DATE}}"], None)
            .slide(&["Setup: {{SETUP_FEE}}"], Some("[[tag:pricing]]"))
            .slide(&["Team"], None)
            .build()
    }

    fn state_with(converter: Arc<dyn Converter>) -> AppState {
        AppState::with_parts(TemplateRenderer::new(TemplateSource::bytes(template())), converter)
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(state_with(Arc::new(RecordingConverter::default())));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_render_pptx() {
        let app = create_router(state_with(Arc::new(RecordingConverter::default())));
        let response = post_json(
            app,
            "/render",
            r#"{"company_name": "Acme Corp", "slide_toggles": {"pricing": false}}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            r#"attachment; filename="proposal_Acme_Corp.pptx""#
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        );

        let pkg = Package::from_bytes(&body_bytes(response).await).unwrap();
        // /render does not fill {{DATE}}
        assert_eq!(slide_texts(&pkg), ["Proposal for Acme Corp\n{{DATE}}", "Team"]);
    }

    #[tokio::test]
    async fn test_render_pdf() {
        let converter = Arc::new(RecordingConverter::default());
        let app = create_router(state_with(converter.clone()));
        let response = post_json(
            app,
            "/render_pdf",
            r#"{"company_name": "Acme/Corp", "proposal_date": "2025-03-05",
                "pricing_overrides": {"SETUP_FEE": 5000}}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            r#"attachment; filename="proposal_eic_template_Acme_Corp.pdf""#
        );
        assert_eq!(body_bytes(response).await, b"%PDF-1.7 test");

        let deck = converter.last_deck.lock().unwrap().clone().unwrap();
        let pkg = Package::from_bytes(&deck).unwrap();
        assert_eq!(
            slide_texts(&pkg),
            ["Proposal for Acme/Corp\nMarch 05, 2025", "Setup: 5000", "Team"]
        );
    }

    #[tokio::test]
    async fn test_render_pdf_custom_removes_slides() {
        let converter = Arc::new(RecordingConverter::default());
        let app = create_router(state_with(converter.clone()));
        let response = post_json(
            app,
            "/render_pdf_custom",
            r#"{"request": {"company_name": "Acme"}, "remove_slides": [2, 0, 7]}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            r#"attachment; filename="proposal_custom_Acme.pdf""#
        );

        let deck = converter.last_deck.lock().unwrap().clone().unwrap();
        let pkg = Package::from_bytes(&deck).unwrap();
        assert_eq!(slide_texts(&pkg), ["Proposal for Acme\n", "Team"]);
    }

    #[tokio::test]
    async fn test_conversion_failure() {
        let app = create_router(state_with(Arc::new(FailingConverter)));
        let response = post_json(app, "/render_pdf", r#"{"company_name": "Acme"}"#).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body.error, "conversion_failed");
        assert!(body.detail.contains("no office"));
    }

    #[tokio::test]
    async fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::with_parts(
            TemplateRenderer::new(TemplateSource::path(dir.path().join("missing.pptx"))),
            Arc::new(RecordingConverter::default()),
        );

        for uri in ["/render", "/render_pdf"] {
            let response = post_json(create_router(state.clone()), uri, r#"{"company_name": "Acme"}"#).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: ErrorResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
            assert_eq!(body.detail, "Template file not found.");
        }
    }

    #[tokio::test]
    async fn test_state_from_config_uses_template_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            template_path: dir.path().join("deck.pptx"),
            ..Config::default()
        };
        std::fs::write(&config.template_path, template()).unwrap();
        let state = AppState::new(&config);

        let response = post_json(create_router(state.clone()), "/render", r#"{"company_name": "Acme"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);

        std::fs::remove_file(&config.template_path).unwrap();
        let response = post_json(create_router(state), "/render", r#"{"company_name": "Acme"}"#).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_invalid_body_is_client_error() {
        let app = create_router(state_with(Arc::new(RecordingConverter::default())));
        let response = post_json(app, "/render", r#"{"contact_name": "no company"}"#).await;
        assert!(response.status().is_client_error());
    }
}
