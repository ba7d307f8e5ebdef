pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use reqwest::Client;
use socketioxide::{extract::SocketRef, SocketIo};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::Config;
use crate::database::Store;
use crate::error::Result;
use crate::middleware::rate_limit::{rps_middleware, RateLimiter};
use crate::realtime::{Broadcaster, ConnectionRegistry, SocketBroadcaster};
use crate::services::{
    application_service::ApplicationService, auth_service::AuthService,
    chat_service::ChatService, coach_service::CoachService,
    interview_service::InterviewService, job_service::JobService,
    moderation_service::ModerationService, notification_service::NotificationService,
    saved_service::SavedService, storage_service::StorageService,
    translation_service::TranslationService,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub registry: ConnectionRegistry,
    pub storage: StorageService,
    pub auth_service: AuthService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub chat_service: ChatService,
    pub notification_service: NotificationService,
    pub moderation_service: ModerationService,
    pub saved_service: SavedService,
    pub interview_service: InterviewService,
    pub translation_service: TranslationService,
    pub coach_service: CoachService,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        broadcaster: Arc<dyn Broadcaster>,
        config: &Config,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let registry = ConnectionRegistry::new();
        let storage = StorageService::new(config.uploads_dir.clone());
        let notification_service =
            NotificationService::new(store.clone(), broadcaster.clone(), registry.clone());
        let chat_service = ChatService::new(
            store.clone(),
            broadcaster,
            registry.clone(),
            notification_service.clone(),
            storage.clone(),
        );
        let application_service = ApplicationService::new(
            store.clone(),
            notification_service.clone(),
            chat_service.clone(),
            storage.clone(),
        );

        Ok(Self {
            auth_service: AuthService::new(store.clone()),
            job_service: JobService::new(store.clone()),
            moderation_service: ModerationService::new(store.clone()),
            saved_service: SavedService::new(store.clone()),
            interview_service: InterviewService::new(store.clone(), notification_service.clone()),
            translation_service: TranslationService::from_config(config, http_client.clone()),
            coach_service: CoachService::from_config(config, http_client),
            application_service,
            chat_service,
            notification_service,
            registry,
            storage,
            store,
        })
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/signup", post(routes::auth::signup))
        .route("/api/login", post(routes::auth::login))
        .route("/api/profile", patch(routes::auth::update_profile))
        .route(
            "/api/jobs",
            get(routes::jobs::list_provider_jobs).post(routes::jobs::create_job),
        )
        .route("/api/all-jobs", get(routes::jobs::search_jobs))
        .route("/api/recommendations", get(routes::jobs::recommendations))
        .route("/api/jobs/:id", delete(routes::jobs::delete_job))
        .route("/api/jobs/:id/applications", get(routes::jobs::job_applications))
        .route(
            "/api/saved",
            get(routes::saved::list_saved).post(routes::saved::save_job),
        )
        .route("/api/saved/:job_id", delete(routes::saved::remove_saved))
        .route("/api/apply", post(routes::applications::apply))
        .route("/api/my-applications", get(routes::applications::my_applications))
        .route("/api/applications/:id", get(routes::applications::get_application))
        .route(
            "/api/applications/:id/select",
            patch(routes::applications::select_applicant),
        )
        .route("/api/chats", get(routes::chats::list_chats))
        .route("/api/chats/create", post(routes::chats::create_chat))
        .route(
            "/api/chats/:id/messages",
            get(routes::chats::list_messages).post(routes::chats::send_message),
        )
        .route("/api/chats/:id/read", post(routes::chats::mark_read))
        .route(
            "/api/messages/:id",
            patch(routes::chats::edit_message).delete(routes::chats::delete_message),
        )
        .route(
            "/api/block",
            post(routes::moderation::block).delete(routes::moderation::unblock),
        )
        .route("/api/block/status", get(routes::moderation::block_status))
        .route("/api/report", post(routes::moderation::report))
        .route(
            "/api/notifications",
            get(routes::notifications::list_notifications),
        )
        .route(
            "/api/notifications/:id/read",
            patch(routes::notifications::mark_read),
        )
        .route(
            "/api/notifications/mark-read",
            post(routes::notifications::mark_all_read),
        )
        .route(
            "/api/interviews",
            get(routes::interviews::list_interviews).post(routes::interviews::schedule_interview),
        )
        .route("/api/translate", post(routes::translate::translate))
        .route("/api/ai/coach", post(routes::coach::ask_coach))
}

/// Builds the HTTP router with the Socket.IO layer attached to the default
/// namespace. The returned state shares every service with the router.
pub fn build_app(store: Arc<dyn Store>, config: &Config) -> Result<(Router, AppState)> {
    let (socket_layer, io) = SocketIo::builder().build_layer();
    let state = AppState::new(store, Arc::new(SocketBroadcaster::new(io.clone())), config)?;

    io.ns("/", {
        let state = state.clone();
        move |socket: SocketRef| {
            let state = state.clone();
            async move { realtime::handlers::on_connect(socket, state).await }
        }
    });

    let api = api_routes().layer(axum::middleware::from_fn_with_state(
        RateLimiter::new(config.public_rps),
        rps_middleware,
    ));

    tracing::info!(uploads = %config.uploads_dir.display(), "serving uploads");

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .merge(api)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .with_state(state.clone())
        .layer(socket_layer)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes));

    Ok((app, state))
}
