mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::middleware::AuthState;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::audit_logs::{routes as audit_logs_routes, AuditLogService};
use crate::features::auth;
use crate::features::auth::routes as auth_routes;
use crate::features::comments::{routes as comments_routes, CommentService};
use crate::features::complaints::{
    routes as complaints_routes, ComplaintImageService, ComplaintService,
};
use crate::features::dashboard::{routes as dashboard_routes, DashboardService};
use crate::features::feedback::{routes as feedback_routes, FeedbackService};
use crate::features::notifications::{routes as notifications_routes, NotificationService};
use crate::features::profiles::{routes as profiles_routes, ProfileService};
use crate::features::realtime::{routes as realtime_routes, ChangeFeed, RealtimeState};
use crate::features::triage::services::{
    Categorizer, LocalCategorizer, PgPredictionStore, RemoteCategorizer,
};
use crate::features::triage::{routes as triage_routes, TriageDispatcher, TriageService};
use crate::features::whatsapp::{
    routes as whatsapp_routes, DeskIntake, GraphApiClient, WhatsAppService,
};
use crate::modules::storage::{ObjectStore, S3ObjectStore};
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Initialize auth
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.issuer,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.jwt_leeway,
    ));
    tracing::info!("Auth configuration initialized");

    // Change feed shared by every service that mutates complaint data
    let feed = Arc::new(ChangeFeed::default());

    let profile_service = Arc::new(ProfileService::new(pool.clone(), Arc::clone(&feed)));
    let audit_log_service = Arc::new(AuditLogService::new(pool.clone()));
    let notification_service =
        Arc::new(NotificationService::new(pool.clone(), Arc::clone(&feed)));
    let comment_service = Arc::new(CommentService::new(pool.clone(), Arc::clone(&feed)));
    let feedback_service = Arc::new(FeedbackService::new(pool.clone(), Arc::clone(&feed)));
    let dashboard_service = Arc::new(DashboardService::new(pool.clone()));
    tracing::info!("Profile, notification, comment, feedback and dashboard services initialized");

    // Initialize object storage for complaint images
    let object_store: Arc<dyn ObjectStore> = Arc::new(
        S3ObjectStore::new(config.storage.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize object storage: {}", e))?,
    );
    tracing::info!(
        "Object storage initialized for bucket: {}",
        config.storage.bucket
    );

    // Initialize triage: the function endpoint plus the post-insert dispatcher
    let prediction_store = Arc::new(PgPredictionStore::new(pool.clone(), Arc::clone(&feed)));
    let triage_service = Arc::new(TriageService::new(prediction_store, &config.triage));
    let categorizer: Arc<dyn Categorizer> = match &config.triage.function_url {
        Some(url) => {
            tracing::info!("Complaints will be categorized by remote function at {}", url);
            Arc::new(RemoteCategorizer::new(url.clone()))
        }
        None => {
            tracing::info!("Complaints will be categorized in-process");
            Arc::new(LocalCategorizer::new(Arc::clone(&triage_service)))
        }
    };
    let dispatcher = Arc::new(TriageDispatcher::new(categorizer, config.triage.timeout));
    tracing::info!(
        "Triage initialized (timeout: {:?}, persist attempts: {})",
        config.triage.timeout,
        config.triage.persist_max_attempts
    );

    let complaint_service = Arc::new(ComplaintService::new(
        pool.clone(),
        Arc::clone(&feed),
        dispatcher,
    ));
    let image_service = Arc::new(ComplaintImageService::new(
        pool.clone(),
        object_store,
        Arc::clone(&feed),
    ));
    tracing::info!("Complaint services initialized");

    // WhatsApp channel, only when configured
    let whatsapp_service = match &config.whatsapp {
        Some(whatsapp) => {
            let intake = Arc::new(DeskIntake::new(
                Arc::clone(&profile_service),
                Arc::clone(&complaint_service),
                Arc::clone(&image_service),
            ));
            if whatsapp.app_secret.is_none() {
                tracing::warn!("WHATSAPP_APP_SECRET not set, webhook signatures are not checked");
            }
            tracing::info!(
                "WhatsApp channel enabled for phone number id {}",
                whatsapp.phone_number_id
            );
            Some(Arc::new(WhatsAppService::new(
                whatsapp.verify_token.clone(),
                whatsapp.app_secret.clone(),
                Arc::new(GraphApiClient::new(whatsapp)),
                intake,
            )))
        }
        None => {
            tracing::info!("WhatsApp channel disabled (WHATSAPP_VERIFY_TOKEN not set)");
            None
        }
    };

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let auth_state = AuthState {
        validator: jwt_validator,
        profiles: Arc::clone(&profile_service),
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes())
        .merge(profiles_routes::routes(profile_service))
        .merge(complaints_routes::routes(complaint_service, image_service))
        .merge(comments_routes::routes(comment_service))
        .merge(feedback_routes::routes(feedback_service))
        .merge(notifications_routes::routes(notification_service))
        .merge(audit_logs_routes::routes(audit_log_service))
        .merge(realtime_routes::routes(RealtimeState::new(
            Arc::clone(&feed),
            pool.clone(),
        )))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let mut public_routes =
        Router::new().merge(dashboard_routes::routes(Arc::clone(&dashboard_service)));
    if let Some(service) = whatsapp_service {
        public_routes = public_routes.merge(whatsapp_routes::routes(service));
    }

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // The categorize function answers CORS itself, for any origin
        .merge(triage_routes::routes(triage_service))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
