use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, web};

use careerdesk::auth::{admin::AdminSecret, rate_limit::RateLimiter};
use careerdesk::config::AppConfig;
use careerdesk::intake::{ConversationRegistry, IntakeController, registry::spawn_sweeper};
use careerdesk::services::{AdminService, SubmissionService, TopicFilter};
use careerdesk::storage::{LocalBlobStore, PgQuestionStore, QuestionStore, blobs::FILES_MOUNT};
use careerdesk::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    // Initialize database
    let pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    // Ensure upload directory exists
    std::fs::create_dir_all(&config.upload_dir).expect("Failed to create upload directory");

    let questions: Arc<dyn QuestionStore> = Arc::new(PgQuestionStore::new(pool));
    let blobs = Arc::new(LocalBlobStore::new(&config.upload_dir, &config.public_base_url));
    let topics = TopicFilter::new(config.topic_filter);
    if config.topic_filter {
        log::info!("Career topic filter enabled");
    }

    let submissions = Arc::new(SubmissionService::new(questions.clone(), blobs, topics));
    let secret = AdminSecret::new(&config.admin_password).expect("Failed to hash admin password");
    let admin = web::Data::new(AdminService::new(questions, secret));
    let controller = web::Data::new(IntakeController::new(
        submissions.clone(),
        config.processing_step,
    ));
    let submissions = web::Data::from(submissions);

    let registry = ConversationRegistry::new();
    spawn_sweeper(registry.clone());
    let registry = web::Data::new(registry);
    let limiter = web::Data::new(RateLimiter::new());

    // Session encryption key: load from SESSION_KEY for sessions that survive restarts
    let secret_key = match config.session_key.as_deref() {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let upload_dir = config.upload_dir.clone();
    let cookie_secure = config.cookie_secure;

    log::info!("Starting server at http://{}", config.bind_addr);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(handlers::access_log())
            .app_data(controller.clone())
            .app_data(registry.clone())
            .app_data(submissions.clone())
            .app_data(admin.clone())
            .app_data(limiter.clone())
            // Static files and stored attachments
            .service(actix_files::Files::new("/static", "./static"))
            .service(actix_files::Files::new(FILES_MOUNT, upload_dir.clone()))
            .configure(handlers::configure)
            // Default 404 handler (must be registered last)
            .default_service(web::to(handlers::pages::not_found))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
