//! # Citypress Binary
//!
//! The entry point that assembles the application based on compile-time features.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use cp_api::handlers::AppState;
use cp_api::middleware;
use cp_core::pipeline::AssetPipeline;
use cp_core::service::StoryService;
use cp_core::traits::AssetStore;
use cp_media::JpegNormalizer;
use cp_relay::{RecaptchaVerifier, ResendMailer};

// Feature-gated imports: the binary is compiled to order
#[cfg(feature = "auth-simple")]
use cp_auth_simple::ApiKeyAuth;
#[cfg(feature = "db-sqlite")]
use cp_db_sqlite::SqliteStore;
#[cfg(all(feature = "storage-local", not(feature = "storage-s3")))]
use cp_storage_local::LocalAssetStore;
#[cfg(feature = "storage-s3")]
use cp_storage_s3::S3AssetStore;

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // 1. Initialize Database Implementation
    #[cfg(feature = "db-sqlite")]
    let store = Arc::new(
        SqliteStore::connect(&env_or("DATABASE_URL", "sqlite:citypress.db"))
            .await
            .expect("Failed to init SQLite"),
    );

    // 2. Initialize Asset Storage Implementation
    #[cfg(all(feature = "storage-local", not(feature = "storage-s3")))]
    let assets: Arc<dyn AssetStore> = Arc::new(LocalAssetStore::new(
        env_or("ASSET_ROOT", "./data/assets").into(),
        env_or("ASSET_PUBLIC_BASE", "http://127.0.0.1:8080/static/assets"),
    ));

    #[cfg(feature = "storage-s3")]
    let assets: Arc<dyn AssetStore> = Arc::new(
        S3AssetStore::from_env(
            std::env::var("S3_BUCKET").expect("S3_BUCKET is required"),
            std::env::var("CDN_DOMAIN").expect("CDN_DOMAIN is required"),
        )
        .await,
    );

    // 3. Initialize Auth Implementation
    #[cfg(feature = "auth-simple")]
    let auth = Arc::new(ApiKeyAuth::new(
        &std::env::var("API_KEY").expect("API_KEY is required"),
    ));

    // 4. Wire the pipeline and shared state
    let pipeline = AssetPipeline::new(Arc::new(JpegNormalizer::new()), assets);
    let service = StoryService::new(store.clone(), pipeline);

    let contact_recipients: Vec<String> = env_or("CONTACT_RECIPIENTS", "")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let state = web::Data::new(AppState {
        stories: store.clone(),
        categories: store.clone(),
        users: store,
        service,
        auth,
        captcha: Arc::new(RecaptchaVerifier::new(env_or("RECAPTCHA_SECRET", ""))),
        mailer: Arc::new(ResendMailer::new(
            env_or("RESEND_API_KEY", ""),
            env_or("MAIL_FROM", "contact@localhost"),
        )),
        contact_recipients,
    });

    let host = env_or("HOST", "127.0.0.1");
    let port: u16 = env_or("PORT", "8080").parse().expect("PORT must be a number");
    log::info!("citypress listening on http://{host}:{port}");

    HttpServer::new(move || {
        let app = App::new()
            .wrap(middleware::cors_policy())
            .wrap(middleware::standard_middleware())
            .app_data(state.clone())
            .configure(cp_api::configure_routes);

        // The local store needs the web server to expose its root directory.
        #[cfg(all(feature = "storage-local", not(feature = "storage-s3")))]
        let app = app.service(actix_files::Files::new(
            "/static/assets",
            env_or("ASSET_ROOT", "./data/assets"),
        ));

        app
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
