//! # cp-api
//!
//! The web routing and orchestration layer for Citypress.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;

use actix_web::web;

/// Configures the routes for the publishing API.
///
/// # Developer Note
/// We use scoped configuration to allow the main binary to mount
/// the API under different paths if needed (e.g., /api/v1/).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stories")
            .route("", web::get().to(handlers::story::get_stories))
            .route("", web::post().to(handlers::story::create_story))
            .route("/hidden", web::get().to(handlers::story::get_hidden_stories))
            .route("/radar", web::get().to(handlers::radar::get_radar_story))
            .route("/radar/{id}", web::patch().to(handlers::radar::set_radar_story))
            .route(
                "/recommended",
                web::get().to(handlers::recommendation::get_recommendations),
            )
            .route("/saved/{user_id}", web::get().to(handlers::save::get_saved_stories))
            .route("/save", web::post().to(handlers::save::create_save))
            .route("/save", web::delete().to(handlers::save::delete_save))
            .route("/s/{id}", web::get().to(handlers::story::get_story))
            .route(
                "/republish/{id}",
                web::patch().to(handlers::story::republish_story),
            )
            .route(
                "/unpublish/{id}",
                web::patch().to(handlers::story::unpublish_story),
            )
            .route(
                "/{id}/recommend",
                web::patch().to(handlers::recommendation::add_recommendation),
            )
            .route(
                "/{id}/recommend",
                web::delete().to(handlers::recommendation::remove_recommendation),
            )
            .route("/{id}", web::patch().to(handlers::story::edit_story))
            .route("/{id}", web::delete().to(handlers::story::delete_story)),
    )
    .service(
        web::scope("/categories")
            .route("", web::get().to(handlers::category::get_categories))
            .route(
                "/active",
                web::get().to(handlers::category::get_active_categories),
            )
            .route("", web::post().to(handlers::category::create_category))
            .route("/{id}", web::patch().to(handlers::category::edit_category))
            .route("/{id}", web::delete().to(handlers::category::delete_category)),
    )
    .service(
        web::scope("/user")
            .route("", web::post().to(handlers::user::create_user))
            .route("/subscribe", web::post().to(handlers::user::create_subscriber))
            .route("/{id}", web::get().to(handlers::user::get_user))
            .route("/{id}", web::patch().to(handlers::user::update_user)),
    )
    .route("/contact", web::post().to(handlers::contact::handle_contact));
}
