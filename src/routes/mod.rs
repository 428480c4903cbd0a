use actix_web::web;

pub mod auth;
pub mod billing;
pub mod comments;
pub mod downloads;
pub mod health;
pub mod pages;
pub mod profile;
pub mod tools;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes)
        .configure(auth::configure_routes)
        .configure(billing::configure_routes)
        .configure(profile::configure_routes)
        .configure(comments::configure_routes)
        .configure(tools::configure_routes)
        .configure(downloads::configure_routes)
        .configure(pages::configure_routes);
}
