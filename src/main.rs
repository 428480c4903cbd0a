use actix_web::{web, App, HttpServer};
use toolgate::config::AppConfig;
use toolgate::middleware::request_trace::RequestTrace;
use toolgate::middleware::security_headers::SecurityHeaders;
use toolgate::middleware::session_gate::SessionGate;
use toolgate::middleware::structured_logger::StructuredLogger;
use toolgate::middleware::trace_span::TraceSpan;
use toolgate::routes;
use toolgate::state::app_state::AppState;
use toolgate::telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let host = config.host.clone();
    let port = config.port;
    println!("🚀 Starting Toolgate on http://{}:{}", host, port);

    let app_state = match AppState::from_config(config).await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ Failed to build application state: {e}");
            std::process::exit(1);
        }
    };

    println!(
        "✅ Storage ready ({})",
        if app_state.kv.is_durable() { "redis" } else { "file" }
    );

    // Wrap AppState with web::Data before passing to HttpServer
    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(SessionGate)
            .wrap(SecurityHeaders)
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
