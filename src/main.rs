use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use researchable::config::{has_flag, ServerConfig, ServiceConfig, USAGE};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{USAGE}");
        return Ok(());
    }

    // Init logging
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let server = ServerConfig::from_args_and_env(&args);
    let service = ServiceConfig::from_env();
    info!(
        target: "startup",
        "Researchable starting: RUST_LOG='{}', address={}, supabase_configured={}",
        rust_log,
        server.address(),
        service.is_configured()
    );

    researchable::server::run(server, service).await
}
