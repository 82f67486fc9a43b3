use panelview::config::ServerConfig;
use panelview::error::{ConfigError, ErrorCode};
use panelview::page::decl::PagesFile;
use panelview::registry::Registry;
use panelview::routes;
use panelview::state::AppState;
use panelview::template::TemplateStore;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();

    let mut templates = TemplateStore::new(config.static_url.clone(), config.media_url.clone());
    let loaded = templates.load_dir(&config.template_dir).expect("template load failed");
    tracing::info!(dir = %config.template_dir.display(), templates = loaded, "templates loaded");

    let pages = match load_pages(&config) {
        Ok(pages) => pages,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, file = %config.pages_file.display(), "page configuration invalid");
            std::process::exit(1);
        }
    };
    tracing::info!(pages = pages.len(), "pages configured");

    let state = AppState::new(pages, templates, config.accept_hx);
    let app = match routes::app(state, &config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(code = e.error_code(), error = %e, "page routes invalid");
            std::process::exit(1);
        }
    };
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, "panelview listening");
    axum::serve(listener, app).await.expect("server failed");
}

fn load_pages(config: &ServerConfig) -> Result<Vec<panelview::page::PageDefinition>, ConfigError> {
    let mut registry = Registry::with_builtins();
    PagesFile::load(&config.pages_file)?.build(&mut registry)
}
