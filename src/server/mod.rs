//! Live server: renders every page on request, with optional live reload

use anyhow::{anyhow, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    handler::Handler,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::generator::STATIC_PREFIX;
use crate::model::{PageAssembler, PageModel};
use crate::templates::RenderAdapter;
use crate::Folio;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
pub struct ServerState {
    assembler: PageAssembler,
    renderer: RwLock<Box<dyn RenderAdapter>>,
    static_dir: PathBuf,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl ServerState {
    pub fn new(
        assembler: PageAssembler,
        renderer: Box<dyn RenderAdapter>,
        static_dir: PathBuf,
        live_reload: bool,
    ) -> Self {
        let (reload_tx, _) = broadcast::channel::<()>(16);
        Self {
            assembler,
            renderer: RwLock::new(renderer),
            static_dir,
            reload_tx,
            live_reload,
        }
    }

    /// Swap the renderer, e.g. after template overrides changed
    pub fn replace_renderer(&self, renderer: Box<dyn RenderAdapter>) -> Result<()> {
        let mut guard = self
            .renderer
            .write()
            .map_err(|_| anyhow!("Renderer lock poisoned"))?;
        *guard = renderer;
        Ok(())
    }

    /// Tell connected browsers to reload
    pub fn notify_reload(&self) {
        // No receivers just means no browser is connected
        let _ = self.reload_tx.send(());
    }

    fn render_page(&self, page: &PageModel<'_>, status: StatusCode) -> Response {
        let rendered = self
            .renderer
            .read()
            .map_err(|_| anyhow!("Renderer lock poisoned"))
            .and_then(|renderer| renderer.render(page.kind(), &page.to_context()));

        match rendered {
            Ok(html) => {
                let html = if self.live_reload {
                    inject_live_reload(&html)
                } else {
                    html
                };
                (status, Html(html)).into_response()
            }
            Err(e) => {
                tracing::error!("Failed to render {}: {:#}", page.kind().template_name(), e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

/// Build the router for a server state
pub fn router(state: Arc<ServerState>) -> Router {
    // Missing assets get the same 404 page as unknown routes
    let static_files = ServeDir::new(&state.static_dir)
        .not_found_service(not_found_handler.with_state(Arc::clone(&state)));

    Router::new()
        .route("/", get(index_handler))
        .route("/project/:id", get(project_handler))
        .route("/__livereload", get(livereload_handler))
        .nest_service(&format!("/{}", STATIC_PREFIX), static_files)
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the live server
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let renderer = folio.renderer()?;
    let state = Arc::new(ServerState::new(
        folio.assembler(),
        Box::new(renderer),
        folio.static_dir.clone(),
        watch,
    ));

    if !folio.static_dir.is_dir() {
        tracing::warn!("Static directory not found: {:?}", folio.static_dir);
    }

    let app = router(Arc::clone(&state));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    if watch {
        let folio = folio.clone();
        let state = Arc::clone(&state);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(&folio, &state) {
                tracing::error!("File watcher error: {:#}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch the site sources and push reloads to the browser
fn watch_and_reload(folio: &Folio, state: &ServerState) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    // Data and config are read once at startup; only directories are live
    for dir in folio.watched_paths().into_iter().filter(|p| p.is_dir()) {
        debouncer.watcher().watch(&dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", dir);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".git")
                            && !path_str.contains(".DS_Store")
                            && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    tracing::info!("File changed: {}", event.path.display());
                }

                if folio.config.templates_dir.is_some() {
                    match folio.renderer() {
                        Ok(renderer) => state.replace_renderer(Box::new(renderer))?,
                        Err(e) => {
                            tracing::error!("Template reload failed: {:#}", e);
                            continue;
                        }
                    }
                }

                state.notify_reload();
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Response {
    let page = PageModel::Home(state.assembler.build_home_model());
    state.render_page(&page, StatusCode::OK)
}

async fn project_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Response {
    let lookup = Arc::clone(&state);
    let detail =
        tokio::task::spawn_blocking(move || lookup.assembler.build_project_model(&id)).await;

    match detail {
        Ok(Some(detail)) => state.render_page(&PageModel::Project(detail), StatusCode::OK),
        Ok(None) => state.render_page(&PageModel::NotFound, StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Project lookup failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

async fn not_found_handler(State(state): State<Arc<ServerState>>) -> Response {
    state.render_page(&PageModel::NotFound, StatusCode::NOT_FOUND)
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", LIVE_RELOAD_SCRIPT, 1)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
