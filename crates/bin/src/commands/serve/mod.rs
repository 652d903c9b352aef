//! Serve command - runs the ctfweb web server.

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use tokio::signal::unix::{SignalKind, signal};
use tower_cookies::{Cookie, CookieManagerLayer, Cookies};
use tracing_subscriber::EnvFilter;

use ctfweb::{
    CommentRenderer, Fetcher, FlagVerifier, RenderContext, Store, TargetServer,
    constants::{TARGET_HOST, USERS_FILE},
};

use crate::cli::{ServeArgs, Variant};
use crate::templates::{self, ProfileView};


const SESSION_COOKIE: &str = "session_id";
const LOGIN_COOKIE: &str = "login";
const PASSWORD_COOKIE: &str = "password";

/// Characters escaped in the plaintext credential cookies
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Shared application state
#[derive(Clone)]
pub(crate) struct AppState {
    store: Arc<Store>,
    renderer: Arc<CommentRenderer>,
    flags: Arc<FlagVerifier>,
    fetcher: Fetcher,
    variant: Variant,
}

impl AppState {
    pub(crate) fn new(store: Store, variant: Variant) -> ctfweb::Result<Self> {
        Ok(Self {
            store: Arc::new(store),
            renderer: Arc::new(CommentRenderer::new()),
            flags: Arc::new(FlagVerifier::default()),
            fetcher: Fetcher::new()?,
            variant,
        })
    }

    /// Absolute path of an SSTI route under this variant's mount point
    fn link(&self, path: &str) -> String {
        format!("{}{path}", self.variant.ssti_prefix())
    }

    fn profile_link(&self, username: &str) -> String {
        self.link(&format!("/user/{}", templates::path_segment(username)))
    }

    /// Username behind the request's session cookie, if it is still valid
    async fn current_user(&self, cookies: &Cookies) -> Option<String> {
        let cookie = cookies.get(SESSION_COOKIE)?;
        self.store.current_user(cookie.value()).await
    }
}

/// Username/password form used by both login and registration
#[derive(Deserialize)]
struct CredentialsForm {
    username: String,
    password: String,
}

/// Flag submission form
#[derive(Deserialize)]
struct FlagForm {
    flag: String,
}

/// URL fetcher form
#[derive(Deserialize)]
struct FetchForm {
    url: String,
}

/// Query parameters of the flags page
#[derive(Deserialize)]
struct FlagsQuery {
    result: Option<String>,
}

/// JSON body of a comment submission
#[derive(Deserialize)]
struct CommentPayload {
    #[serde(default)]
    text: String,
}

/// JSON reply to a comment submission
#[derive(Serialize)]
struct CommentResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

/// Build the router for the configured variant
pub(crate) fn router(state: AppState) -> Router {
    let ssti = Router::new()
        .route("/", get(handle_ssti_root))
        .route(
            "/register",
            get(handle_register_page).post(handle_register_submit),
        )
        .route("/login", get(handle_login_page).post(handle_login_submit))
        .route("/user/{username}", get(handle_profile))
        .route("/comment/{username}", post(handle_comment))
        .route("/logout", post(handle_logout));

    let app = match state.variant {
        Variant::Multi => Router::new()
            .route("/", get(handle_landing))
            .route("/flags", get(handle_flags_page).post(handle_flags_submit))
            .route("/ssrf", get(handle_ssrf_page))
            .route("/ssrf/fetch", post(handle_ssrf_fetch))
            .nest("/ssti", ssti),
        Variant::Ssti => ssti,
    };

    app.route("/health", get(handle_health_endpoint))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

/// Run the ctfweb server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("ctfweb=info".parse()?))
        .init();

    let data_dir = args.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    tokio::fs::create_dir_all(&data_dir).await?;
    let store = Store::open(data_dir.join(USERS_FILE)).await?;
    let users_file = store
        .path()
        .map(|path| path.display().to_string())
        .unwrap_or_default();

    // The SSRF target only makes sense next to the fetcher
    let mut target = if args.variant == Variant::Multi && !args.no_target {
        let target_addr: SocketAddr = format!("{TARGET_HOST}:{}", args.target_port).parse()?;
        Some(TargetServer::start(target_addr).await?)
    } else {
        None
    };

    let app_state = AppState::new(store, args.variant)?;
    let app = router(app_state.clone());

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    let base = args.variant.ssti_prefix();
    println!(
        "ctfweb ({}) starting on http://localhost:{}",
        args.variant.label(),
        local_addr.port()
    );
    println!("User table: {users_file}");
    if let Some(target) = &target {
        println!("SSRF target listening on {}", target.address());
    }
    println!();
    println!("Available endpoints:");
    if args.variant == Variant::Multi {
        println!("  GET  /                    - Landing page");
        println!("  GET  /flags               - Flag submission");
        println!("  GET  /ssrf                - URL fetcher");
        println!("  POST /ssrf/fetch          - Fetch a URL");
    }
    println!("  GET  {base}/                - Redirect to profile or login");
    println!("  GET  {base}/register        - Registration");
    println!("  GET  {base}/login           - Login");
    println!("  GET  {base}/user/{{name}}     - Profile with comments");
    println!("  POST {base}/comment/{{name}}  - Leave a comment (JSON)");
    println!("  POST {base}/logout          - Logout");
    println!("  GET  /health              - Health check");
    println!();
    println!("Press Ctrl+C to shutdown");

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;

            if let Some(target) = target.as_mut() {
                target.stop();
            }

            match app_state.store.save().await {
                Ok(()) => tracing::info!("User table saved"),
                Err(e) => tracing::error!("Failed to save user table: {e}"),
            }
        })
        .await?;

    println!("Server shut down");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
async fn shutdown_signal() {
    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
            _ => {
                tracing::warn!("Failed to install signal handlers, falling back to Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
    }
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_path("/");
    cookie
}

/// Cookie carrying a submitted credential, percent-encoded so that `;`,
/// spaces and quotes survive the round trip through the browser
fn credential_cookie(name: &'static str, value: &str) -> Cookie<'static> {
    session_cookie(name, utf8_percent_encode(value, COOKIE_VALUE).to_string())
}

// ============================================================================
// Common Pages
// ============================================================================

/// Handler for GET / - Landing page of the combined app
async fn handle_landing() -> Html<String> {
    Html(templates::landing_page())
}

/// Handler for GET /flags - Flag submission page
async fn handle_flags_page(Query(query): Query<FlagsQuery>) -> Html<String> {
    Html(templates::flags_page(query.result.as_deref()))
}

/// Handler for POST /flags - Check a submitted flag
async fn handle_flags_submit(
    State(state): State<AppState>,
    Form(form): Form<FlagForm>,
) -> Html<String> {
    let result = state.flags.result_message(&form.flag);
    tracing::info!("Flag submitted: {result}");
    Html(templates::flags_page(Some(&result)))
}

/// Handler for GET /health - Health check endpoint
async fn handle_health_endpoint(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "variant": state.variant.label(),
        "users": state.store.user_count().await,
        "sessions": state.store.sessions().session_count().await,
    }))
}

// ============================================================================
// SSRF Handlers
// ============================================================================

/// Handler for GET /ssrf - URL fetcher form
async fn handle_ssrf_page() -> Html<String> {
    Html(templates::ssrf_page())
}

/// Handler for POST /ssrf/fetch - Fetch any URL and show the body
async fn handle_ssrf_fetch(State(state): State<AppState>, Form(form): Form<FetchForm>) -> Response {
    match state.fetcher.fetch(&form.url).await {
        Ok(response) => Html(templates::ssrf_result_page(&form.url, &response.body)).into_response(),
        Err(e) => {
            let url = match &e { ctfweb::Error::Fetch(fetch_err) => fetch_err.url(), _ => None };
            tracing::info!(url = ?url, "Fetch failed: {e}");
            (StatusCode::BAD_REQUEST, format!("Error fetching URL: {e}")).into_response()
        }
    }
}

// ============================================================================
// SSTI Authentication Handlers
// ============================================================================

/// Handler for GET {prefix}/ - Redirect to own profile or to login
async fn handle_ssti_root(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    match state.current_user(&cookies).await {
        Some(username) => Redirect::to(&state.profile_link(&username)),
        None => Redirect::to(&state.link("/login")),
    }
}

/// Handler for GET {prefix}/register - Show registration page
async fn handle_register_page(State(state): State<AppState>) -> Html<String> {
    Html(templates::register_page(state.variant.ssti_prefix()))
}

/// Handler for POST {prefix}/register - Process registration
async fn handle_register_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match state.store.register(&form.username, &form.password).await {
        Ok(token) => {
            cookies.add(session_cookie(SESSION_COOKIE, token));
            Redirect::to(&state.link("/login")).into_response()
        }
        Err(e) if e.is_conflict() => {
            (StatusCode::BAD_REQUEST, Html("Username already exists")).into_response()
        }
        Err(e) => {
            tracing::error!("Registration failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Registration failed: {e}"),
            )
                .into_response()
        }
    }
}

/// Handler for GET {prefix}/login - Show login page
async fn handle_login_page(State(state): State<AppState>) -> Html<String> {
    Html(templates::login_page(state.variant.ssti_prefix(), None))
}

/// Handler for POST {prefix}/login - Process login
///
/// Echoes the submitted credentials back as `login` and `password` cookies.
async fn handle_login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<CredentialsForm>,
) -> Response {
    match state.store.login(&form.username, &form.password).await {
        Ok(grant) => {
            let location = state.profile_link(&grant.username);
            cookies.add(session_cookie(SESSION_COOKIE, grant.token));
            cookies.add(credential_cookie(LOGIN_COOKIE, &grant.username));
            cookies.add(credential_cookie(PASSWORD_COOKIE, &grant.password));
            Redirect::to(&location).into_response()
        }
        Err(e) if e.is_authentication_error() => (
            StatusCode::UNAUTHORIZED,
            Html(templates::login_page(
                state.variant.ssti_prefix(),
                Some("Invalid username or password"),
            )),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Login failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Login failed: {e}")).into_response()
        }
    }
}

/// Handler for POST {prefix}/logout - Logout and destroy session
async fn handle_logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        state.store.logout(cookie.value()).await;
    }
    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    cookies.remove(removal);
    Redirect::to(&state.link("/login"))
}

// ============================================================================
// SSTI Profile Handlers
// ============================================================================

/// Handler for GET {prefix}/user/{username} - Profile with rendered comments
async fn handle_profile(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(profile_username): Path<String>,
) -> Response {
    let Some(current_user) = state.current_user(&cookies).await else {
        return Redirect::to(&state.link("/login")).into_response();
    };

    let users = state.store.snapshot().await;
    let Some(profile) = users.get(&profile_username) else {
        return (StatusCode::NOT_FOUND, Html("User not found")).into_response();
    };

    let ctx = RenderContext {
        current_user: &current_user,
        users: &users,
        secret_key: state.variant.ssti_secret(),
    };
    let comments = state.renderer.render_all(&profile.comments, &ctx);

    let view = ProfileView {
        can_comment: profile_username != current_user,
        user_list: users.usernames(),
        comments,
        current_user,
        profile_username,
    };
    Html(templates::profile_page(state.variant.ssti_prefix(), &view)).into_response()
}

/// Handler for POST {prefix}/comment/{username} - Leave a comment
///
/// An unreadable body is treated as an empty comment.
async fn handle_comment(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(target): Path<String>,
    payload: Result<Json<CommentPayload>, JsonRejection>,
) -> Json<CommentResponse> {
    let current_user = state.current_user(&cookies).await;
    let text = match payload {
        Ok(Json(payload)) => payload.text,
        Err(rejection) => {
            tracing::debug!("Unreadable comment body: {rejection}");
            String::new()
        }
    };

    match state
        .store
        .add_comment(current_user.as_deref(), &target, &text)
        .await
    {
        Ok(()) => Json(CommentResponse {
            status: "ok",
            message: None,
        }),
        Err(e) => {
            if e.is_comment_rejected() {
                tracing::debug!("Comment rejected: {e}");
            } else {
                tracing::error!("Failed to store comment: {e}");
            }
            Json(CommentResponse {
                status: "error",
                message: Some("Cannot comment"),
            })
        }
    }
}
