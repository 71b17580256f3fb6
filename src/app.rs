//! The HTTP surface: one page at `/`, a static 404 for everything else.

use std::{any::Any, sync::Arc};

use axum::{
    body::HttpBody,
    extract::State,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use sea_orm::{DatabaseConnection, DbErr};
use time::Duration;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tower_sessions::{Expiry, Session, SessionManagerLayer};

use crate::{
    db,
    error::{self, AppError},
    form::{self, FieldError, NameForm},
    queries,
    settings::Settings,
    view, SeaOrmStore,
};

/// Session key holding the last submitted name.
pub const NAME_KEY: &str = "name";
/// Session key telling whether that name was already stored.
pub const KNOWN_KEY: &str = "known";

/// State handed to every handler: the loaded settings and the connection pool.
///
/// Built once in `main` and cloned into each request.
#[derive(Clone)]
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub db: DatabaseConnection,
}

impl AppContext {
    /// Wraps an already migrated connection.
    pub fn new(settings: Settings, db: DatabaseConnection) -> Self {
        Self {
            settings: Arc::new(settings),
            db,
        }
    }

    /// Connects to `database.url` and runs migrations.
    pub async fn connect(settings: Settings) -> Result<Self, DbErr> {
        let db = db::connect(&settings.database.url, settings.database.max_connections).await?;
        Ok(Self::new(settings, db))
    }
}

/// The application router: `GET /` and `POST /`, a 404 fallback, and the
/// layers from [`with_layers`].
pub fn router(ctx: AppContext) -> Router {
    let routes = Router::new()
        .route("/", get(index).post(submit))
        .fallback(error::not_found);

    with_layers(routes, ctx)
}

/// Attaches state, sessions, request tracing and the 500 page handling to
/// `routes`.
///
/// Failures raised outside the handlers (a panic, or the session layer failing
/// to persist the session after the handler returned) still end on the static
/// 500 page.
pub fn with_layers(routes: Router<AppContext>, ctx: AppContext) -> Router {
    let session_layer = SessionManagerLayer::new(SeaOrmStore::new(ctx.db.clone()))
        .with_secure(ctx.settings.session.secure)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            ctx.settings.session.inactivity_hours,
        )));

    routes
        .with_state(ctx)
        .layer(session_layer)
        .layer(middleware::map_response(render_bare_server_error))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

/// Serves [`router`] on `listener` until the server stops.
pub async fn serve(ctx: AppContext, listener: TcpListener) -> Result<(), std::io::Error> {
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(ctx)).await
}

async fn index(State(ctx): State<AppContext>, session: Session) -> Result<Html<String>, AppError> {
    render(&ctx, &session, &NameForm::default(), &[]).await
}

async fn submit(
    State(ctx): State<AppContext>,
    session: Session,
    Form(input): Form<NameForm>,
) -> Result<Response, AppError> {
    let valid = match form::validate(&input) {
        Ok(valid) => valid,
        Err(errors) => {
            tracing::debug!(?errors, "rejected submission");
            return Ok(render(&ctx, &session, &input, &errors)
                .await?
                .into_response());
        }
    };

    let registration =
        queries::register(&ctx.db, &valid.name, &valid.role.role_name()).await?;

    session.insert(KNOWN_KEY, registration.is_known()).await?;
    session.insert(NAME_KEY, &valid.name).await?;

    Ok(Redirect::to("/").into_response())
}

async fn render(
    ctx: &AppContext,
    session: &Session,
    input: &NameForm,
    errors: &[FieldError],
) -> Result<Html<String>, AppError> {
    let name: Option<String> = session.get(NAME_KEY).await?;
    let known: bool = session.get(KNOWN_KEY).await?.unwrap_or(false);

    let users = queries::all_users(&ctx.db).await?;
    let user_count = queries::count_users(&ctx.db).await?;
    let roles = queries::all_roles(&ctx.db).await?;
    let role_count = queries::count_roles(&ctx.db).await?;

    let mut roles_with_users = Vec::with_capacity(roles.len());
    for role in roles {
        let members = queries::users_for_role(&ctx.db, role.id).await?;
        roles_with_users.push((role, members));
    }

    Ok(view::index(&view::IndexPage {
        name: name.as_deref(),
        known,
        form: input,
        errors,
        users: &users,
        user_count,
        roles: &roles_with_users,
        role_count,
    }))
}

/// The session layer answers a failed session write with an empty 500.
async fn render_bare_server_error(response: Response) -> Response {
    if response.status() == StatusCode::INTERNAL_SERVER_ERROR
        && response.body().size_hint().exact() == Some(0)
    {
        tracing::error!("session could not be saved");
        return view::internal_server_error();
    }
    response
}

fn panic_response(_: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("handler panicked");
    view::internal_server_error()
}
