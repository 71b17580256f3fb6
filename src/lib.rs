//! # Roster
//!
//! A sign-in form that asks for a name and a role, remembers both in a
//! SQLite database through [Sea-ORM](https://crates.io/crates/sea-orm), and
//! lists everyone who has signed in so far.
//!
//! Session state (the last submitted name and whether it was already known)
//! lives in [`tower-sessions`](https://crates.io/crates/tower-sessions) backed
//! by [`SeaOrmStore`], which keeps the records in the same database.
//!
//! ## Quick Start
//!
//! ```no_run
//! use roster::{app, settings::Settings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::new()?;
//! let listener = tokio::net::TcpListener::bind(settings.server.bind).await?;
//! let ctx = app::AppContext::connect(settings).await?;
//! app::serve(ctx, listener).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Routes
//!
//! - `GET /` renders the form, the user list and the role list.
//! - `POST /` validates the form, creates the user (and its role) if the name
//!   is new, stores the name in the session and redirects to `/`.
//! - Anything else answers 404.

pub mod app;
pub mod db;
pub mod entity;
pub mod error;
pub mod form;
pub mod migration;
pub mod queries;
mod session_store;
pub mod settings;
pub mod view;

/// Sea-ORM backed store for `tower-sessions`.
///
/// See [`SeaOrmStore`] documentation for usage details.
pub use session_store::SeaOrmStore;

/// Trait for session store expiration cleanup, implemented by [`SeaOrmStore`].
pub use tower_sessions::ExpiredDeletion;
