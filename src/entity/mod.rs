//! Database entity models for roster.
//!
//! This module contains the Sea-ORM entity definitions for the three tables
//! the application owns: `roles`, `users` and the `sessions` table backing
//! [`SeaOrmStore`](crate::SeaOrmStore).

/// Role entity: a named category assigned to zero or more users.
pub mod role;

/// Session entity model for Sea-ORM database interaction.
///
/// Contains the database schema representation and entity model for storing
/// session data.
pub mod session;

/// User entity: a submitted name with an optional role reference.
pub mod user;
