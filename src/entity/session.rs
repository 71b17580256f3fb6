//! Session entity model for Sea-ORM database interaction.
//!
//! This module defines the database schema representation for session storage.
//! It provides the Sea-ORM entity definition that maps to the `sessions` table.

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing a stored session.
///
/// # Database Schema
///
/// | Column      | Type                    | Description                       |
/// |-------------|-------------------------|-----------------------------------|
/// | id          | TEXT (Primary Key)      | Session ID                        |
/// | data        | BLOB                    | MessagePack session record        |
/// | expiry_date | TIMESTAMP WITH TZ       | Session expiration timestamp      |
///
/// This entity is used by [`SeaOrmStore`](crate::SeaOrmStore); handlers go
/// through `tower_sessions::Session` instead of touching it directly.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// The `tower_sessions::session::Id` rendered as a string.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,

    /// The MessagePack-serialized `tower_sessions::session::Record`.
    pub data: Vec<u8>,

    /// Sessions past this instant are never loaded and are removed by
    /// `delete_expired`.
    pub expiry_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
