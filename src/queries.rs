//! Role and user accessors shared by the web handlers and the admin shell.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entity::{role, user};

/// What [`register`] did with a submitted name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// A user with this name already existed and was left untouched.
    Known(user::Model),
    /// A new user row was inserted.
    Created(user::Model),
}

impl Registration {
    /// True when the name was already stored before this submission.
    pub fn is_known(&self) -> bool {
        matches!(self, Registration::Known(_))
    }
}

/// Looks a user up by exact, case-sensitive username.
pub async fn find_user_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
}

/// Looks a role up by exact name (roles are stored capitalized).
pub async fn find_role_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<role::Model>, DbErr> {
    role::Entity::find()
        .filter(role::Column::Name.eq(name))
        .one(db)
        .await
}

/// Returns the role called `name`, inserting it first if needed.
pub async fn find_or_create_role<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<role::Model, DbErr> {
    if let Some(role) = find_role_by_name(db, name).await? {
        return Ok(role);
    }

    let role = role::ActiveModel {
        name: Set(name.to_owned()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::info!(role = %role.name, id = role.id, "created role");

    Ok(role)
}

/// Find-or-create for a submitted name.
///
/// An existing user keeps the role it was created with, whatever `role_name`
/// says now. Two concurrent calls for the same new name both try to insert;
/// the unique constraint makes the second one fail with a [`DbErr`].
pub async fn register<C: ConnectionTrait>(
    db: &C,
    username: &str,
    role_name: &str,
) -> Result<Registration, DbErr> {
    if let Some(user) = find_user_by_username(db, username).await? {
        tracing::debug!(username, "user already known");
        return Ok(Registration::Known(user));
    }

    let role = find_or_create_role(db, role_name).await?;
    let user = user::ActiveModel {
        username: Set(username.to_owned()),
        role_id: Set(Some(role.id)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    tracing::info!(username, role = %role.name, id = user.id, "created user");

    Ok(Registration::Created(user))
}

/// Every user, in primary-key order.
pub async fn all_users<C: ConnectionTrait>(db: &C) -> Result<Vec<user::Model>, DbErr> {
    user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
}

/// Number of rows in `users`.
pub async fn count_users<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
    user::Entity::find().count(db).await
}

/// Every role, in primary-key order.
pub async fn all_roles<C: ConnectionTrait>(db: &C) -> Result<Vec<role::Model>, DbErr> {
    role::Entity::find()
        .order_by_asc(role::Column::Id)
        .all(db)
        .await
}

/// Number of rows in `roles`.
pub async fn count_roles<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
    role::Entity::find().count(db).await
}

/// Users whose `role_id` points at `role_id`, in insertion order.
pub async fn users_for_role<C: ConnectionTrait>(
    db: &C,
    role_id: i32,
) -> Result<Vec<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::RoleId.eq(role_id))
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
}

#[cfg(test)]
mod tests {
    use sea_orm::DatabaseConnection;

    use super::*;

    async fn db() -> DatabaseConnection {
        crate::db::connect("sqlite::memory:", 1).await.unwrap()
    }

    #[tokio::test]
    async fn register_creates_role_and_user() {
        let db = db().await;

        let outcome = register(&db, "ada", "Admin").await.unwrap();

        let Registration::Created(user) = outcome else {
            panic!("expected a new user");
        };
        let role = find_role_by_name(&db, "Admin").await.unwrap().unwrap();
        assert_eq!(user.role_id, Some(role.id));
        assert_eq!(count_users(&db).await.unwrap(), 1);
        assert_eq!(count_roles(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn register_reuses_existing_role() {
        let db = db().await;

        register(&db, "ada", "User").await.unwrap();
        register(&db, "grace", "User").await.unwrap();

        assert_eq!(count_users(&db).await.unwrap(), 2);
        assert_eq!(count_roles(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn register_known_user_keeps_role() {
        let db = db().await;
        register(&db, "ada", "User").await.unwrap();

        let outcome = register(&db, "ada", "Admin").await.unwrap();

        assert!(outcome.is_known());
        let user = find_user_by_username(&db, "ada").await.unwrap().unwrap();
        let user_role = find_role_by_name(&db, "User").await.unwrap().unwrap();
        assert_eq!(user.role_id, Some(user_role.id));
        assert!(find_role_by_name(&db, "Admin").await.unwrap().is_none());
        assert_eq!(count_roles(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn username_lookup_is_exact() {
        let db = db().await;
        register(&db, "Ada", "User").await.unwrap();

        assert!(find_user_by_username(&db, "ada").await.unwrap().is_none());
        assert!(find_user_by_username(&db, "Ada").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_storage_error() {
        let db = db().await;
        register(&db, "ada", "User").await.unwrap();

        let duplicate = user::ActiveModel {
            username: Set("ada".to_owned()),
            ..Default::default()
        }
        .insert(&db)
        .await;

        assert!(duplicate.is_err());
    }

    #[tokio::test]
    async fn users_for_role_filters_by_role() {
        let db = db().await;
        register(&db, "ada", "Admin").await.unwrap();
        register(&db, "grace", "User").await.unwrap();
        register(&db, "linus", "Admin").await.unwrap();

        let admin = find_role_by_name(&db, "Admin").await.unwrap().unwrap();
        let names: Vec<_> = users_for_role(&db, admin.id)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();

        assert_eq!(names, ["ada", "linus"]);
        let listed: Vec<_> = all_roles(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(listed, ["Admin", "User"]);
        assert_eq!(all_users(&db).await.unwrap().len(), 3);
    }
}
