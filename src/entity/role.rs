use sea_orm::entity::prelude::*;

/// A row of the `roles` table.
///
/// | Column | Type                  | Description          |
/// |--------|-----------------------|----------------------|
/// | id     | INTEGER (Primary Key) | Role ID              |
/// | name   | VARCHAR(64) UNIQUE    | Capitalized role name |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
