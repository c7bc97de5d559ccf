use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PHOTO: &str = "group_logo.jpg";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// Only `None` between the first insert and the `g<id>` fallback update.
    #[sea_orm(unique)]
    pub slug: Option<String>,
    pub description: String,
    pub photo: String,
    pub date_create: DateTimeUtc,
}

impl Model {
    pub fn slug(&self) -> &str {
        self.slug.as_deref().unwrap_or_default()
    }

    pub fn url(&self) -> String {
        format!("/group/{}/", self.slug())
    }

    pub fn update_url(&self) -> String {
        format!("/group/{}/update/", self.slug())
    }

    pub fn delete_url(&self) -> String {
        format!("/group/{}/delete/", self.slug())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
    #[sea_orm(has_many = "super::account_group::Entity")]
    Memberships,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::account_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        super::account_group::Relation::Account.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::account_group::Relation::Group.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
