use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "anime")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub anilist_id: Option<i32>,
    #[sea_orm(unique)]
    pub kitsu_id: Option<String>,
    /// JSON object with `english`, `romaji` and `native` keys.
    pub title_json: String,
    pub cover_image: String,
    pub banner_image: Option<String>,
    pub synopsis: Option<String>,
    pub episodes: Option<i32>,
    pub status: Option<String>,
    /// JSON array of genre names.
    pub genres_json: String,
    pub studio: Option<String>,
    pub rating: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::watchlist::Entity")]
    Watchlist,
    #[sea_orm(has_many = "super::favorites::Entity")]
    Favorites,
    #[sea_orm(has_many = "super::episodes::Entity")]
    Episodes,
}

impl Related<super::watchlist::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Watchlist.def()
    }
}

impl Related<super::favorites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl Related<super::episodes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Episodes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
