use crate::entities::prelude::*;
use crate::entities::{episodes, favorites, watch_history, watchlist};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Parents before children so foreign keys resolve.
        let tables = [
            schema.create_table_from_entity(Users),
            schema.create_table_from_entity(Anime),
            schema.create_table_from_entity(Watchlist),
            schema.create_table_from_entity(Favorites),
            schema.create_table_from_entity(Episodes),
            schema.create_table_from_entity(WatchHistory),
        ];
        for mut table in tables {
            manager.create_table(table.if_not_exists().to_owned()).await?;
        }

        let indexes = [
            Index::create()
                .name("idx_watchlist_user_anime")
                .table(Watchlist)
                .col(watchlist::Column::UserId)
                .col(watchlist::Column::AnimeId)
                .unique()
                .if_not_exists()
                .to_owned(),
            Index::create()
                .name("idx_favorites_user_anime")
                .table(Favorites)
                .col(favorites::Column::UserId)
                .col(favorites::Column::AnimeId)
                .unique()
                .if_not_exists()
                .to_owned(),
            Index::create()
                .name("idx_watch_history_user_episode")
                .table(WatchHistory)
                .col(watch_history::Column::UserId)
                .col(watch_history::Column::EpisodeId)
                .unique()
                .if_not_exists()
                .to_owned(),
            Index::create()
                .name("idx_episodes_anime_season")
                .table(Episodes)
                .col(episodes::Column::AnimeId)
                .col(episodes::Column::Season)
                .col(episodes::Column::Number)
                .if_not_exists()
                .to_owned(),
        ];
        for index in indexes {
            manager.create_index(index).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let tables = [
            Table::drop().table(WatchHistory).if_exists().to_owned(),
            Table::drop().table(Episodes).if_exists().to_owned(),
            Table::drop().table(Favorites).if_exists().to_owned(),
            Table::drop().table(Watchlist).if_exists().to_owned(),
            Table::drop().table(Anime).if_exists().to_owned(),
            Table::drop().table(Users).if_exists().to_owned(),
        ];
        for table in tables {
            manager.drop_table(table).await?;
        }

        Ok(())
    }
}
