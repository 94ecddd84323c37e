use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_movie_slug_unique")
                    .table(Movie::Table)
                    .col(Movie::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_category_slug_unique")
                    .table(Category::Table)
                    .col(Category::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_username_unique")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_season_movie")
                    .table(Season::Table)
                    .col(Season::MovieId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_episode_season")
                    .table(Episode::Table)
                    .col(Episode::SeasonId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_message_time")
                    .table(Message::Table)
                    .col(Message::Time)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_message_time").table(Message::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_episode_season").table(Episode::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_season_movie").table(Season::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop().name("idx_users_username_unique").table(Users::Table).to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop().name("idx_category_slug_unique").table(Category::Table).to_owned(),
            )
            .await?;
        manager
            .drop_index(Index::drop().name("idx_movie_slug_unique").table(Movie::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Slug,
}

#[derive(DeriveIden)]
enum Category {
    Table,
    Slug,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Username,
}

#[derive(DeriveIden)]
enum Season {
    Table,
    MovieId,
}

#[derive(DeriveIden)]
enum Episode {
    Table,
    SeasonId,
}

#[derive(DeriveIden)]
enum Message {
    Table,
    Time,
}
