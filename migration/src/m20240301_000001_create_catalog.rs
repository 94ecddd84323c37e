use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(pk_auto(Movie::Id))
                    .col(string(Movie::Title))
                    .col(string_null(Movie::EnglishTitle))
                    .col(string(Movie::Slug))
                    .col(string_null(Movie::Image))
                    .col(string_null(Movie::Time))
                    .col(string_null(Movie::Trailer))
                    .col(string_null(Movie::Premiere))
                    .col(text_null(Movie::Description))
                    .col(integer_null(Movie::ReleaseYear))
                    .col(double_null(Movie::Rating))
                    .col(string_null(Movie::ImdbId))
                    .col(big_integer(Movie::ViewCount).default(0))
                    .col(big_integer(Movie::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Category::Table)
                    .if_not_exists()
                    .col(pk_auto(Category::Id))
                    .col(string(Category::Slug))
                    .col(string(Category::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieCategory::Table)
                    .if_not_exists()
                    .col(integer(MovieCategory::MovieId))
                    .col(integer(MovieCategory::CategoryId))
                    .primary_key(
                        Index::create().col(MovieCategory::MovieId).col(MovieCategory::CategoryId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_category_movie")
                            .from(MovieCategory::Table, MovieCategory::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_category_category")
                            .from(MovieCategory::Table, MovieCategory::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Seasons and episodes reference their parent by id only; deleting a
        // movie leaves them in place.
        manager
            .create_table(
                Table::create()
                    .table(Season::Table)
                    .if_not_exists()
                    .col(pk_auto(Season::Id))
                    .col(integer(Season::MovieId))
                    .col(integer(Season::Number))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Episode::Table)
                    .if_not_exists()
                    .col(pk_auto(Episode::Id))
                    .col(integer(Episode::SeasonId))
                    .col(integer(Episode::Number))
                    .col(string_null(Episode::Title))
                    .col(string_null(Episode::VideoUrl))
                    .col(integer_null(Episode::Duration))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Episode::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Season::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieCategory::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Category::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Title,
    EnglishTitle,
    Slug,
    Image,
    Time,
    Trailer,
    Premiere,
    Description,
    ReleaseYear,
    Rating,
    ImdbId,
    ViewCount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Category {
    Table,
    Id,
    Slug,
    Name,
}

#[derive(DeriveIden)]
enum MovieCategory {
    Table,
    MovieId,
    CategoryId,
}

#[derive(DeriveIden)]
enum Season {
    Table,
    Id,
    MovieId,
    Number,
}

#[derive(DeriveIden)]
enum Episode {
    Table,
    Id,
    SeasonId,
    Number,
    Title,
    VideoUrl,
    Duration,
}
