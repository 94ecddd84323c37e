use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username))
                    .col(string(Users::Email))
                    .col(string_null(Users::Avatar))
                    .col(boolean(Users::Admin).default(false))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserFavorite::Table)
                    .if_not_exists()
                    .col(integer(UserFavorite::UserId))
                    .col(integer(UserFavorite::MovieId))
                    .primary_key(Index::create().col(UserFavorite::UserId).col(UserFavorite::MovieId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_favorite_user")
                            .from(UserFavorite::Table, UserFavorite::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_favorite_movie")
                            .from(UserFavorite::Table, UserFavorite::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Message::Table)
                    .if_not_exists()
                    .col(pk_auto(Message::Id))
                    .col(integer(Message::AuthorId))
                    .col(text(Message::Body))
                    .col(big_integer(Message::Time))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_author")
                            .from(Message::Table, Message::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Message::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(UserFavorite::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    Avatar,
    Admin,
}

#[derive(DeriveIden)]
enum UserFavorite {
    Table,
    UserId,
    MovieId,
}

#[derive(DeriveIden)]
enum Message {
    Table,
    Id,
    AuthorId,
    Body,
    Time,
}
