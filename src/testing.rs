//! Seeding helpers for tests that run against an in-memory database.

use sea_orm::{ActiveModelTrait, ConnectOptions, DatabaseConnection, EntityTrait, Set};

use crate::{
    db,
    entities::{category, episode, message, movie, movie_category, season, user, user_favorite},
};

pub async fn memory_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    db::connect_and_migrate(options).await.expect("in-memory database")
}

pub struct MovieSeed<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    pub english_title: Option<&'a str>,
    pub view_count: i64,
    pub created_at: i64,
}

impl<'a> MovieSeed<'a> {
    pub fn new(slug: &'a str, title: &'a str) -> Self {
        Self { slug, title, english_title: None, view_count: 0, created_at: 0 }
    }

    pub fn english(mut self, english_title: &'a str) -> Self {
        self.english_title = Some(english_title);
        self
    }

    pub fn views(mut self, view_count: i64) -> Self {
        self.view_count = view_count;
        self
    }

    pub fn created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    pub async fn insert(self, db: &DatabaseConnection) -> movie::Model {
        movie::ActiveModel {
            title: Set(self.title.to_string()),
            english_title: Set(self.english_title.map(str::to_string)),
            slug: Set(self.slug.to_string()),
            image: Set(None),
            time: Set(None),
            trailer: Set(None),
            premiere: Set(None),
            description: Set(None),
            release_year: Set(None),
            rating: Set(None),
            imdb_id: Set(None),
            view_count: Set(self.view_count),
            created_at: Set(self.created_at),
            ..Default::default()
        }
        .insert(db)
        .await
        .expect("insert movie")
    }
}

pub async fn insert_movie(db: &DatabaseConnection, slug: &str, title: &str) -> movie::Model {
    MovieSeed::new(slug, title).insert(db).await
}

pub async fn insert_category(db: &DatabaseConnection, slug: &str, name: &str) -> category::Model {
    category::ActiveModel {
        slug: Set(slug.to_string()),
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert category")
}

pub async fn link_category(db: &DatabaseConnection, movie_id: i32, category_id: i32) {
    movie_category::Entity::insert(movie_category::ActiveModel {
        movie_id: Set(movie_id),
        category_id: Set(category_id),
    })
    .exec_without_returning(db)
    .await
    .expect("link category");
}

pub async fn insert_season(db: &DatabaseConnection, movie_id: i32, number: i32) -> season::Model {
    season::ActiveModel { movie_id: Set(movie_id), number: Set(number), ..Default::default() }
        .insert(db)
        .await
        .expect("insert season")
}

pub async fn insert_episode(db: &DatabaseConnection, season_id: i32, number: i32) -> episode::Model {
    episode::ActiveModel {
        season_id: Set(season_id),
        number: Set(number),
        title: Set(Some(format!("Episode {number}"))),
        video_url: Set(None),
        duration: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert episode")
}

/// Movie with `seasons[i]` episodes in season `i + 1`.
pub async fn insert_series(
    db: &DatabaseConnection,
    seed: MovieSeed<'_>,
    seasons: &[i32],
) -> movie::Model {
    let movie = seed.insert(db).await;
    for (idx, episodes) in seasons.iter().enumerate() {
        let season = insert_season(db, movie.id, idx as i32 + 1).await;
        for number in 1..=*episodes {
            insert_episode(db, season.id, number).await;
        }
    }
    movie
}

pub async fn insert_user(db: &DatabaseConnection, username: &str) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        avatar: Set(Some(format!("/avatars/{username}.png"))),
        admin: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user")
}

pub async fn insert_message(
    db: &DatabaseConnection,
    author_id: i32,
    body: &str,
    time: i64,
) -> message::Model {
    message::ActiveModel {
        author_id: Set(author_id),
        body: Set(body.to_string()),
        time: Set(time),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert message")
}

pub async fn add_favorite(db: &DatabaseConnection, user_id: i32, movie_id: i32) {
    user_favorite::Entity::insert(user_favorite::ActiveModel {
        user_id: Set(user_id),
        movie_id: Set(movie_id),
    })
    .exec_without_returning(db)
    .await
    .expect("add favorite");
}
