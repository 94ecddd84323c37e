use serde::{Deserialize, Serialize};

use crate::{
    entities::{category, episode, movie, season},
    filter::MovieSort,
    pagination::Pagination,
};

#[derive(Clone, Debug, Default)]
pub struct ListOptions {
    pub pagination: Pagination,
    pub category_slugs: Vec<String>,
    pub sort: MovieSort,
    pub match_name: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct SeasonWithEpisodes {
    #[serde(flatten)]
    pub season: season::Model,
    pub episodes: Vec<episode::Model>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MovieWithSeasons {
    #[serde(flatten)]
    pub movie: movie::Model,
    pub seasons: Vec<SeasonWithEpisodes>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MovieWithCategories {
    #[serde(flatten)]
    pub movie: movie::Model,
    pub categories: Vec<category::Model>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SeasonView {
    pub movie: movie::Model,
    pub season: SeasonWithEpisodes,
}

#[derive(Clone, Debug, Serialize)]
pub struct EpisodeView {
    pub movie: movie::Model,
    pub season: season::Model,
    pub episode: episode::Model,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub english_title: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub trailer: Option<String>,
    #[serde(default)]
    pub premiere: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub categories: Vec<i32>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub english_title: Option<String>,
    pub image: Option<String>,
    pub time: Option<String>,
    pub trailer: Option<String>,
    pub premiere: Option<String>,
    pub description: Option<String>,
    pub release_year: Option<i32>,
    pub rating: Option<f64>,
    pub imdb_id: Option<String>,
    pub categories: Option<Vec<i32>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct UserSummary {
    pub user: String,
    pub email: String,
    pub id: i32,
}

#[derive(Clone, Debug, Serialize)]
pub struct AuthorSummary {
    pub username: String,
    pub avatar: Option<String>,
    pub admin: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct MessageWithAuthor {
    pub id: i32,
    pub body: String,
    pub time: i64,
    pub author: Option<AuthorSummary>,
}
