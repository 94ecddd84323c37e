use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, header},
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    AppState,
    entities::{category, movie},
    error::{ApiResult, CatalogError, PageResult},
    filter::MovieSort,
    models::{
        EpisodeView, ListOptions, MessageWithAuthor, MovieChanges, MovieWithCategories,
        MovieWithSeasons, NewMovie, SeasonView, UserSummary,
    },
    pagination::{Pagination, parse_offset},
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/movies", get(list_movies).post(create_movie))
        .route("/api/movies/top", get(top_movies))
        .route("/api/movies/single-episode", get(single_episode_movies))
        .route("/api/movies/category/{slug}", get(movies_by_category))
        .route("/api/movies/{id}", put(update_movie).delete(delete_movie))
        .route("/api/categories", get(list_categories))
        .route("/api/messages", get(list_messages))
        .route("/api/users", get(find_user))
        .route("/api/users/{id}/favorites", get(user_favorites))
        .route("/movies/{slug}", get(movie_page))
        .route("/movies/{slug}/seasons/{season}", get(season_page))
        .route("/movies/{slug}/seasons/{season}/episodes/{episode}", get(episode_page))
        .with_state(state)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    success: bool,
    data: Vec<T>,
    page: u64,
    length: usize,
    next_page: String,
}

#[derive(Debug, Serialize)]
pub struct DataEnvelope<T> {
    success: bool,
    data: T,
}

impl<T> DataEnvelope<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self { success: true, data })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviesQuery {
    page: Option<String>,
    limit: Option<String>,
    match_name: Option<String>,
    category_slugs: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
    limit: Option<String>,
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<MoviesQuery>,
) -> ApiResult<Json<PageEnvelope<movie::Model>>> {
    let pagination = Pagination::parse(
        q.page.as_deref(),
        q.limit.as_deref(),
        state.config.default_page_size,
    )?;
    let match_name = q.match_name.unwrap_or_default();
    let opts = ListOptions {
        pagination,
        category_slugs: split_slugs(q.category_slugs.as_deref()),
        sort: MovieSort::default(),
        match_name,
    };

    let movies = state.catalog.list_movies(&opts).await?;
    let next_page = next_page_url(&headers, "/api/movies", pagination, Some(&opts.match_name));
    Ok(Json(envelope(movies, pagination, next_page)))
}

pub async fn top_movies(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<PageEnvelope<movie::Model>>> {
    let pagination = Pagination::parse(
        q.page.as_deref(),
        q.limit.as_deref(),
        state.config.default_page_size,
    )?;
    let opts = ListOptions { pagination, sort: MovieSort::by_views(), ..Default::default() };

    let movies = state.catalog.list_movies(&opts).await?;
    let next_page = next_page_url(&headers, "/api/movies/top", pagination, None);
    Ok(Json(envelope(movies, pagination, next_page)))
}

pub async fn single_episode_movies(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<PageEnvelope<MovieWithSeasons>>> {
    let pagination = Pagination::parse(
        q.page.as_deref(),
        q.limit.as_deref(),
        state.config.default_page_size,
    )?;

    let movies = state.catalog.list_single_episode_movies(pagination).await?;
    let next_page = next_page_url(&headers, "/api/movies/single-episode", pagination, None);
    Ok(Json(envelope(movies, pagination, next_page)))
}

pub async fn movies_by_category(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<DataEnvelope<Vec<MovieWithCategories>>>> {
    let movies = state.catalog.movies_by_category(&slug).await?;
    Ok(DataEnvelope::ok(movies))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewMovie>, JsonRejection>,
) -> ApiResult<Json<DataEnvelope<MovieWithCategories>>> {
    let Json(input) = body.map_err(|e| CatalogError::invalid(e.body_text()))?;
    let movie = state.catalog.create_movie(input).await?;
    Ok(DataEnvelope::ok(movie))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<MovieChanges>, JsonRejection>,
) -> ApiResult<Json<DataEnvelope<MovieWithCategories>>> {
    let id = parse_id(&id)?;
    let Json(changes) = body.map_err(|e| CatalogError::invalid(e.body_text()))?;
    let movie = state.catalog.update_movie(id, changes).await?;
    Ok(DataEnvelope::ok(movie))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataEnvelope<movie::Model>>> {
    let movie = state.catalog.delete_movie(parse_id(&id)?).await?;
    Ok(DataEnvelope::ok(movie))
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DataEnvelope<Vec<category::Model>>>> {
    Ok(DataEnvelope::ok(state.catalog.list_categories().await?))
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    skip: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    success: bool,
    messages: Vec<MessageWithAuthor>,
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(q): Query<MessagesQuery>,
) -> ApiResult<Json<MessagesResponse>> {
    let skip = parse_offset(q.skip.as_deref())?;
    let messages = state.community.list_messages(skip).await?;
    Ok(Json(MessagesResponse { success: true, messages }))
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    name: Option<String>,
}

pub async fn find_user(
    State(state): State<Arc<AppState>>,
    Query(q): Query<UserQuery>,
) -> ApiResult<Json<UserSummary>> {
    let name = q.name.unwrap_or_default();
    Ok(Json(state.community.find_user_by_username(&name).await?))
}

pub async fn user_favorites(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<DataEnvelope<Vec<movie::Model>>>> {
    let movies = state.community.user_favorites(parse_id(&id)?).await?;
    Ok(DataEnvelope::ok(movies))
}

#[derive(Debug, Deserialize)]
pub struct MoviePageQuery {
    user: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePage {
    title: String,
    movie: MovieWithCategories,
    is_favorite: bool,
}

/// Single-movie view. Counting the view happens in the background.
pub async fn movie_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(q): Query<MoviePageQuery>,
) -> PageResult<Json<MoviePage>> {
    let movie = state.catalog.find_movie_by_slug(&slug).await?;
    let movie_id = movie.movie.id;

    let is_favorite = match q.user {
        Some(user_id) => state.community.is_favorite(user_id, movie_id).await?,
        None => false,
    };

    let catalog = state.catalog.clone();
    tokio::spawn(async move {
        if let Err(err) = catalog.increment_view_count(movie_id).await {
            warn!(movie_id, error = %err, "failed to count view");
        }
    });

    Ok(Json(MoviePage { title: movie.movie.title.clone(), movie, is_favorite }))
}

pub async fn season_page(
    State(state): State<Arc<AppState>>,
    Path((slug, season)): Path<(String, i32)>,
) -> PageResult<Json<SeasonView>> {
    Ok(Json(state.catalog.find_season(&slug, season).await?))
}

pub async fn episode_page(
    State(state): State<Arc<AppState>>,
    Path((slug, season, episode)): Path<(String, i32, i32)>,
) -> PageResult<Json<EpisodeView>> {
    Ok(Json(state.catalog.find_episode(&slug, season, episode).await?))
}

fn envelope<T>(data: Vec<T>, pagination: Pagination, next_page: String) -> PageEnvelope<T> {
    PageEnvelope { success: true, length: data.len(), data, page: pagination.page(), next_page }
}

fn split_slugs(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_id(raw: &str) -> Result<i32, CatalogError> {
    raw.parse().map_err(|_| CatalogError::invalid(format!("invalid id {raw:?}")))
}

fn next_page_url(
    headers: &HeaderMap,
    path: &str,
    pagination: Pagination,
    match_name: Option<&str>,
) -> String {
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok()).unwrap_or("localhost");
    let scheme =
        headers.get("x-forwarded-proto").and_then(|v| v.to_str().ok()).unwrap_or("http");

    let mut url = format!(
        "{scheme}://{host}{path}?page={}&limit={}",
        pagination.page() + 1,
        pagination.limit()
    );
    if let Some(name) = match_name {
        url.push_str("&matchName=");
        url.push_str(&urlencoding::encode(name));
    }
    url
}
