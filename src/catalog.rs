use std::collections::{BTreeSet, HashMap};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};
use tracing::debug;

use crate::{
    entities::{category, episode, movie, movie_category, season, user_favorite},
    error::{CatalogError, CatalogResult},
    filter::{MovieFilter, MovieSort},
    models::{
        EpisodeView, ListOptions, MovieChanges, MovieWithCategories, MovieWithSeasons, NewMovie,
        SeasonView, SeasonWithEpisodes,
    },
    pagination::Pagination,
};

/// Read and write access to movies, their categories, seasons and episodes.
#[derive(Clone, Debug)]
pub struct CatalogService {
    db: DatabaseConnection,
}

impl CatalogService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Filtered, sorted page of movies. Related entities are not resolved.
    pub async fn list_movies(&self, opts: &ListOptions) -> CatalogResult<Vec<movie::Model>> {
        let mut filter = MovieFilter::new();

        if !opts.category_slugs.is_empty() {
            let category_ids = self.category_ids(&opts.category_slugs).await?;
            debug!(
                requested = opts.category_slugs.len(),
                resolved = category_ids.len(),
                "resolved category slugs"
            );
            filter = filter.category_in(category_ids);
        }

        filter = filter.name_contains(&opts.match_name);

        debug!(
            predicates = filter.predicates().len(),
            page = opts.pagination.page(),
            limit = opts.pagination.limit(),
            sort = ?opts.sort,
            "listing movies"
        );

        let movies = opts
            .sort
            .apply(filter.select())
            .offset(opts.pagination.skip())
            .limit(opts.pagination.limit())
            .all(&self.db)
            .await?;

        Ok(movies)
    }

    /// Newest movies made of exactly one season holding exactly one episode.
    ///
    /// Candidates are narrowed to one-season movies in the query, the episode
    /// count is checked after resolution, and only then is the page cut.
    pub async fn list_single_episode_movies(
        &self,
        pagination: Pagination,
    ) -> CatalogResult<Vec<MovieWithSeasons>> {
        let candidates = MovieFilter::new()
            .season_count(1)
            .select()
            .order_by_desc(movie::Column::CreatedAt)
            .order_by_desc(movie::Column::Id)
            .all(&self.db)
            .await?;

        let movie_ids: Vec<i32> = candidates.iter().map(|m| m.id).collect();
        let mut by_movie = self.seasons_for(&movie_ids).await?;

        let page: Vec<MovieWithSeasons> = candidates
            .into_iter()
            .filter_map(|movie| {
                let seasons = by_movie.remove(&movie.id)?;
                let single = seasons.len() == 1 && seasons[0].episodes.len() == 1;
                single.then_some(MovieWithSeasons { movie, seasons })
            })
            .skip(usize::try_from(pagination.skip()).unwrap_or(usize::MAX))
            .take(usize::try_from(pagination.limit()).unwrap_or(usize::MAX))
            .collect();

        debug!(candidates = movie_ids.len(), returned = page.len(), "single-episode movies");
        Ok(page)
    }

    /// Adds one view in place. Concurrent calls never lose an increment.
    pub async fn increment_view_count(&self, movie_id: i32) -> CatalogResult<()> {
        let result = movie::Entity::update_many()
            .col_expr(movie::Column::ViewCount, Expr::col(movie::Column::ViewCount).add(1))
            .filter(MovieFilter::new().id(movie_id).into_condition())
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(CatalogError::not_found("Movie"));
        }
        Ok(())
    }

    pub async fn find_movie_by_slug(&self, slug: &str) -> CatalogResult<MovieWithCategories> {
        let movie = self.movie_by_slug(slug).await?;
        self.with_categories(movie).await
    }

    pub async fn find_season(&self, slug: &str, number: i32) -> CatalogResult<SeasonView> {
        let movie = self.movie_by_slug(slug).await?;
        let season = self
            .seasons_for(&[movie.id])
            .await?
            .remove(&movie.id)
            .unwrap_or_default()
            .into_iter()
            .find(|s| s.season.number == number)
            .ok_or_else(|| CatalogError::not_found("Season"))?;

        Ok(SeasonView { movie, season })
    }

    pub async fn find_episode(
        &self,
        slug: &str,
        season_number: i32,
        episode_number: i32,
    ) -> CatalogResult<EpisodeView> {
        let SeasonView { movie, season } = self.find_season(slug, season_number).await?;
        let SeasonWithEpisodes { season, episodes } = season;
        let episode = episodes
            .into_iter()
            .find(|e| e.number == episode_number)
            .ok_or_else(|| CatalogError::not_found("Episode"))?;

        Ok(EpisodeView { movie, season, episode })
    }

    /// Every movie in a category, newest first. Unknown slugs give an empty list.
    pub async fn movies_by_category(&self, slug: &str) -> CatalogResult<Vec<MovieWithCategories>> {
        let Some(category) =
            category::Entity::find().filter(category::Column::Slug.eq(slug)).one(&self.db).await?
        else {
            debug!(slug = %slug, "unknown category");
            return Ok(Vec::new());
        };

        let movies = MovieSort::default()
            .apply(MovieFilter::new().category_in(vec![category.id]).select())
            .all(&self.db)
            .await?;

        self.attach_categories(movies).await
    }

    pub async fn list_categories(&self) -> CatalogResult<Vec<category::Model>> {
        let categories = category::Entity::find()
            .order_by_asc(category::Column::Name)
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?;
        Ok(categories)
    }

    pub async fn create_movie(&self, input: NewMovie) -> CatalogResult<MovieWithCategories> {
        if input.title.trim().is_empty() {
            return Err(CatalogError::invalid("title is required"));
        }
        if input.slug.trim().is_empty() {
            return Err(CatalogError::invalid("slug is required"));
        }

        let txn = self.db.begin().await?;

        let movie = movie::ActiveModel {
            title: Set(input.title),
            english_title: Set(input.english_title),
            slug: Set(input.slug),
            image: Set(input.image),
            time: Set(input.time),
            trailer: Set(input.trailer),
            premiere: Set(input.premiere),
            description: Set(input.description),
            release_year: Set(input.release_year),
            rating: Set(input.rating),
            imdb_id: Set(input.imdb_id),
            view_count: Set(0),
            created_at: Set(now_sec()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(CatalogError::from_write)?;

        link_categories(&txn, movie.id, &input.categories).await?;
        txn.commit().await?;

        debug!(movie_id = movie.id, slug = %movie.slug, "movie created");
        self.with_categories(movie).await
    }

    pub async fn update_movie(
        &self,
        id: i32,
        changes: MovieChanges,
    ) -> CatalogResult<MovieWithCategories> {
        if changes.slug.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(CatalogError::invalid("slug must not be empty"));
        }

        let txn = self.db.begin().await?;

        let Some(existing) = movie::Entity::find_by_id(id).one(&txn).await? else {
            return Err(CatalogError::not_found("Movie"));
        };

        let mut active: movie::ActiveModel = existing.clone().into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(slug) = changes.slug {
            active.slug = Set(slug);
        }
        if let Some(v) = changes.english_title {
            active.english_title = Set(Some(v));
        }
        if let Some(v) = changes.image {
            active.image = Set(Some(v));
        }
        if let Some(v) = changes.time {
            active.time = Set(Some(v));
        }
        if let Some(v) = changes.trailer {
            active.trailer = Set(Some(v));
        }
        if let Some(v) = changes.premiere {
            active.premiere = Set(Some(v));
        }
        if let Some(v) = changes.description {
            active.description = Set(Some(v));
        }
        if let Some(v) = changes.release_year {
            active.release_year = Set(Some(v));
        }
        if let Some(v) = changes.rating {
            active.rating = Set(Some(v));
        }
        if let Some(v) = changes.imdb_id {
            active.imdb_id = Set(Some(v));
        }

        let movie = if active.is_changed() {
            active.update(&txn).await.map_err(CatalogError::from_write)?
        } else {
            existing
        };

        if let Some(category_ids) = changes.categories {
            movie_category::Entity::delete_many()
                .filter(movie_category::Column::MovieId.eq(id))
                .exec(&txn)
                .await?;
            link_categories(&txn, id, &category_ids).await?;
        }

        txn.commit().await?;

        debug!(movie_id = id, "movie updated");
        self.with_categories(movie).await
    }

    /// Removes the movie and its category and favorite links. Seasons stay.
    pub async fn delete_movie(&self, id: i32) -> CatalogResult<movie::Model> {
        let txn = self.db.begin().await?;

        let Some(movie) = movie::Entity::find_by_id(id).one(&txn).await? else {
            return Err(CatalogError::not_found("Movie"));
        };

        movie_category::Entity::delete_many()
            .filter(movie_category::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        user_favorite::Entity::delete_many()
            .filter(user_favorite::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        movie::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        debug!(movie_id = id, "movie deleted");
        Ok(movie)
    }

    async fn movie_by_slug(&self, slug: &str) -> CatalogResult<movie::Model> {
        MovieFilter::new()
            .slug(slug)
            .select()
            .one(&self.db)
            .await?
            .ok_or_else(|| CatalogError::not_found("Movie"))
    }

    async fn category_ids(&self, slugs: &[String]) -> CatalogResult<Vec<i32>> {
        let categories = category::Entity::find()
            .filter(category::Column::Slug.is_in(slugs.iter().cloned()))
            .all(&self.db)
            .await?;
        Ok(categories.into_iter().map(|c| c.id).collect())
    }

    async fn with_categories(&self, movie: movie::Model) -> CatalogResult<MovieWithCategories> {
        let mut categories = self.categories_for(&[movie.id]).await?;
        let categories = categories.remove(&movie.id).unwrap_or_default();
        Ok(MovieWithCategories { movie, categories })
    }

    async fn attach_categories(
        &self,
        movies: Vec<movie::Model>,
    ) -> CatalogResult<Vec<MovieWithCategories>> {
        let movie_ids: Vec<i32> = movies.iter().map(|m| m.id).collect();
        let mut categories = self.categories_for(&movie_ids).await?;
        Ok(movies
            .into_iter()
            .map(|movie| {
                let categories = categories.remove(&movie.id).unwrap_or_default();
                MovieWithCategories { movie, categories }
            })
            .collect())
    }

    /// Categories per movie id, each list ordered by name.
    async fn categories_for(
        &self,
        movie_ids: &[i32],
    ) -> CatalogResult<HashMap<i32, Vec<category::Model>>> {
        if movie_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = movie_category::Entity::find()
            .filter(movie_category::Column::MovieId.is_in(movie_ids.iter().copied()))
            .all(&self.db)
            .await?;
        if links.is_empty() {
            return Ok(HashMap::new());
        }

        let category_ids: BTreeSet<i32> = links.iter().map(|l| l.category_id).collect();
        let categories: HashMap<i32, category::Model> = category::Entity::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut out: HashMap<i32, Vec<category::Model>> = HashMap::new();
        for link in links {
            if let Some(c) = categories.get(&link.category_id) {
                out.entry(link.movie_id).or_default().push(c.clone());
            }
        }
        for list in out.values_mut() {
            list.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        }
        Ok(out)
    }

    /// Seasons per movie id ordered by number, each with its episodes ordered by number.
    async fn seasons_for(
        &self,
        movie_ids: &[i32],
    ) -> CatalogResult<HashMap<i32, Vec<SeasonWithEpisodes>>> {
        if movie_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let seasons = season::Entity::find()
            .filter(season::Column::MovieId.is_in(movie_ids.iter().copied()))
            .order_by_asc(season::Column::Number)
            .order_by_asc(season::Column::Id)
            .all(&self.db)
            .await?;

        let season_ids: Vec<i32> = seasons.iter().map(|s| s.id).collect();
        let mut episodes: HashMap<i32, Vec<episode::Model>> = HashMap::new();
        if !season_ids.is_empty() {
            let rows = episode::Entity::find()
                .filter(episode::Column::SeasonId.is_in(season_ids))
                .order_by_asc(episode::Column::Number)
                .order_by_asc(episode::Column::Id)
                .all(&self.db)
                .await?;
            for row in rows {
                episodes.entry(row.season_id).or_default().push(row);
            }
        }

        let mut out: HashMap<i32, Vec<SeasonWithEpisodes>> = HashMap::new();
        for season in seasons {
            let episodes = episodes.remove(&season.id).unwrap_or_default();
            out.entry(season.movie_id).or_default().push(SeasonWithEpisodes { season, episodes });
        }
        Ok(out)
    }
}

async fn link_categories<C: ConnectionTrait>(
    conn: &C,
    movie_id: i32,
    category_ids: &[i32],
) -> CatalogResult<()> {
    let unique: BTreeSet<i32> = category_ids.iter().copied().collect();
    if unique.is_empty() {
        return Ok(());
    }

    let links = unique.into_iter().map(|category_id| movie_category::ActiveModel {
        movie_id: Set(movie_id),
        category_id: Set(category_id),
    });
    movie_category::Entity::insert_many(links)
        .exec_without_returning(conn)
        .await
        .map_err(CatalogError::from_write)?;
    Ok(())
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
