//! Typed movie filters and sort orders, compiled to sea-orm conditions.

use sea_orm::{
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Select,
    sea_query::{Expr, Func, LikeExpr, Order, Query, SimpleExpr},
};

use crate::entities::{movie, movie_category, season};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MoviePredicate {
    /// Movie is linked to at least one of these categories. Empty matches nothing.
    CategoryIn(Vec<i32>),
    /// Case-insensitive literal substring of `title` or `english_title`.
    NameContains(String),
    IdEq(i32),
    SlugEq(String),
    SeasonCountEq(u32),
}

/// Conjunction of predicates. An empty filter matches every movie.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovieFilter {
    predicates: Vec<MoviePredicate>,
}

impl MovieFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category_in(mut self, category_ids: Vec<i32>) -> Self {
        self.predicates.push(MoviePredicate::CategoryIn(category_ids));
        self
    }

    pub fn name_contains(mut self, needle: &str) -> Self {
        if !needle.is_empty() {
            self.predicates.push(MoviePredicate::NameContains(needle.to_string()));
        }
        self
    }

    pub fn id(mut self, id: i32) -> Self {
        self.predicates.push(MoviePredicate::IdEq(id));
        self
    }

    pub fn slug(mut self, slug: &str) -> Self {
        self.predicates.push(MoviePredicate::SlugEq(slug.to_string()));
        self
    }

    pub fn season_count(mut self, count: u32) -> Self {
        self.predicates.push(MoviePredicate::SeasonCountEq(count));
        self
    }

    pub fn predicates(&self) -> &[MoviePredicate] {
        &self.predicates
    }

    pub fn into_condition(self) -> Condition {
        self.predicates
            .into_iter()
            .fold(Condition::all(), |cond, predicate| cond.add(predicate.into_condition()))
    }

    pub fn apply(self, select: Select<movie::Entity>) -> Select<movie::Entity> {
        select.filter(self.into_condition())
    }

    pub fn select(self) -> Select<movie::Entity> {
        self.apply(movie::Entity::find())
    }
}

impl MoviePredicate {
    fn into_condition(self) -> Condition {
        match self {
            MoviePredicate::CategoryIn(ids) if ids.is_empty() => {
                Condition::all().add(Expr::cust("1 = 0"))
            },
            MoviePredicate::CategoryIn(ids) => Condition::all().add(
                movie::Column::Id.in_subquery(
                    Query::select()
                        .column(movie_category::Column::MovieId)
                        .from(movie_category::Entity)
                        .and_where(movie_category::Column::CategoryId.is_in(ids))
                        .to_owned(),
                ),
            ),
            MoviePredicate::NameContains(needle) => {
                let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
                Condition::any()
                    .add(lower_like(movie::Column::Title, &pattern))
                    .add(lower_like(movie::Column::EnglishTitle, &pattern))
            },
            MoviePredicate::IdEq(id) => Condition::all().add(movie::Column::Id.eq(id)),
            MoviePredicate::SlugEq(slug) => Condition::all().add(movie::Column::Slug.eq(slug)),
            MoviePredicate::SeasonCountEq(count) => Condition::all().add(
                movie::Column::Id.in_subquery(
                    Query::select()
                        .column(season::Column::MovieId)
                        .from(season::Entity)
                        .group_by_col(season::Column::MovieId)
                        .and_having(
                            Expr::expr(Func::count(Expr::col((
                                season::Entity,
                                season::Column::Id,
                            ))))
                            .eq(i64::from(count)),
                        )
                        .to_owned(),
                ),
            ),
        }
    }
}

fn lower_like(column: movie::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((movie::Entity, column))))
        .like(LikeExpr::new(pattern).escape('\\'))
}

/// Escapes LIKE wildcards so the needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Composite order: identity first, then view count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovieSort {
    pub newest_first: bool,
    pub most_viewed_first: bool,
}

impl Default for MovieSort {
    fn default() -> Self {
        Self { newest_first: true, most_viewed_first: false }
    }
}

impl MovieSort {
    pub fn by_views() -> Self {
        Self { newest_first: false, most_viewed_first: true }
    }

    pub fn apply(self, select: Select<movie::Entity>) -> Select<movie::Entity> {
        select
            .order_by(movie::Column::Id, direction(self.newest_first))
            .order_by(movie::Column::ViewCount, direction(self.most_viewed_first))
    }
}

fn direction(descending: bool) -> Order {
    if descending { Order::Desc } else { Order::Asc }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, QueryTrait};

    use super::*;

    fn sql(select: Select<movie::Entity>) -> String {
        select.build(DbBackend::Sqlite).to_string()
    }

    #[test]
    fn empty_name_appends_nothing() {
        assert!(MovieFilter::new().name_contains("").predicates().is_empty());
    }

    #[test]
    fn predicates_accumulate_in_order() {
        let filter = MovieFilter::new().category_in(vec![1, 2]).name_contains("Inter");
        assert_eq!(
            filter.predicates(),
            &[
                MoviePredicate::CategoryIn(vec![1, 2]),
                MoviePredicate::NameContains("Inter".to_string()),
            ]
        );
    }

    #[test]
    fn empty_category_set_matches_nothing() {
        let query = sql(MovieFilter::new().category_in(vec![]).select());
        assert!(query.contains("1 = 0"), "{query}");
    }

    #[test]
    fn name_match_is_lowercased_substring_over_both_titles() {
        let query = sql(MovieFilter::new().name_contains("InTer").select());
        assert!(query.contains("LOWER(\"movie\".\"title\")"), "{query}");
        assert!(query.contains("LOWER(\"movie\".\"english_title\")"), "{query}");
        assert!(query.contains("'%inter%'"), "{query}");
        assert!(query.contains(" OR "), "{query}");
    }

    #[test]
    fn category_and_name_are_conjoined() {
        let query = sql(MovieFilter::new().category_in(vec![7]).name_contains("x").select());
        assert!(query.contains("IN (7)"), "{query}");
        assert!(query.contains("'%x%'"), "{query}");
        assert!(query.contains(" AND "), "{query}");
    }

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
    }

    #[test]
    fn default_sort_is_newest_then_least_viewed() {
        let query = sql(MovieSort::default().apply(movie::Entity::find()));
        assert!(
            query.contains("ORDER BY \"movie\".\"id\" DESC, \"movie\".\"view_count\" ASC"),
            "{query}"
        );
    }

    #[test]
    fn view_sort_flips_both_keys() {
        let query = sql(MovieSort::by_views().apply(movie::Entity::find()));
        assert!(
            query.contains("ORDER BY \"movie\".\"id\" ASC, \"movie\".\"view_count\" DESC"),
            "{query}"
        );
    }
}
