pub mod category;
pub mod episode;
pub mod message;
pub mod movie;
pub mod movie_category;
pub mod season;
pub mod user;
pub mod user_favorite;
