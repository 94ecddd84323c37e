use std::collections::{BTreeSet, HashMap};

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::debug;

use crate::{
    entities::{message, movie, user, user_favorite},
    error::{CatalogError, CatalogResult},
    models::{AuthorSummary, MessageWithAuthor, UserSummary},
};

pub const DEFAULT_MESSAGE_PAGE_SIZE: u64 = 10;

/// Users, their favorites, and the message feed.
#[derive(Clone, Debug)]
pub struct CommunityService {
    db: DatabaseConnection,
    message_page_size: u64,
}

impl CommunityService {
    pub fn new(db: DatabaseConnection, message_page_size: u64) -> Self {
        Self { db, message_page_size: message_page_size.max(1) }
    }

    pub async fn find_user_by_username(&self, username: &str) -> CatalogResult<UserSummary> {
        let user = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or_else(|| CatalogError::not_found("User"))?;

        Ok(UserSummary { user: user.username, email: user.email, id: user.id })
    }

    /// Newest messages first, one page starting `skip` records in.
    pub async fn list_messages(&self, skip: u64) -> CatalogResult<Vec<MessageWithAuthor>> {
        let messages = message::Entity::find()
            .order_by_desc(message::Column::Time)
            .order_by_desc(message::Column::Id)
            .offset(skip)
            .limit(self.message_page_size)
            .all(&self.db)
            .await?;

        let author_ids: BTreeSet<i32> = messages.iter().map(|m| m.author_id).collect();
        let authors: HashMap<i32, AuthorSummary> = if author_ids.is_empty() {
            HashMap::new()
        } else {
            user::Entity::find()
                .filter(user::Column::Id.is_in(author_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|u| {
                    (u.id, AuthorSummary { username: u.username, avatar: u.avatar, admin: u.admin })
                })
                .collect()
        };

        debug!(skip, returned = messages.len(), "listing messages");

        Ok(messages
            .into_iter()
            .map(|m| MessageWithAuthor {
                id: m.id,
                body: m.body,
                time: m.time,
                author: authors.get(&m.author_id).cloned(),
            })
            .collect())
    }

    pub async fn user_favorites(&self, user_id: i32) -> CatalogResult<Vec<movie::Model>> {
        if user::Entity::find_by_id(user_id).one(&self.db).await?.is_none() {
            return Err(CatalogError::not_found("User"));
        }

        let movie_ids: Vec<i32> = user_favorite::Entity::find()
            .filter(user_favorite::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|f| f.movie_id)
            .collect();
        if movie_ids.is_empty() {
            return Ok(Vec::new());
        }

        let movies = movie::Entity::find()
            .filter(movie::Column::Id.is_in(movie_ids))
            .order_by_desc(movie::Column::Id)
            .all(&self.db)
            .await?;
        Ok(movies)
    }

    pub async fn is_favorite(&self, user_id: i32, movie_id: i32) -> CatalogResult<bool> {
        let found = user_favorite::Entity::find_by_id((user_id, movie_id)).one(&self.db).await?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[tokio::test]
    async fn finds_user_by_username() {
        let db = memory_db().await;
        let alice = insert_user(&db, "alice").await;
        let community = CommunityService::new(db, 10);

        let found = community.find_user_by_username("alice").await.unwrap();
        assert_eq!((found.user.as_str(), found.id), ("alice", alice.id));
        assert_eq!(found.email, "alice@example.com");

        let err = community.find_user_by_username("bob").await.unwrap_err();
        assert_eq!(err.to_string(), "User not found");
    }

    #[tokio::test]
    async fn messages_are_newest_first_with_authors() {
        let db = memory_db().await;
        let alice = insert_user(&db, "alice").await;
        let bob = insert_user(&db, "bob").await;
        insert_message(&db, alice.id, "first", 100).await;
        insert_message(&db, bob.id, "third", 300).await;
        insert_message(&db, alice.id, "second", 200).await;
        let community = CommunityService::new(db, 2);

        let page = community.list_messages(0).await.unwrap();
        let bodies: Vec<_> = page.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, ["third", "second"]);
        let author = page[0].author.as_ref().unwrap();
        assert_eq!(author.username, "bob");
        assert_eq!(author.avatar.as_deref(), Some("/avatars/bob.png"));
        assert!(!author.admin);

        let rest = community.list_messages(2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].body, "first");
    }

    #[tokio::test]
    async fn default_message_page_holds_ten() {
        let db = memory_db().await;
        let alice = insert_user(&db, "alice").await;
        for t in 0..12 {
            insert_message(&db, alice.id, &format!("m{t}"), t).await;
        }
        let community = CommunityService::new(db, DEFAULT_MESSAGE_PAGE_SIZE);

        let page = community.list_messages(0).await.unwrap();
        assert_eq!(page.len(), 10);
        assert_eq!(page[0].body, "m11");
    }

    #[tokio::test]
    async fn reports_favorites() {
        let db = memory_db().await;
        let alice = insert_user(&db, "alice").await;
        let heat = insert_movie(&db, "heat", "Heat").await;
        let up = insert_movie(&db, "up", "Up").await;
        add_favorite(&db, alice.id, heat.id).await;
        let community = CommunityService::new(db, 10);

        assert!(community.is_favorite(alice.id, heat.id).await.unwrap());
        assert!(!community.is_favorite(alice.id, up.id).await.unwrap());

        let favorites = community.user_favorites(alice.id).await.unwrap();
        assert_eq!(favorites, vec![heat]);
        assert!(matches!(community.user_favorites(42).await, Err(CatalogError::NotFound(_))));
    }
}
