//! `StoryRepo` implementation: stories, category associations, saves.
//!
//! The data mapping follows the relational model closely; lifecycle guards
//! are validated through the core transition function inside the same
//! transaction that applies the write.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use cp_core::error::{AppError, Result};
use cp_core::lifecycle::{PublishState, Transition};
use cp_core::models::{
    AuthorRef, Category, NewStory, Story, StoryFilter, StoryPatch, StoryRecord,
};
use cp_core::traits::StoryRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row};
use uuid::Uuid;

use crate::{blob_to_uuid, map_db_err, uuid_to_blob, SqliteStore};

fn story_from_row(row: &SqliteRow) -> Story {
    Story {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        title: row.get("title"),
        content: row.get("content"),
        summary: row.get("summary"),
        borough: row.get("borough"),
        thumbnail: row.get("thumbnail"),
        state: PublishState::from_flags(row.get("is_published"), row.get("is_radar")),
        is_recommended: row.get("is_recommended"),
        is_trashed: row.get("is_trashed"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl SqliteStore {
    /// Joins categories, author names, and the viewer's save rows onto a
    /// batch of story rows, three queries total regardless of batch size.
    async fn hydrate(
        &self,
        stories: Vec<Story>,
        viewer: Option<&str>,
    ) -> Result<Vec<StoryRecord>> {
        if stories.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Vec<u8>> = stories.iter().map(|s| uuid_to_blob(s.id)).collect();

        let mut qb = QueryBuilder::new(
            "SELECT sc.story_id AS story_id, c.id AS category_id, c.name AS name, \
             c.description AS description \
             FROM story_categories sc JOIN categories c ON c.id = sc.category_id \
             WHERE sc.story_id IN (",
        );
        let mut sep = qb.separated(", ");
        for id in &ids {
            sep.push_bind(id.clone());
        }
        sep.push_unseparated(") ORDER BY c.name ASC");
        let mut categories: HashMap<Uuid, Vec<Category>> = HashMap::new();
        for row in qb.build().fetch_all(&self.pool).await.map_err(map_db_err)? {
            let story_id = blob_to_uuid(row.get::<Vec<u8>, _>("story_id").as_slice());
            categories.entry(story_id).or_default().push(Category {
                id: blob_to_uuid(row.get::<Vec<u8>, _>("category_id").as_slice()),
                name: row.get("name"),
                description: row.get("description"),
            });
        }

        let author_ids: HashSet<String> =
            stories.iter().filter_map(|s| s.author_id.clone()).collect();
        let mut authors: HashMap<String, AuthorRef> = HashMap::new();
        if !author_ids.is_empty() {
            let mut qb =
                QueryBuilder::new("SELECT id, first_name, last_name FROM users WHERE id IN (");
            let mut sep = qb.separated(", ");
            for id in &author_ids {
                sep.push_bind(id.clone());
            }
            sep.push_unseparated(")");
            for row in qb.build().fetch_all(&self.pool).await.map_err(map_db_err)? {
                authors.insert(
                    row.get("id"),
                    AuthorRef {
                        first_name: row.get("first_name"),
                        last_name: row.get("last_name"),
                    },
                );
            }
        }

        let mut saved: HashSet<Uuid> = HashSet::new();
        if let Some(user) = viewer {
            let mut qb = QueryBuilder::new("SELECT story_id FROM saves WHERE user_id = ");
            qb.push_bind(user.to_string());
            qb.push(" AND story_id IN (");
            let mut sep = qb.separated(", ");
            for id in &ids {
                sep.push_bind(id.clone());
            }
            sep.push_unseparated(")");
            for row in qb.build().fetch_all(&self.pool).await.map_err(map_db_err)? {
                saved.insert(blob_to_uuid(row.get::<Vec<u8>, _>("story_id").as_slice()));
            }
        }

        Ok(stories
            .into_iter()
            .map(|story| {
                let author = story
                    .author_id
                    .as_ref()
                    .and_then(|id| authors.get(id).cloned());
                StoryRecord {
                    categories: categories.remove(&story.id).unwrap_or_default(),
                    author,
                    saved_by_viewer: saved.contains(&story.id),
                    story,
                }
            })
            .collect())
    }

    async fn record(&self, story: Story, viewer: Option<&str>) -> Result<StoryRecord> {
        Ok(self
            .hydrate(vec![story], viewer)
            .await?
            .pop()
            .expect("hydrate preserves its input length"))
    }

    async fn fetch_story(&self, id: Uuid) -> Result<Option<Story>> {
        let row = sqlx::query("SELECT * FROM stories WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(row.as_ref().map(story_from_row))
    }
}

#[async_trait]
impl StoryRepo for SqliteStore {
    /// Stories go live immediately; radar and recommended start cleared.
    async fn create_story(&self, story: &NewStory) -> Result<Story> {
        let author = sqlx::query("SELECT 1 FROM users WHERE id = ?")
            .bind(&story.author_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        if author.is_none() {
            return Err(AppError::NotFound("user".into(), story.author_id.clone()));
        }

        let now = Utc::now();
        let created = Story {
            id: Uuid::new_v4(),
            title: story.title.clone(),
            content: story.content.clone(),
            summary: story.summary.clone(),
            borough: story.borough.clone(),
            thumbnail: story.thumbnail.clone(),
            state: PublishState::Published,
            is_recommended: false,
            is_trashed: false,
            author_id: Some(story.author_id.clone()),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO stories \
             (id, title, content, summary, borough, thumbnail, is_published, is_radar, \
              is_recommended, is_trashed, author_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, 1, 0, 0, 0, ?, ?, ?)",
        )
        .bind(uuid_to_blob(created.id))
        .bind(&created.title)
        .bind(&created.content)
        .bind(&created.summary)
        .bind(&created.borough)
        .bind(&created.thumbnail)
        .bind(&created.author_id)
        .bind(created.created_at)
        .bind(created.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        Ok(created)
    }

    async fn get_story(&self, id: Uuid, viewer: Option<&str>) -> Result<Option<StoryRecord>> {
        match self.fetch_story(id).await? {
            Some(story) => Ok(Some(self.record(story, viewer).await?)),
            None => Ok(None),
        }
    }

    async fn list_stories(&self, filter: &StoryFilter) -> Result<Vec<StoryRecord>> {
        let mut qb = QueryBuilder::new("SELECT * FROM stories WHERE is_published = 1");
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            qb.push(" AND title LIKE ");
            qb.push_bind(format!("%{search}%"));
        }
        if !filter.boroughs.is_empty() {
            qb.push(" AND borough IN (");
            let mut sep = qb.separated(", ");
            for borough in &filter.boroughs {
                sep.push_bind(borough.clone());
            }
            sep.push_unseparated(")");
        }
        if !filter.categories.is_empty() {
            qb.push(
                " AND EXISTS (SELECT 1 FROM story_categories sc \
                 WHERE sc.story_id = stories.id AND sc.category_id IN (",
            );
            let mut sep = qb.separated(", ");
            for category in &filter.categories {
                sep.push_bind(uuid_to_blob(*category));
            }
            sep.push_unseparated("))");
        }
        qb.push(" ORDER BY created_at DESC");

        let rows = qb.build().fetch_all(&self.pool).await.map_err(map_db_err)?;
        let stories = rows.iter().map(story_from_row).collect();
        self.hydrate(stories, None).await
    }

    async fn list_hidden(&self) -> Result<Vec<StoryRecord>> {
        let rows = sqlx::query("SELECT * FROM stories WHERE is_published = 0 ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        self.hydrate(rows.iter().map(story_from_row).collect(), None)
            .await
    }

    /// A draft can hold the recommended flag, but only published stories
    /// surface here.
    async fn list_recommended(&self, limit: i64) -> Result<Vec<StoryRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM stories WHERE is_recommended = 1 AND is_published = 1 \
             ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        self.hydrate(rows.iter().map(story_from_row).collect(), None)
            .await
    }

    async fn list_saved(&self, user_id: &str) -> Result<Vec<StoryRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM stories \
             WHERE is_published = 1 \
             AND id IN (SELECT story_id FROM saves WHERE user_id = ?) \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        self.hydrate(rows.iter().map(story_from_row).collect(), None)
            .await
    }

    async fn update_story(&self, id: Uuid, patch: &StoryPatch) -> Result<()> {
        let result = sqlx::query(
            "UPDATE stories SET title = ?, content = ?, summary = ?, borough = ?, \
             thumbnail = COALESCE(?, thumbnail), updated_at = ? WHERE id = ?",
        )
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(&patch.summary)
        .bind(&patch.borough)
        .bind(&patch.thumbnail)
        .bind(Utc::now())
        .bind(uuid_to_blob(id))
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("story".into(), id.to_string()));
        }
        Ok(())
    }

    async fn unpublish(&self, id: Uuid) -> Result<()> {
        self.transition(id, Transition::Unpublish).await
    }

    async fn republish(&self, id: Uuid) -> Result<()> {
        self.transition(id, Transition::Republish).await
    }

    /// Radar singleton: clear-all-then-set-one inside one transaction, so no
    /// commit ever leaves two radar stories behind.
    async fn promote_radar(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let row = sqlx::query("SELECT is_published, is_radar FROM stories WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| AppError::NotFound("story".into(), id.to_string()))?;
        PublishState::from_flags(row.get("is_published"), row.get("is_radar"))
            .apply(Transition::PromoteRadar)?;

        sqlx::query("UPDATE stories SET is_radar = 0, updated_at = ? WHERE is_radar = 1")
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        sqlx::query("UPDATE stories SET is_radar = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(uuid_to_blob(id))
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;
        Ok(())
    }

    /// The one read that may write. The transaction re-checks the singleton
    /// before choosing, so a concurrent caller either sees the winner's pick
    /// or conflicts and retries at the service layer.
    async fn ensure_radar(&self) -> Result<Option<StoryRecord>> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let current = sqlx::query(
            "SELECT * FROM stories WHERE is_published = 1 AND is_radar = 1 LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?;
        if let Some(row) = current {
            let story = story_from_row(&row);
            tx.commit().await.map_err(map_db_err)?;
            return Ok(Some(self.record(story, None).await?));
        }

        // Preference order: recommended first, then any other published story.
        let mut candidate = sqlx::query(
            "SELECT * FROM stories WHERE is_published = 1 AND is_recommended = 1 \
             ORDER BY created_at DESC LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?;
        if candidate.is_none() {
            candidate = sqlx::query(
                "SELECT * FROM stories WHERE is_published = 1 AND is_recommended = 0 \
                 ORDER BY created_at DESC LIMIT 1",
            )
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_err)?;
        }

        let Some(row) = candidate else {
            tx.commit().await.map_err(map_db_err)?;
            return Ok(None);
        };
        let mut story = story_from_row(&row);

        sqlx::query("UPDATE stories SET is_radar = 1, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(uuid_to_blob(story.id))
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        tx.commit().await.map_err(map_db_err)?;

        story.state = PublishState::PublishedRadar;
        Ok(Some(self.record(story, None).await?))
    }

    async fn set_recommended(&self, id: Uuid, recommended: bool) -> Result<()> {
        let result = sqlx::query("UPDATE stories SET is_recommended = ?, updated_at = ? WHERE id = ?")
            .bind(recommended)
            .bind(Utc::now())
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("story".into(), id.to_string()));
        }
        Ok(())
    }

    /// Children go first: association and save rows, then the story row.
    async fn delete_story(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let row = sqlx::query(
            "SELECT is_published, is_radar, is_recommended FROM stories WHERE id = ?",
        )
        .bind(uuid_to_blob(id))
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| AppError::NotFound("story".into(), id.to_string()))?;

        let state = PublishState::from_flags(row.get("is_published"), row.get("is_radar"));
        let recommended: bool = row.get("is_recommended");
        if !cp_core::lifecycle::can_hard_delete(state, recommended) {
            return Err(AppError::DeleteGuardViolation);
        }

        sqlx::query("DELETE FROM story_categories WHERE story_id = ?")
            .bind(uuid_to_blob(id))
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        sqlx::query("DELETE FROM saves WHERE story_id = ?")
            .bind(uuid_to_blob(id))
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        sqlx::query("DELETE FROM stories WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;
        Ok(())
    }

    /// Full replace: delete-then-insert in one transaction, so readers never
    /// observe a durable half-replaced set. Duplicate ids collapse on the
    /// pair primary key.
    async fn replace_categories(&self, story_id: Uuid, category_ids: &[Uuid]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        sqlx::query("SELECT 1 FROM stories WHERE id = ?")
            .bind(uuid_to_blob(story_id))
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| AppError::NotFound("story".into(), story_id.to_string()))?;

        for category_id in category_ids {
            let exists = sqlx::query("SELECT 1 FROM categories WHERE id = ?")
                .bind(uuid_to_blob(*category_id))
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_err)?;
            if exists.is_none() {
                // Dropping the transaction rolls the replace back whole.
                return Err(AppError::NotFound(
                    "category".into(),
                    category_id.to_string(),
                ));
            }
        }

        sqlx::query("DELETE FROM story_categories WHERE story_id = ?")
            .bind(uuid_to_blob(story_id))
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        for category_id in category_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO story_categories (story_id, category_id) VALUES (?, ?)",
            )
            .bind(uuid_to_blob(story_id))
            .bind(uuid_to_blob(*category_id))
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        }

        tx.commit().await.map_err(map_db_err)?;
        Ok(())
    }

    async fn save_story(&self, story_id: Uuid, user_id: &str) -> Result<()> {
        self.fetch_story(story_id)
            .await?
            .ok_or_else(|| AppError::NotFound("story".into(), story_id.to_string()))?;
        sqlx::query("INSERT OR IGNORE INTO saves (story_id, user_id) VALUES (?, ?)")
            .bind(uuid_to_blob(story_id))
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn unsave_story(&self, story_id: Uuid, user_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM saves WHERE story_id = ? AND user_id = ?")
            .bind(uuid_to_blob(story_id))
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }
}

impl SqliteStore {
    /// Shared read-validate-write cycle for the publish transitions.
    async fn transition(&self, id: Uuid, transition: Transition) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;

        let row = sqlx::query("SELECT is_published, is_radar FROM stories WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| AppError::NotFound("story".into(), id.to_string()))?;

        let next = PublishState::from_flags(row.get("is_published"), row.get("is_radar"))
            .apply(transition)?;

        sqlx::query("UPDATE stories SET is_published = ?, is_radar = ?, updated_at = ? WHERE id = ?")
            .bind(next.is_published())
            .bind(next.is_radar())
            .bind(Utc::now())
            .bind(uuid_to_blob(id))
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_store;
    use cp_core::traits::{CategoryRepo, UserRepo};

    async fn seed_author(store: &SqliteStore) -> String {
        store
            .create_user("author-1", "author@example.com")
            .await
            .unwrap();
        "author-1".to_string()
    }

    async fn seed_story(store: &SqliteStore, title: &str) -> Story {
        store
            .create_story(&NewStory {
                title: title.into(),
                content: "<p>body</p>".into(),
                summary: "summary".into(),
                borough: "Bronx".into(),
                thumbnail: "https://cdn.test/t.jpg".into(),
                author_id: "author-1".into(),
            })
            .await
            .unwrap()
    }

    async fn radar_count(store: &SqliteStore) -> i64 {
        sqlx::query("SELECT COUNT(*) AS n FROM stories WHERE is_radar = 1")
            .fetch_one(&store.pool)
            .await
            .unwrap()
            .get("n")
    }

    async fn association_count(store: &SqliteStore, story_id: Uuid) -> i64 {
        sqlx::query("SELECT COUNT(*) AS n FROM story_categories WHERE story_id = ?")
            .bind(uuid_to_blob(story_id))
            .fetch_one(&store.pool)
            .await
            .unwrap()
            .get("n")
    }

    #[tokio::test]
    async fn create_requires_existing_author() {
        let store = test_store().await;
        let err = store
            .create_story(&NewStory {
                title: "t".into(),
                content: "c".into(),
                summary: "s".into(),
                borough: "Queens".into(),
                thumbnail: "u".into(),
                author_id: "ghost".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(kind, _) if kind == "user"));
    }

    #[tokio::test]
    async fn promotion_keeps_the_radar_singleton() {
        let store = test_store().await;
        seed_author(&store).await;
        let a = seed_story(&store, "a").await;
        let b = seed_story(&store, "b").await;

        store.promote_radar(a.id).await.unwrap();
        store.promote_radar(b.id).await.unwrap();
        assert_eq!(radar_count(&store).await, 1);
        assert!(store.fetch_story(b.id).await.unwrap().unwrap().state.is_radar());
        assert!(!store.fetch_story(a.id).await.unwrap().unwrap().state.is_radar());

        // Promoting twice is idempotent: still exactly one radar story.
        store.promote_radar(b.id).await.unwrap();
        assert_eq!(radar_count(&store).await, 1);
    }

    #[tokio::test]
    async fn radar_requires_publication() {
        let store = test_store().await;
        seed_author(&store).await;
        let story = seed_story(&store, "draft").await;
        store.unpublish(story.id).await.unwrap();

        let err = store.promote_radar(story.id).await.unwrap_err();
        assert!(matches!(err, AppError::RadarRequiresPublished));
    }

    #[tokio::test]
    async fn unpublish_guards_the_radar_story() {
        let store = test_store().await;
        seed_author(&store).await;
        let story = seed_story(&store, "radar").await;
        store.promote_radar(story.id).await.unwrap();

        let err = store.unpublish(story.id).await.unwrap_err();
        assert!(matches!(err, AppError::RadarUnpublishConflict));
        // Still published, still radar.
        let stored = store.fetch_story(story.id).await.unwrap().unwrap();
        assert_eq!(stored.state, PublishState::PublishedRadar);
    }

    #[tokio::test]
    async fn ensure_radar_prefers_recommended_and_is_idempotent() {
        let store = test_store().await;
        seed_author(&store).await;
        let plain = seed_story(&store, "plain").await;
        let recommended = seed_story(&store, "recommended").await;
        store.set_recommended(recommended.id, true).await.unwrap();

        let picked = store.ensure_radar().await.unwrap().unwrap();
        assert_eq!(picked.story.id, recommended.id);
        assert_eq!(radar_count(&store).await, 1);

        // Second call observes the singleton and performs no second write.
        let again = store.ensure_radar().await.unwrap().unwrap();
        assert_eq!(again.story.id, recommended.id);
        assert_eq!(radar_count(&store).await, 1);
        let _ = plain;
    }

    #[tokio::test]
    async fn ensure_radar_falls_back_to_any_published() {
        let store = test_store().await;
        seed_author(&store).await;
        let story = seed_story(&store, "only").await;

        let picked = store.ensure_radar().await.unwrap().unwrap();
        assert_eq!(picked.story.id, story.id);
        assert!(picked.story.state.is_radar());
    }

    #[tokio::test]
    async fn ensure_radar_with_nothing_published_is_none() {
        let store = test_store().await;
        seed_author(&store).await;
        let story = seed_story(&store, "hidden").await;
        store.unpublish(story.id).await.unwrap();

        assert!(store.ensure_radar().await.unwrap().is_none());
        assert_eq!(radar_count(&store).await, 0);
    }

    #[tokio::test]
    async fn delete_guard_and_cascade() {
        let store = test_store().await;
        seed_author(&store).await;
        let story = seed_story(&store, "victim").await;
        let cat = store.create_category("Portraits", "people").await.unwrap();
        store.replace_categories(story.id, &[cat.id]).await.unwrap();

        // Published stories cannot be deleted.
        let err = store.delete_story(story.id).await.unwrap_err();
        assert!(matches!(err, AppError::DeleteGuardViolation));

        // Nor recommended drafts.
        store.unpublish(story.id).await.unwrap();
        store.set_recommended(story.id, true).await.unwrap();
        let err = store.delete_story(story.id).await.unwrap_err();
        assert!(matches!(err, AppError::DeleteGuardViolation));
        assert!(store.fetch_story(story.id).await.unwrap().is_some());

        // A plain draft goes, associations first.
        store.set_recommended(story.id, false).await.unwrap();
        store.delete_story(story.id).await.unwrap();
        assert!(store.fetch_story(story.id).await.unwrap().is_none());
        assert_eq!(association_count(&store, story.id).await, 0);

        let err = store.delete_story(story.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }

    #[tokio::test]
    async fn replace_categories_full_semantics() {
        let store = test_store().await;
        seed_author(&store).await;
        let story = seed_story(&store, "s").await;
        let a = store.create_category("A", "").await.unwrap();
        let b = store.create_category("B", "").await.unwrap();

        // Duplicates collapse.
        store
            .replace_categories(story.id, &[a.id, b.id, a.id])
            .await
            .unwrap();
        assert_eq!(association_count(&store, story.id).await, 2);

        // Unknown id aborts the whole replace, leaving {A, B} untouched.
        let err = store
            .replace_categories(story.id, &[a.id, Uuid::new_v4()])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(kind, _) if kind == "category"));
        assert_eq!(association_count(&store, story.id).await, 2);

        // Empty set clears everything.
        store.replace_categories(story.id, &[]).await.unwrap();
        assert_eq!(association_count(&store, story.id).await, 0);
    }

    #[tokio::test]
    async fn list_filters_compose() {
        let store = test_store().await;
        seed_author(&store).await;
        let bronx = seed_story(&store, "Midnight Market").await;
        let queens = store
            .create_story(&NewStory {
                title: "Morning Ferry".into(),
                content: "c".into(),
                summary: "s".into(),
                borough: "Queens".into(),
                thumbnail: "u".into(),
                author_id: "author-1".into(),
            })
            .await
            .unwrap();
        let hidden = seed_story(&store, "Midnight Hidden").await;
        store.unpublish(hidden.id).await.unwrap();
        let cat = store.create_category("Food", "").await.unwrap();
        store.replace_categories(bronx.id, &[cat.id]).await.unwrap();

        // Published only.
        let all = store.list_stories(&StoryFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let by_search = store
            .list_stories(&StoryFilter {
                search: Some("midnight".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].story.id, bronx.id);

        let by_borough = store
            .list_stories(&StoryFilter {
                boroughs: vec!["Queens".into()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_borough.len(), 1);
        assert_eq!(by_borough[0].story.id, queens.id);

        let by_category = store
            .list_stories(&StoryFilter {
                categories: vec![cat.id],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].story.id, bronx.id);
        assert_eq!(by_category[0].categories.len(), 1);

        let hidden_list = store.list_hidden().await.unwrap();
        assert_eq!(hidden_list.len(), 1);
        assert_eq!(hidden_list[0].story.id, hidden.id);
    }

    #[tokio::test]
    async fn recommended_listing_shows_published_only() {
        let store = test_store().await;
        seed_author(&store).await;
        let live = seed_story(&store, "live").await;
        let draft = seed_story(&store, "draft").await;
        store.set_recommended(live.id, true).await.unwrap();
        store.set_recommended(draft.id, true).await.unwrap();
        store.unpublish(draft.id).await.unwrap();

        let listed = store.list_recommended(4).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].story.id, live.id);
        // The flag itself survives on the draft.
        assert!(
            store
                .fetch_story(draft.id)
                .await
                .unwrap()
                .unwrap()
                .is_recommended
        );
    }

    #[tokio::test]
    async fn saves_round_trip_and_annotation() {
        let store = test_store().await;
        seed_author(&store).await;
        let story = seed_story(&store, "bookmarkable").await;

        store.save_story(story.id, "reader-1").await.unwrap();
        // Saving again is a no-op, not a conflict.
        store.save_story(story.id, "reader-1").await.unwrap();

        let seen = store.get_story(story.id, Some("reader-1")).await.unwrap().unwrap();
        assert!(seen.saved_by_viewer);
        let other = store.get_story(story.id, Some("reader-2")).await.unwrap().unwrap();
        assert!(!other.saved_by_viewer);

        let saved = store.list_saved("reader-1").await.unwrap();
        assert_eq!(saved.len(), 1);

        store.unsave_story(story.id, "reader-1").await.unwrap();
        assert!(store.list_saved("reader-1").await.unwrap().is_empty());

        let err = store.save_story(Uuid::new_v4(), "reader-1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }

    #[tokio::test]
    async fn edit_keeps_thumbnail_when_patch_has_none() {
        let store = test_store().await;
        seed_author(&store).await;
        let story = seed_story(&store, "original").await;

        store
            .update_story(
                story.id,
                &StoryPatch {
                    title: "edited".into(),
                    content: "c2".into(),
                    summary: "s2".into(),
                    borough: "Harlem".into(),
                    thumbnail: None,
                },
            )
            .await
            .unwrap();

        let stored = store.fetch_story(story.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "edited");
        assert_eq!(stored.thumbnail, "https://cdn.test/t.jpg");
        assert!(stored.updated_at >= stored.created_at);

        let err = store
            .update_story(
                Uuid::new_v4(),
                &StoryPatch {
                    title: "t".into(),
                    content: "c".into(),
                    summary: "s".into(),
                    borough: "b".into(),
                    thumbnail: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }
}
