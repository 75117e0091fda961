//! `CategoryRepo` implementation. Plain CRUD except delete, which clears the
//! association rows first within one transaction.

use async_trait::async_trait;
use cp_core::error::{AppError, Result};
use cp_core::models::Category;
use cp_core::traits::CategoryRepo;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::{blob_to_uuid, map_db_err, uuid_to_blob, SqliteStore};

fn category_from_row(row: &SqliteRow) -> Category {
    Category {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        name: row.get("name"),
        description: row.get("description"),
    }
}

#[async_trait]
impl CategoryRepo for SqliteStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT * FROM categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(rows.iter().map(category_from_row).collect())
    }

    async fn list_active_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT * FROM categories c \
             WHERE EXISTS (SELECT 1 FROM story_categories sc WHERE sc.category_id = c.id) \
             ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(rows.iter().map(category_from_row).collect())
    }

    async fn create_category(&self, name: &str, description: &str) -> Result<Category> {
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
        };
        sqlx::query("INSERT INTO categories (id, name, description) VALUES (?, ?, ?)")
            .bind(uuid_to_blob(category.id))
            .bind(&category.name)
            .bind(&category.description)
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        Ok(category)
    }

    async fn update_category(&self, id: Uuid, name: &str, description: &str) -> Result<()> {
        let result = sqlx::query("UPDATE categories SET name = ?, description = ? WHERE id = ?")
            .bind(name)
            .bind(description)
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("category".into(), id.to_string()));
        }
        Ok(())
    }

    async fn delete_category(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_err)?;
        sqlx::query("DELETE FROM story_categories WHERE category_id = ?")
            .bind(uuid_to_blob(id))
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("category".into(), id.to_string()));
        }
        tx.commit().await.map_err(map_db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_store;
    use cp_core::models::NewStory;
    use cp_core::traits::{StoryRepo, UserRepo};

    #[tokio::test]
    async fn listing_is_name_ordered() {
        let store = test_store().await;
        store.create_category("Zine", "").await.unwrap();
        store.create_category("Archive", "").await.unwrap();

        let names: Vec<String> = store
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Archive", "Zine"]);
    }

    #[tokio::test]
    async fn active_categories_require_an_attached_story() {
        let store = test_store().await;
        store.create_user("author-1", "a@example.com").await.unwrap();
        let used = store.create_category("Used", "").await.unwrap();
        store.create_category("Empty", "").await.unwrap();
        let story = store
            .create_story(&NewStory {
                title: "t".into(),
                content: "c".into(),
                summary: "s".into(),
                borough: "Bronx".into(),
                thumbnail: "u".into(),
                author_id: "author-1".into(),
            })
            .await
            .unwrap();
        store.replace_categories(story.id, &[used.id]).await.unwrap();

        let active = store.list_active_categories().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Used");
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let store = test_store().await;
        let cat = store.create_category("Edit Me", "old").await.unwrap();
        store.update_category(cat.id, "Edited", "new").await.unwrap();
        let listed = store.list_categories().await.unwrap();
        assert_eq!(listed[0].description, "new");

        store.delete_category(cat.id).await.unwrap();
        let err = store.delete_category(cat.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
        let err = store
            .update_category(Uuid::new_v4(), "x", "y")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(..)));
    }
}
