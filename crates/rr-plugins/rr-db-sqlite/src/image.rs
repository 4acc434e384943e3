use crate::{board_from_row, insert_error, inserted_id, persisted_id, BOARD_COLUMNS, HOST_COLUMNS};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rr_core::models::Image;
use rr_core::traits::ImageRepo;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

pub struct SqliteImageRepo {
    pool: SqlitePool,
}

impl SqliteImageRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn select(filter: &str) -> String {
        format!(
            "SELECT i.id, i.title, i.url, i.local_path, i.date, {BOARD_COLUMNS}, {HOST_COLUMNS} \
             FROM image i \
             JOIN board b ON b.id = i.board_id \
             JOIN host h ON h.id = b.host_id {filter} ORDER BY i.id"
        )
    }
}

fn map_image(row: &SqliteRow) -> sqlx::Result<Image> {
    Ok(Image {
        id: Some(row.try_get("id")?),
        title: row.try_get("title")?,
        url: row.try_get("url")?,
        local_path: row.try_get("local_path")?,
        date: row.try_get("date")?,
        board: board_from_row(row)?,
    })
}

#[async_trait]
impl ImageRepo for SqliteImageRepo {
    async fn find_all(&self) -> anyhow::Result<Vec<Image>> {
        let rows = sqlx::query(&Self::select("")).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(map_image).collect::<sqlx::Result<_>>()?)
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Image>> {
        let row = sqlx::query(&Self::select("WHERE i.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_image).transpose()?)
    }

    async fn find_by_board_id(&self, board_id: i32) -> anyhow::Result<Vec<Image>> {
        let rows = sqlx::query(&Self::select("WHERE i.board_id = ?"))
            .bind(board_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(map_image).collect::<sqlx::Result<_>>()?)
    }

    async fn find_by_title(&self, title: &str) -> anyhow::Result<Vec<Image>> {
        let rows = sqlx::query(&Self::select("WHERE i.title = ?"))
            .bind(title)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(map_image).collect::<sqlx::Result<_>>()?)
    }

    async fn find_by_url(&self, url: &str) -> anyhow::Result<Option<Image>> {
        let row = sqlx::query(&Self::select("WHERE i.url = ?"))
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_image).transpose()?)
    }

    async fn find_by_date(&self, date: DateTime<Utc>) -> anyhow::Result<Vec<Image>> {
        let rows = sqlx::query(&Self::select("WHERE i.date = ?"))
            .bind(date)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(map_image).collect::<sqlx::Result<_>>()?)
    }

    async fn find_by_local_path(&self, local_path: &str) -> anyhow::Result<Option<Image>> {
        // local_path is not unique; the first match wins.
        let row = sqlx::query(&format!("{} LIMIT 1", Self::select("WHERE i.local_path = ?")))
            .bind(local_path)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_image).transpose()?)
    }

    async fn insert(&self, image: &Image) -> anyhow::Result<Image> {
        let board_id = persisted_id(image.board.id, "board")?;
        let result = sqlx::query(
            "INSERT INTO image (id, board_id, title, url, local_path, date) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(image.id)
        .bind(board_id)
        .bind(&image.title)
        .bind(&image.url)
        .bind(&image.local_path)
        .bind(image.date)
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, "image", image.id, || format!("Url: \"{}\" already exists", image.url)))?;

        let id = inserted_id(&result)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("image {id} vanished after insert"))
    }

    async fn delete(&self, id: i32) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM image WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing;
    use chrono::{TimeZone, Utc};
    use rr_core::error::AppError;
    use rr_core::models::{Board, Image};
    use rr_core::traits::ImageRepo;

    fn image(board: &Board, url: &str) -> Image {
        Image {
            id: None,
            title: "JUnit".into(),
            url: url.into(),
            local_path: "localPath".into(),
            date: Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap(),
            board: board.clone(),
        }
    }

    #[tokio::test]
    async fn images_come_back_with_board_and_host() {
        let store = testing::store().await;
        let host = testing::host(&store, "reddit").await;
        let board = testing::board(&store, &host, "https://www.reddit.com/r/pics").await;
        let saved = store.images().insert(&image(&board, "testUrl")).await.unwrap();

        assert!(saved.id.is_some());
        assert_eq!(saved.board, board);
        assert_eq!(saved.board.host, host);

        let repo = store.images();
        assert_eq!(repo.find_by_url("testUrl").await.unwrap(), Some(saved.clone()));
        assert_eq!(repo.find_by_local_path("localPath").await.unwrap(), Some(saved.clone()));
        assert_eq!(repo.find_by_title("JUnit").await.unwrap(), vec![saved.clone()]);
        assert_eq!(repo.find_by_date(saved.date).await.unwrap(), vec![saved.clone()]);
        assert_eq!(repo.find_by_board_id(board.id.unwrap()).await.unwrap(), vec![saved]);
    }

    #[tokio::test]
    async fn duplicate_url_is_a_conflict() {
        let store = testing::store().await;
        let host = testing::host(&store, "reddit").await;
        let board = testing::board(&store, &host, "https://www.reddit.com/r/pics").await;
        store.images().insert(&image(&board, "testUrl")).await.unwrap();

        let err = store.images().insert(&image(&board, "testUrl")).await.unwrap_err();
        assert_eq!(
            err.downcast::<AppError>().unwrap(),
            AppError::Conflict("Url: \"testUrl\" already exists".into())
        );
    }

    #[tokio::test]
    async fn delete_leaves_other_images() {
        let store = testing::store().await;
        let host = testing::host(&store, "reddit").await;
        let board = testing::board(&store, &host, "https://www.reddit.com/r/pics").await;
        let a = store.images().insert(&image(&board, "a")).await.unwrap();
        let b = store.images().insert(&image(&board, "b")).await.unwrap();

        store.images().delete(a.id.unwrap()).await.unwrap();
        assert_eq!(store.images().find_all().await.unwrap(), vec![b]);
    }
}
