use crate::{board_from_row, insert_error, inserted_id, persisted_id, BOARD_COLUMNS, HOST_COLUMNS};
use async_trait::async_trait;
use rr_core::models::Board;
use rr_core::traits::BoardRepo;
use sqlx::sqlite::SqlitePool;

pub struct SqliteBoardRepo {
    pool: SqlitePool,
}

impl SqliteBoardRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn select(filter: &str) -> String {
        format!(
            "SELECT {BOARD_COLUMNS}, {HOST_COLUMNS} FROM board b \
             JOIN host h ON h.id = b.host_id {filter} ORDER BY b.id"
        )
    }
}

#[async_trait]
impl BoardRepo for SqliteBoardRepo {
    async fn find_all(&self) -> anyhow::Result<Vec<Board>> {
        let rows = sqlx::query(&Self::select("")).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(board_from_row).collect::<sqlx::Result<_>>()?)
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Board>> {
        let row = sqlx::query(&Self::select("WHERE b.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(board_from_row).transpose()?)
    }

    async fn find_by_host_id(&self, host_id: i32) -> anyhow::Result<Vec<Board>> {
        let rows = sqlx::query(&Self::select("WHERE b.host_id = ?"))
            .bind(host_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(board_from_row).collect::<sqlx::Result<_>>()?)
    }

    async fn find_by_url(&self, url: &str) -> anyhow::Result<Option<Board>> {
        let row = sqlx::query(&Self::select("WHERE b.url = ?"))
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(board_from_row).transpose()?)
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Vec<Board>> {
        let rows = sqlx::query(&Self::select("WHERE b.name = ?"))
            .bind(name)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(board_from_row).collect::<sqlx::Result<_>>()?)
    }

    async fn insert(&self, board: &Board) -> anyhow::Result<Board> {
        let host_id = persisted_id(board.host.id, "host")?;
        let result = sqlx::query("INSERT INTO board (id, host_id, url, name) VALUES (?, ?, ?, ?)")
            .bind(board.id)
            .bind(host_id)
            .bind(&board.url)
            .bind(&board.name)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, "board", board.id, || format!("Url: \"{}\" already exists", board.url)))?;

        let id = inserted_id(&result)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("board {id} vanished after insert"))
    }

    async fn delete(&self, id: i32) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM board WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::testing;
    use rr_core::error::AppError;
    use rr_core::models::{Board, Host};
    use rr_core::traits::BoardRepo;

    #[tokio::test]
    async fn boards_come_back_with_their_host() {
        let store = testing::store().await;
        let host = testing::host(&store, "reddit").await;
        let board = testing::board(&store, &host, "https://www.reddit.com/r/pics").await;

        assert_eq!(board.host, host);
        let repo = store.boards();
        assert_eq!(repo.find_by_url("https://www.reddit.com/r/pics").await.unwrap(), Some(board.clone()));
        assert_eq!(repo.find_by_host_id(host.id.unwrap()).await.unwrap(), vec![board.clone()]);
        assert_eq!(repo.find_by_name(&board.name).await.unwrap(), vec![board.clone()]);
        assert_eq!(repo.find_all().await.unwrap(), vec![board]);
    }

    #[tokio::test]
    async fn duplicate_url_is_a_conflict() {
        let store = testing::store().await;
        let host = testing::host(&store, "reddit").await;
        let board = testing::board(&store, &host, "https://www.reddit.com/r/pics").await;
        let dup = Board { id: None, name: "other".into(), ..board };

        let err = store.boards().insert(&dup).await.unwrap_err();
        assert_eq!(
            err.downcast::<AppError>().unwrap(),
            AppError::Conflict("Url: \"https://www.reddit.com/r/pics\" already exists".into())
        );
    }

    #[tokio::test]
    async fn unknown_host_violates_the_foreign_key() {
        let store = testing::store().await;
        let ghost = Host {
            id: Some(77),
            name: "ghost".into(),
            url: "http://h".into(),
            extraction_type: "json".into(),
        };
        let board = Board { id: None, name: "b".into(), url: "u".into(), host: ghost };

        let err = store.boards().insert(&board).await.unwrap_err();
        assert!(err.downcast_ref::<AppError>().is_none());
    }

    #[tokio::test]
    async fn unsaved_host_is_rejected() {
        let store = testing::store().await;
        let host = Host {
            id: None,
            name: "new".into(),
            url: "http://h".into(),
            extraction_type: "json".into(),
        };
        let board = Board { id: None, name: "b".into(), url: "u".into(), host };
        assert!(store.boards().insert(&board).await.is_err());
    }
}
