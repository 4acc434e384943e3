use crate::{host_from_row, insert_error, inserted_id, HOST_COLUMNS};
use async_trait::async_trait;
use rr_core::models::Host;
use rr_core::traits::HostRepo;
use sqlx::sqlite::SqlitePool;

pub struct SqliteHostRepo {
    pool: SqlitePool,
}

impl SqliteHostRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, filter: &str, value: &str) -> anyhow::Result<Option<Host>> {
        let sql = format!("SELECT {HOST_COLUMNS} FROM host h WHERE {filter} = ?");
        let row = sqlx::query(&sql).bind(value).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(host_from_row).transpose()?)
    }
}

#[async_trait]
impl HostRepo for SqliteHostRepo {
    async fn find_all(&self) -> anyhow::Result<Vec<Host>> {
        let sql = format!("SELECT {HOST_COLUMNS} FROM host h ORDER BY h.id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(host_from_row).collect::<sqlx::Result<_>>()?)
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Host>> {
        let sql = format!("SELECT {HOST_COLUMNS} FROM host h WHERE h.id = ?");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(host_from_row).transpose()?)
    }

    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Host>> {
        self.find_one("h.name", name).await
    }

    async fn find_by_url(&self, url: &str) -> anyhow::Result<Option<Host>> {
        // url is not unique for hosts; the first match wins.
        let sql = format!("SELECT {HOST_COLUMNS} FROM host h WHERE h.url = ? ORDER BY h.id LIMIT 1");
        let row = sqlx::query(&sql).bind(url).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(host_from_row).transpose()?)
    }

    async fn find_by_extraction_type(&self, extraction_type: &str) -> anyhow::Result<Vec<Host>> {
        let sql = format!("SELECT {HOST_COLUMNS} FROM host h WHERE h.extraction_type = ? ORDER BY h.id");
        let rows = sqlx::query(&sql).bind(extraction_type).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(host_from_row).collect::<sqlx::Result<_>>()?)
    }

    async fn insert(&self, host: &Host) -> anyhow::Result<Host> {
        let result = sqlx::query("INSERT INTO host (id, name, url, extraction_type) VALUES (?, ?, ?, ?)")
            .bind(host.id)
            .bind(&host.name)
            .bind(&host.url)
            .bind(&host.extraction_type)
            .execute(&self.pool)
            .await
            .map_err(|e| insert_error(e, "host", host.id, || format!("Name: \"{}\" already exists", host.name)))?;

        let id = inserted_id(&result)?;
        self.find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("host {id} vanished after insert"))
    }

    async fn delete(&self, id: i32) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM host WHERE id = ?")
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
    use rr_core::models::Host;
    use rr_core::traits::HostRepo;

    #[tokio::test]
    async fn insert_assigns_id_and_finders_match() {
        let store = testing::store().await;
        let host = testing::host(&store, "reddit").await;
        assert!(host.id.is_some());

        let repo = store.hosts();
        assert_eq!(repo.find_by_id(host.id.unwrap()).await.unwrap(), Some(host.clone()));
        assert_eq!(repo.find_by_name("reddit").await.unwrap(), Some(host.clone()));
        assert_eq!(repo.find_by_url("http://h").await.unwrap(), Some(host.clone()));
        assert_eq!(repo.find_by_extraction_type("json").await.unwrap(), vec![host]);
    }

    #[tokio::test]
    async fn misses_are_none_or_empty() {
        let store = testing::store().await;
        let repo = store.hosts();
        assert_eq!(repo.find_by_id(404).await.unwrap(), None);
        assert_eq!(repo.find_by_name("nobody").await.unwrap(), None);
        assert!(repo.find_by_extraction_type("xml").await.unwrap().is_empty());
        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_name_is_a_conflict() {
        let store = testing::store().await;
        let host = testing::host(&store, "reddit").await;
        let mut dup = host.clone();
        dup.id = None;

        let err = store.hosts().insert(&dup).await.unwrap_err();
        assert_eq!(
            err.downcast::<AppError>().unwrap(),
            AppError::Conflict("Name: \"reddit\" already exists".into())
        );
    }

    #[tokio::test]
    async fn taken_id_is_a_conflict_on_the_id() {
        let store = testing::store().await;
        let host = testing::host(&store, "reddit").await;
        let mut dup = host.clone();
        dup.name = "imgur".into();

        let err = store.hosts().insert(&dup).await.unwrap_err();
        assert_eq!(
            err.downcast::<AppError>().unwrap(),
            AppError::Conflict(format!("ID: \"{}\" already exists", host.id.unwrap()))
        );
    }

    #[tokio::test]
    async fn rowid_beyond_i32_is_an_error() {
        let store = testing::store().await;
        sqlx::query("INSERT INTO host (id, name, url, extraction_type) VALUES (?, 'last', 'http://h', 'json')")
            .bind(i64::from(i32::MAX))
            .execute(store.pool())
            .await
            .unwrap();

        let next = Host {
            id: None,
            name: "overflow".into(),
            url: "http://h".into(),
            extraction_type: "json".into(),
        };
        let err = store.hosts().insert(&next).await.unwrap_err();
        assert!(err.to_string().contains("does not fit an id"), "{err}");
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let store = testing::store().await;
        let host = testing::host(&store, "reddit").await;
        store.hosts().delete(host.id.unwrap()).await.unwrap();
        assert!(store.hosts().find_all().await.unwrap().is_empty());
    }
}
