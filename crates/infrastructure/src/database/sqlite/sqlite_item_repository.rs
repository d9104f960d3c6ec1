use async_trait::async_trait;
use item_core::{Item, ItemRepository, ItemResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, instrument};

use crate::error_handling::{RepositoryErrorHelpers, RepositoryOperation};
use crate::item_context;

const ITEM_COLUMNS: &str = "id, name, description, status, email";

/// SQLite Item仓储实现
pub struct SqliteItemRepository {
    pool: SqlitePool,
}

impl SqliteItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 创建嵌入式SQLite仓储（文件不存在时自动创建并执行迁移）
    pub async fn new_embedded(database_url: &str) -> ItemResult<Self> {
        use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
        use std::str::FromStr;

        debug!("Creating embedded SQLite item repository at: {}", database_url);

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .connect_with(connect_options)
            .await?;

        Self::run_migrations(&pool).await?;

        debug!("Successfully created embedded SQLite item repository");
        Ok(Self { pool })
    }

    /// 运行数据库迁移
    pub async fn run_migrations(pool: &SqlitePool) -> ItemResult<()> {
        debug!("Running SQLite database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                status TEXT,
                email TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| {
            RepositoryErrorHelpers::item_database_error(item_context!(RepositoryOperation::Migrate), e)
        })?;

        debug!("SQLite database migrations completed");
        Ok(())
    }

    fn row_to_item(row: &SqliteRow) -> ItemResult<Item> {
        Ok(Item {
            id: Some(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            status: row.try_get("status")?,
            email: row.try_get("email")?,
        })
    }
}

#[async_trait]
impl ItemRepository for SqliteItemRepository {
    #[instrument(skip(self))]
    async fn list_all(&self) -> ItemResult<Vec<Item>> {
        let context = item_context!(RepositoryOperation::Query);

        let rows = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::item_database_error(context.clone(), e))?;

        let items = rows
            .iter()
            .map(Self::row_to_item)
            .collect::<ItemResult<Vec<_>>>()?;

        RepositoryErrorHelpers::log_operation_success(
            &context,
            "Item列表",
            Some(&format!("共 {} 条", items.len())),
        );
        Ok(items)
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn get_by_id(&self, id: i64) -> ItemResult<Option<Item>> {
        let context = item_context!(RepositoryOperation::Read, item_id = id);

        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::item_database_error(context.clone(), e))?;

        match row {
            Some(row) => {
                let item = Self::row_to_item(&row)?;
                RepositoryErrorHelpers::log_operation_success(
                    &context,
                    &context.entity_description(),
                    None,
                );
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, item), fields(item_id = ?item.id, item_name = %item.name))]
    async fn upsert(&self, item: &Item) -> ItemResult<Item> {
        let row = match item.id {
            None => {
                let context = item_context!(RepositoryOperation::Create, item_name = item.name);
                sqlx::query(&format!(
                    "INSERT INTO items (name, description, status, email) VALUES (?, ?, ?, ?) RETURNING {ITEM_COLUMNS}"
                ))
                .bind(&item.name)
                .bind(&item.description)
                .bind(&item.status)
                .bind(&item.email)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| RepositoryErrorHelpers::item_database_error(context, e))?
            }
            Some(id) => {
                let context = item_context!(
                    RepositoryOperation::Upsert,
                    item_id = id,
                    item_name = item.name
                );
                sqlx::query(&format!(
                    r#"
                    INSERT INTO items (id, name, description, status, email)
                    VALUES (?, ?, ?, ?, ?)
                    ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        description = excluded.description,
                        status = excluded.status,
                        email = excluded.email
                    RETURNING {ITEM_COLUMNS}
                    "#
                ))
                .bind(id)
                .bind(&item.name)
                .bind(&item.description)
                .bind(&item.status)
                .bind(&item.email)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| RepositoryErrorHelpers::item_database_error(context, e))?
            }
        };

        let saved = Self::row_to_item(&row)?;
        debug!("保存Item成功: {}", saved.entity_description());
        Ok(saved)
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn delete_by_id(&self, id: i64) -> ItemResult<bool> {
        let context = item_context!(RepositoryOperation::Delete, item_id = id);

        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::item_database_error(context.clone(), e))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            RepositoryErrorHelpers::log_operation_success(
                &context,
                &context.entity_description(),
                None,
            );
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list_all_ids(&self) -> ItemResult<Vec<i64>> {
        let context = item_context!(RepositoryOperation::Query);

        let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM items ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::item_database_error(context, e))?;

        Ok(ids)
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn exists_by_id(&self, id: i64) -> ItemResult<bool> {
        let context = item_context!(RepositoryOperation::Read, item_id = id);

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM items WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::item_database_error(context, e))?;

        Ok(count > 0)
    }
}
