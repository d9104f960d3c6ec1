use async_trait::async_trait;
use item_core::{Item, ItemRepository, ItemResult};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::{debug, instrument};

use crate::error_handling::{RepositoryErrorHelpers, RepositoryOperation};
use crate::item_context;

/// 显式ID写入后对齐 `items.id` 序列，ID落在序列已分配范围内时不做任何事
const SEQUENCE_REALIGN_SQL: &str = r#"
    SELECT setval('items_id_seq', $1)
    FROM items_id_seq
    WHERE $1 >= CASE WHEN is_called THEN last_value + 1 ELSE last_value END
"#;

/// PostgreSQL Item仓储实现
pub struct PostgresItemRepository {
    pool: PgPool,
}

impl PostgresItemRepository {
    /// 创建新的PostgreSQL Item仓储
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 运行数据库迁移
    pub async fn run_migrations(pool: &PgPool) -> ItemResult<()> {
        debug!("Running PostgreSQL database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id BIGSERIAL PRIMARY KEY,
                name VARCHAR(50) NOT NULL,
                description TEXT,
                status VARCHAR(64),
                email VARCHAR(255) NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| {
            RepositoryErrorHelpers::item_database_error(item_context!(RepositoryOperation::Migrate), e)
        })?;

        debug!("PostgreSQL database migrations completed");
        Ok(())
    }

    /// 将数据库行转换为Item模型
    fn row_to_item(row: &PgRow) -> ItemResult<Item> {
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
impl ItemRepository for PostgresItemRepository {
    /// 获取全部Item
    #[instrument(skip(self))]
    async fn list_all(&self) -> ItemResult<Vec<Item>> {
        let context = item_context!(RepositoryOperation::Query);

        let rows = sqlx::query("SELECT id, name, description, status, email FROM items ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::item_database_error(context, e))?;

        rows.iter().map(Self::row_to_item).collect()
    }

    /// 根据ID获取Item
    #[instrument(skip(self), fields(item_id = %id))]
    async fn get_by_id(&self, id: i64) -> ItemResult<Option<Item>> {
        let context = item_context!(RepositoryOperation::Read, item_id = id);

        let row = sqlx::query("SELECT id, name, description, status, email FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::item_database_error(context, e))?;

        row.as_ref().map(Self::row_to_item).transpose()
    }

    /// 保存Item
    #[instrument(skip(self, item), fields(item_id = ?item.id, item_name = %item.name))]
    async fn upsert(&self, item: &Item) -> ItemResult<Item> {
        let row = match item.id {
            None => {
                let context = item_context!(RepositoryOperation::Create, item_name = item.name);
                sqlx::query(
                    r#"
                    INSERT INTO items (name, description, status, email)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id, name, description, status, email
                    "#,
                )
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
                let mut tx = self.pool.begin().await.map_err(|e| {
                    RepositoryErrorHelpers::item_database_error(context.clone(), e)
                })?;

                let row = sqlx::query(
                    r#"
                    INSERT INTO items (id, name, description, status, email)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (id) DO UPDATE SET
                        name = EXCLUDED.name,
                        description = EXCLUDED.description,
                        status = EXCLUDED.status,
                        email = EXCLUDED.email
                    RETURNING id, name, description, status, email
                    "#,
                )
                .bind(id)
                .bind(&item.name)
                .bind(&item.description)
                .bind(&item.status)
                .bind(&item.email)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| RepositoryErrorHelpers::item_database_error(context.clone(), e))?;

                // 显式ID不会推进序列；只有ID不小于序列下一个值时才需要对齐
                sqlx::query(SEQUENCE_REALIGN_SQL)
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        RepositoryErrorHelpers::item_database_error(context.clone(), e)
                    })?;

                tx.commit()
                    .await
                    .map_err(|e| RepositoryErrorHelpers::item_database_error(context, e))?;

                row
            }
        };

        let saved = Self::row_to_item(&row)?;
        debug!("保存Item成功: {}", saved.entity_description());
        Ok(saved)
    }

    /// 根据ID删除Item
    #[instrument(skip(self), fields(item_id = %id))]
    async fn delete_by_id(&self, id: i64) -> ItemResult<bool> {
        let context = item_context!(RepositoryOperation::Delete, item_id = id);

        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::item_database_error(context, e))?;

        Ok(result.rows_affected() > 0)
    }

    /// 获取全部Item ID
    #[instrument(skip(self))]
    async fn list_all_ids(&self) -> ItemResult<Vec<i64>> {
        let context = item_context!(RepositoryOperation::Query);

        sqlx::query_scalar::<_, i64>("SELECT id FROM items ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::item_database_error(context, e))
    }

    /// 检查Item是否存在
    #[instrument(skip(self), fields(item_id = %id))]
    async fn exists_by_id(&self, id: i64) -> ItemResult<bool> {
        let context = item_context!(RepositoryOperation::Read, item_id = id);

        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM items WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::item_database_error(context, e))
    }
}
