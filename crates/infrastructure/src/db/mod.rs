//! 数据库连接与Repository实现

use sqlx::{Pool, Postgres};
use tracing::info;

pub mod repositories;

pub type DbPool = Pool<Postgres>;

pub struct Db;

impl Db {
    pub async fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool, sqlx::Error> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_size)
            .connect(database_url)
            .await?;
        info!(max_size, "数据库连接池已建立");
        Ok(pool)
    }
}
