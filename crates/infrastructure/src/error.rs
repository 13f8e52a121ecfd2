use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// 保存済みの行がドメインの不変条件を満たしていない
    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}
