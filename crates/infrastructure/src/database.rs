use crate::error::StorageError;
use shared::Config;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// 設定からコネクションプールを作成する
///
/// インメモリDBは接続ごとに別のDBになるため、接続数を1に固定し破棄もしない。
pub async fn connect(config: &Config) -> Result<SqlitePool, StorageError> {
    let in_memory = config.database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    let mut pool_options = SqlitePoolOptions::new().acquire_timeout(config.acquire_timeout);
    pool_options = if in_memory {
        pool_options
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        pool_options.max_connections(config.max_connections)
    };

    debug!(database_url = %config.database_url, "Connecting to database");
    let pool = pool_options.connect_with(options).await?;
    info!(
        max_connections = pool.options().get_max_connections(),
        "Database pool ready"
    );

    Ok(pool)
}

/// テスト・ローカル実行用のインメモリDB（マイグレーション適用済み）
pub async fn connect_in_memory() -> Result<SqlitePool, StorageError> {
    let config = Config {
        database_url: IN_MEMORY_URL.to_string(),
        ..Config::default()
    };
    let pool = connect(&config).await?;
    migrate(&pool).await?;
    Ok(pool)
}

/// 埋め込みマイグレーションを適用する
pub async fn migrate(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
