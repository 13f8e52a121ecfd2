use crate::error::StorageError;
use crate::models::TodoRow;
use domain::{CompletedFilter, Todo, TodoChanges, TodoId};
use sqlx::SqlitePool;

/// `todos` テーブルに対する単一ステートメントのCRUD
///
/// 各メソッドはプールから接続を1本取得し、文の完了とともに返却する。
#[derive(Clone)]
pub struct TodoRepository {
    pool: SqlitePool,
}

impl TodoRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// ID順（= 作成順）で一覧を返す。ページングなし
    pub async fn list(&self, filter: CompletedFilter) -> Result<Vec<Todo>, StorageError> {
        let rows = match filter.completed() {
            None => {
                sqlx::query_as::<_, TodoRow>("SELECT id, name, completed FROM todos ORDER BY id")
                    .fetch_all(&self.pool)
                    .await?
            }
            Some(completed) => {
                sqlx::query_as::<_, TodoRow>(
                    "SELECT id, name, completed FROM todos WHERE completed = ? ORDER BY id",
                )
                .bind(completed)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(Todo::try_from).collect()
    }

    pub async fn find(&self, id: &TodoId) -> Result<Option<Todo>, StorageError> {
        sqlx::query_as::<_, TodoRow>("SELECT id, name, completed FROM todos WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(Todo::try_from)
            .transpose()
    }

    pub async fn insert(&self, todo: &Todo) -> Result<Todo, StorageError> {
        let row = sqlx::query_as::<_, TodoRow>(
            "INSERT INTO todos (id, name, completed) VALUES (?, ?, ?) RETURNING id, name, completed",
        )
        .bind(todo.id.as_str())
        .bind(&todo.name)
        .bind(todo.completed)
        .fetch_one(&self.pool)
        .await?;

        Todo::try_from(row)
    }

    /// 指定されたフィールドだけを更新する。IDが存在しなければ None
    pub async fn update(
        &self,
        id: &TodoId,
        changes: &TodoChanges,
    ) -> Result<Option<Todo>, StorageError> {
        sqlx::query_as::<_, TodoRow>(
            r#"
            UPDATE todos
               SET name = COALESCE(?, name),
                   completed = COALESCE(?, completed)
             WHERE id = ?
            RETURNING id, name, completed
            "#,
        )
        .bind(changes.name.as_deref())
        .bind(changes.completed)
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(Todo::try_from)
        .transpose()
    }

    /// 存在確認はしない。削除された行数を返す
    pub async fn delete(&self, id: &TodoId) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connect_in_memory;
    use domain::NewTodo;

    async fn repository() -> TodoRepository {
        TodoRepository::new(connect_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        // Arrange
        let repo = repository().await;
        let todo = Todo::create(NewTodo::named("Buy milk")).unwrap();

        // Act
        let inserted = repo.insert(&todo).await.unwrap();
        let found = repo.find(&todo.id).await.unwrap();

        // Assert
        assert_eq!(inserted, todo);
        assert_eq!(found, Some(todo));
    }

    #[tokio::test]
    async fn test_find_unknown_id_is_none() {
        let repo = repository().await;
        assert_eq!(repo.find(&TodoId::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_merges_present_fields_only() {
        // Arrange
        let repo = repository().await;
        let todo = repo
            .insert(&Todo::create(NewTodo::named("Buy milk")).unwrap())
            .await
            .unwrap();

        // Act: completed だけを送る
        let updated = repo
            .update(
                &todo.id,
                &TodoChanges {
                    name: None,
                    completed: Some(true),
                },
            )
            .await
            .unwrap()
            .unwrap();

        // Assert: name は消えない
        assert_eq!(updated.name, "Buy milk");
        assert!(updated.completed);

        let renamed = repo
            .update(
                &todo.id,
                &TodoChanges {
                    name: Some("Buy oat milk".to_string()),
                    completed: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "Buy oat milk");
        assert!(renamed.completed);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_none() {
        let repo = repository().await;
        let changes = TodoChanges {
            name: Some("x".to_string()),
            completed: Some(true),
        };
        assert_eq!(repo.update(&TodoId::new(), &changes).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repo = repository().await;
        let todo = repo
            .insert(&Todo::create(NewTodo::named("Buy milk")).unwrap())
            .await
            .unwrap();

        assert_eq!(repo.delete(&todo.id).await.unwrap(), 1);
        assert_eq!(repo.delete(&todo.id).await.unwrap(), 0);
        assert_eq!(repo.find(&todo.id).await.unwrap(), None);
    }
}
