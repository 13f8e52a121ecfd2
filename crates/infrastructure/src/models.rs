use crate::error::StorageError;
use domain::{Todo, TodoId};
use sqlx::FromRow;

/// `todos` テーブルの1行
#[derive(Debug, Clone, FromRow)]
pub struct TodoRow {
    pub id: String,
    pub name: String,
    pub completed: bool,
}

impl TryFrom<TodoRow> for Todo {
    type Error = StorageError;

    fn try_from(row: TodoRow) -> Result<Self, Self::Error> {
        let id = TodoId::parse(&row.id)
            .map_err(|e| StorageError::CorruptRow(format!("todos.id: {e}")))?;
        Ok(Todo {
            id,
            name: row.name,
            completed: row.completed,
        })
    }
}
