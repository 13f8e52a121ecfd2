use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock, PoisonError};
use ulid::{Generator, Ulid};

/// プロセス共通の単調増加ULIDジェネレータ
static GENERATOR: OnceLock<Mutex<Generator>> = OnceLock::new();

fn next_ulid() -> Ulid {
    let mut generator = GENERATOR
        .get_or_init(|| Mutex::new(Generator::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    // 同一ミリ秒内で乱数部が溢れた場合のみ通常生成に戻る
    generator.generate().unwrap_or_else(|_| Ulid::new())
}

/// ToDo の識別子（ULID 文字列）
///
/// サーバー側で払い出され、以後変更されない。辞書順が作成順と一致する。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// 新しいToDo IDを生成（同一プロセス内では必ず前回より大きい）
    pub fn new() -> Self {
        Self(next_ulid().to_string())
    }

    /// 文字列からToDo IDを作成（ULID形式でなければエラー）
    pub fn parse(id: &str) -> Result<Self, DomainError> {
        Ulid::from_string(id)
            .map(|ulid| Self(ulid.to_string()))
            .map_err(|_| DomainError::InvalidTodoId(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ID に埋め込まれた作成時刻（ミリ秒）
    pub fn timestamp_ms(&self) -> Option<u64> {
        Ulid::from_string(&self.0).ok().map(|ulid| ulid.timestamp_ms())
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for TodoId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub name: String,
    pub completed: bool,
}

impl Todo {
    /// 作成直後のToDo（completed は常に false）
    pub fn create(new_todo: NewTodo) -> Result<Self, DomainError> {
        let name = validate_name(&new_todo.name)?;
        Ok(Self {
            id: TodoId::new(),
            name,
            completed: false,
        })
    }

    /// 指定されたフィールドだけを上書きする
    pub fn apply(&mut self, changes: &TodoChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(completed) = changes.completed {
            self.completed = completed;
        }
    }
}

/// POST /todos のリクエストボディ
///
/// `completed` は旧クライアントとの互換のため受け付けるが、作成時には無視される。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTodo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl NewTodo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            completed: Some(false),
        }
    }
}

/// PUT /todos/{id} のリクエストボディ（部分更新）
///
/// 省略または null のフィールドは保存済みの値を維持する。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoChanges {
    /// ToDo の現在値をそのまま送る全フィールド更新
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            name: Some(todo.name.clone()),
            completed: Some(todo.completed),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.completed.is_none()
    }

    /// 検証済みの変更内容を返す。name はトリムされる。
    pub fn validate(self) -> Result<Self, DomainError> {
        if self.is_empty() {
            return Err(DomainError::Validation(
                "At least one of 'name' or 'completed' is required".to_string(),
            ));
        }
        let name = self.name.as_deref().map(validate_name).transpose()?;
        Ok(Self {
            name,
            completed: self.completed,
        })
    }
}

fn validate_name(name: &str) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation("Name cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}
