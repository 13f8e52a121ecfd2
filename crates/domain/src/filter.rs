use crate::errors::DomainError;
use serde::{Deserialize, Serialize};

/// 一覧取得時の完了状態フィルタ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletedFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl CompletedFilter {
    /// `?completed=` の値を厳密に解釈する
    pub fn from_query(value: Option<&str>) -> Result<Self, DomainError> {
        match value {
            None => Ok(Self::All),
            Some("true") => Ok(Self::Completed),
            Some("false") => Ok(Self::Active),
            Some(other) => Err(DomainError::InvalidFilter(other.to_string())),
        }
    }

    /// SQL にバインドする値。All のときは None
    pub fn completed(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Active => Some(false),
            Self::Completed => Some(true),
        }
    }

    /// クエリ文字列の値。All のときはパラメータ自体を付けない
    pub fn as_query(self) -> Option<&'static str> {
        self.completed().map(|c| if c { "true" } else { "false" })
    }

    pub fn matches(self, completed: bool) -> bool {
        self.completed().map_or(true, |want| want == completed)
    }
}
