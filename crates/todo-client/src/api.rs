use async_trait::async_trait;
use domain::{CompletedFilter, NewTodo, Todo, TodoChanges, TodoId};
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::error::ClientError;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// 一覧画面と REST API の間の通信境界
#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn list(&self, filter: CompletedFilter) -> Result<Vec<Todo>, ClientError>;

    /// サーバーが404を返した場合は `Ok(None)`
    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, ClientError>;

    async fn create(&self, new_todo: &NewTodo) -> Result<Todo, ClientError>;

    /// サーバーが404を返した場合は `Ok(None)`
    async fn update(&self, id: &TodoId, changes: &TodoChanges)
        -> Result<Option<Todo>, ClientError>;

    async fn delete(&self, id: &TodoId) -> Result<(), ClientError>;
}

#[derive(Clone)]
pub struct HttpTodoApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTodoApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// 環境変数 `TODO_API_URL` から接続先を決める（未設定なら `http://localhost:3000`）
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から接続先を決める（テスト用に分離）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("TODO_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn todo_url(&self, id: &TodoId) -> String {
        format!("{}/todos/{}", self.base_url, id)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl TodoApi for HttpTodoApi {
    async fn list(&self, filter: CompletedFilter) -> Result<Vec<Todo>, ClientError> {
        let mut request = self.client.get(self.todos_url());
        if let Some(completed) = filter.as_query() {
            request = request.query(&[("completed", completed)]);
        }

        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn get(&self, id: &TodoId) -> Result<Option<Todo>, ClientError> {
        let response = self.client.get(self.todo_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check(response).await?;
        Ok(Some(response.json().await?))
    }

    async fn create(&self, new_todo: &NewTodo) -> Result<Todo, ClientError> {
        let response = self
            .client
            .post(self.todos_url())
            .json(new_todo)
            .send()
            .await?;

        let response = check(response).await?;
        Ok(response.json().await?)
    }

    async fn update(
        &self,
        id: &TodoId,
        changes: &TodoChanges,
    ) -> Result<Option<Todo>, ClientError> {
        let response = self
            .client
            .put(self.todo_url(id))
            .json(changes)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check(response).await?;
        Ok(Some(response.json().await?))
    }

    async fn delete(&self, id: &TodoId) -> Result<(), ClientError> {
        let response = self.client.delete(self.todo_url(id)).send().await?;
        check(response).await?;
        Ok(())
    }
}
