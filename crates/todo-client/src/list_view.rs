use domain::{CompletedFilter, NewTodo, Todo, TodoChanges, TodoId};
use std::sync::Arc;
use std::time::Duration;

use crate::api::TodoApi;
use crate::debounce::{Debouncer, DEFAULT_DELAY};
use crate::error::ClientError;

/// ToDo 一覧画面の状態（描画を持たない）
///
/// 編集はローカルの行へ即座に反映し、ToDo ごとのデバウンスを経てサーバーへ書き戻す。
/// 追加と削除はサーバーの応答後にのみローカルの行を変更する。
/// フィルタ切り替え時は必ず再取得する。
pub struct TodoListView<A> {
    api: Arc<A>,
    todos: Option<Vec<Todo>>,
    filter: CompletedFilter,
    input: String,
    debouncer: Debouncer<TodoId>,
}

impl<A> TodoListView<A>
where
    A: TodoApi + 'static,
{
    pub fn new(api: A) -> Self {
        Self::with_delay(api, DEFAULT_DELAY)
    }

    pub fn with_delay(api: A, delay: Duration) -> Self {
        Self {
            api: Arc::new(api),
            todos: None,
            filter: CompletedFilter::All,
            input: String::new(),
            debouncer: Debouncer::new(delay),
        }
    }

    /// 最初の取得が成功するまでは `None`
    pub fn todos(&self) -> Option<&[Todo]> {
        self.todos.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.todos.is_none()
    }

    pub fn filter(&self) -> CompletedFilter {
        self.filter
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.fetch(self.filter).await
    }

    /// 取得に失敗した場合はフィルタも行も切り替えない
    pub async fn set_filter(&mut self, filter: CompletedFilter) -> Result<(), ClientError> {
        self.fetch(filter).await
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// 入力欄での Enter。空白のみなら何もしない。それ以外は入力欄を空にして作成する
    pub async fn submit_input(&mut self) -> Result<Option<Todo>, ClientError> {
        if self.input.trim().is_empty() {
            return Ok(None);
        }

        let name = std::mem::take(&mut self.input);
        self.add(&name).await.map(Some)
    }

    /// 読み込み前なら行には追加しない（次回の取得で反映される）
    pub async fn add(&mut self, name: &str) -> Result<Todo, ClientError> {
        let todo = self.api.create(&NewTodo::named(name)).await?;
        if let Some(todos) = self.todos.as_mut() {
            todos.push(todo.clone());
        }
        Ok(todo)
    }

    /// 該当する行がなければ false
    pub fn rename(&mut self, id: &TodoId, name: impl Into<String>) -> bool {
        let name = name.into();
        self.edit(id, |todo| todo.name = name)
    }

    pub fn set_completed(&mut self, id: &TodoId, completed: bool) -> bool {
        self.edit(id, |todo| todo.completed = completed)
    }

    pub async fn delete(&mut self, id: &TodoId) -> Result<(), ClientError> {
        self.api.delete(id).await?;
        if let Some(todos) = self.todos.as_mut() {
            todos.retain(|todo| &todo.id != id);
        }
        Ok(())
    }

    /// デバウンス中の編集がすべて書き込まれるまで待つ
    pub async fn flush(&self) {
        self.debouncer.settle().await;
    }

    async fn fetch(&mut self, filter: CompletedFilter) -> Result<(), ClientError> {
        let todos = self.api.list(filter).await?;
        tracing::debug!(filter = ?filter, count = todos.len(), "Loaded todos");
        self.filter = filter;
        self.todos = Some(todos);
        Ok(())
    }

    fn edit(&mut self, id: &TodoId, change: impl FnOnce(&mut Todo)) -> bool {
        let Some(todo) = self
            .todos
            .as_mut()
            .and_then(|todos| todos.iter_mut().find(|todo| &todo.id == id))
        else {
            return false;
        };
        change(&mut *todo);

        let api = Arc::clone(&self.api);
        let id = todo.id.clone();
        let changes = TodoChanges::from_todo(todo);
        self.debouncer.schedule(id.clone(), async move {
            match api.update(&id, &changes).await {
                Ok(Some(_)) => tracing::debug!(todo_id = %id, "Saved todo edit"),
                Ok(None) => tracing::warn!(todo_id = %id, "Todo no longer exists"),
                Err(e) => tracing::warn!(todo_id = %id, error = %e, "Failed to save todo edit"),
            }
        });
        true
    }
}
