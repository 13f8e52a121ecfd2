pub mod api;
pub mod debounce;
pub mod error;
pub mod list_view;

pub use api::{HttpTodoApi, TodoApi};
pub use debounce::Debouncer;
pub use error::ClientError;
pub use list_view::TodoListView;
