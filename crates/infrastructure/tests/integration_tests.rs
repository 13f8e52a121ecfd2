use domain::{CompletedFilter, NewTodo, Todo, TodoChanges};
use infrastructure::{connect, connect_in_memory, migrate, TodoRepository};
use shared::Config;

/// 統合テスト用のセットアップ
async fn setup_repository() -> TodoRepository {
    let pool = connect_in_memory()
        .await
        .expect("テスト用DBの作成に失敗");
    TodoRepository::new(pool)
}

async fn seed(repo: &TodoRepository, name: &str) -> Todo {
    let todo = Todo::create(NewTodo::named(name)).unwrap();
    repo.insert(&todo).await.unwrap()
}

/// 一覧取得とフィルタの基本動作
#[tokio::test]
async fn test_list_filters_by_completed_flag() {
    let repo = setup_repository().await;
    let milk = seed(&repo, "Buy milk").await;
    let bread = seed(&repo, "Buy bread").await;

    repo.update(
        &milk.id,
        &TodoChanges {
            name: None,
            completed: Some(true),
        },
    )
    .await
    .unwrap();

    let all = repo.list(CompletedFilter::All).await.unwrap();
    assert_eq!(all.len(), 2);

    let completed = repo.list(CompletedFilter::Completed).await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, milk.id);

    let active = repo.list(CompletedFilter::Active).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, bread.id);
}

/// 連続して作成したToDoは作成順に並ぶ
#[tokio::test]
async fn test_list_preserves_creation_order_for_rapid_inserts() {
    // Arrange: 同一ミリ秒内に多数作成される
    let repo = setup_repository().await;
    let mut expected = Vec::new();
    for i in 0..200 {
        expected.push(seed(&repo, &format!("Todo {i}")).await.name);
    }

    // Act
    let names: Vec<String> = repo
        .list(CompletedFilter::All)
        .await
        .unwrap()
        .into_iter()
        .map(|todo| todo.name)
        .collect();

    // Assert
    assert_eq!(names, expected);
}

#[tokio::test]
async fn test_list_on_empty_table() {
    let repo = setup_repository().await;
    assert!(repo.list(CompletedFilter::All).await.unwrap().is_empty());
}

/// 削除した行は一覧から消える
#[tokio::test]
async fn test_deleted_todo_disappears_from_list() {
    let repo = setup_repository().await;
    let todo = seed(&repo, "Buy milk").await;

    repo.delete(&todo.id).await.unwrap();

    let all = repo.list(CompletedFilter::All).await.unwrap();
    assert!(all.iter().all(|t| t.id != todo.id));
}

/// 同一IDへの更新は後勝ち
#[tokio::test]
async fn test_last_writer_wins() {
    let repo = setup_repository().await;
    let todo = seed(&repo, "A").await;

    for name in ["A1", "A2", "A3"] {
        repo.update(
            &todo.id,
            &TodoChanges {
                name: Some(name.to_string()),
                completed: None,
            },
        )
        .await
        .unwrap();
    }

    let found = repo.find(&todo.id).await.unwrap().unwrap();
    assert_eq!(found.name, "A3");
}

/// ファイルDB + 複数接続のプールで並行に書き込めること
#[tokio::test]
async fn test_file_backed_pool_handles_concurrent_inserts() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        database_url: format!("sqlite://{}", dir.path().join("todos.db").display()),
        max_connections: 4,
        ..Config::default()
    };

    let pool = connect(&config).await.expect("DB接続に失敗");
    migrate(&pool).await.unwrap();
    // 2回目の適用は何もしない
    migrate(&pool).await.unwrap();

    let repo = TodoRepository::new(pool.clone());
    let inserts = (0..8).map(|i| {
        let repo = repo.clone();
        async move { seed(&repo, &format!("todo {i}")).await }
    });
    let created = futures::future::join_all(inserts).await;

    let all = repo.list(CompletedFilter::All).await.unwrap();
    assert_eq!(all.len(), created.len());

    pool.close().await;
}
