use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// キー単位の後縁デバウンス
///
/// 登録されたジョブは `delay` 経過後に実行される。それまでに同じキーで別のジョブが
/// 登録された場合は実行されない。開始済みのジョブは最後まで実行される。
pub struct Debouncer<K> {
    delay: Duration,
    inner: Arc<Mutex<Inner<K>>>,
}

struct Inner<K> {
    next_ticket: u64,
    latest: HashMap<K, u64>,
    tasks: Vec<JoinHandle<()>>,
}

impl<K> Inner<K> {
    fn lock(inner: &Mutex<Self>) -> MutexGuard<'_, Self> {
        inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: Arc::new(Mutex::new(Inner {
                next_ticket: 0,
                latest: HashMap::new(),
                tasks: Vec::new(),
            })),
        }
    }

    /// tokio ランタイム内から呼ぶこと
    pub fn schedule<F>(&self, key: K, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut guard = Inner::lock(&self.inner);
        guard.next_ticket += 1;
        let ticket = guard.next_ticket;
        guard.latest.insert(key.clone(), ticket);

        let inner = Arc::clone(&self.inner);
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let is_latest = {
                let mut guard = Inner::lock(&inner);
                if guard.latest.get(&key) == Some(&ticket) {
                    guard.latest.remove(&key);
                    true
                } else {
                    false
                }
            };

            if is_latest {
                job.await;
            }
        });

        guard.tasks.retain(|task| !task.is_finished());
        guard.tasks.push(handle);
    }

    /// 待機中のジョブを持つキーの数
    pub fn pending(&self) -> usize {
        Inner::lock(&self.inner).latest.len()
    }

    /// 登録済みの全ジョブの完了を待つ（待機中に追加されたものも含む）
    pub async fn settle(&self) {
        loop {
            let tasks = std::mem::take(&mut Inner::lock(&self.inner).tasks);
            if tasks.is_empty() {
                return;
            }
            for task in tasks {
                if let Err(e) = task.await {
                    tracing::warn!(error = %e, "Debounced job panicked");
                }
            }
        }
    }
}

impl<K> Default for Debouncer<K>
where
    K: Eq + Hash + Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}
