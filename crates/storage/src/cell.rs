use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

/// Observable state holder: a snapshot on demand, change notifications for
/// subscribers. Mutation happens in short synchronous sections, never across
/// an await.
pub struct StateCell<T> {
    tx: watch::Sender<T>,
}

impl<T> StateCell<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn snapshot(&self) -> T {
        self.tx.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    /// Like `update`, but subscribers are only notified when `f` returns true.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool {
        self.tx.send_if_modified(f)
    }

    pub fn replace(&self, value: T) -> T {
        self.tx.send_replace(value)
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    pub fn stream(&self) -> WatchStream<T> {
        WatchStream::new(self.tx.subscribe())
    }

    /// Calls `listener` with the current value, then after every change.
    /// Must be called inside a tokio runtime.
    pub fn subscribe_fn(&self, mut listener: impl FnMut(&T) + Send + 'static) -> Subscription {
        let mut rx = self.tx.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                let value = rx.borrow_and_update().clone();
                listener(&value);
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });
        Subscription { handle }
    }
}

impl<T: Default + Clone + Send + Sync + 'static> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Handle returned by `StateCell::subscribe_fn`. Dropping it unsubscribes.
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
