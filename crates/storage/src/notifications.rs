use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::cell::StateCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastDurations {
    pub success: Duration,
    pub error: Duration,
    pub info: Duration,
}

impl Default for ToastDurations {
    fn default() -> Self {
        Self {
            success: Duration::from_millis(5000),
            error: Duration::from_millis(7000),
            info: Duration::from_millis(5000),
        }
    }
}

struct Inner {
    toasts: StateCell<Vec<Toast>>,
    next_id: AtomicU64,
    durations: ToastDurations,
}

/// Toast sink for discrete-action outcomes. Toasts expire after their
/// duration when a tokio runtime is available.
#[derive(Clone)]
pub struct Notifications {
    inner: Arc<Inner>,
}

impl Notifications {
    pub fn new(durations: ToastDurations) -> Self {
        Self {
            inner: Arc::new(Inner {
                toasts: StateCell::default(),
                next_id: AtomicU64::new(1),
                durations,
            }),
        }
    }

    pub fn state(&self) -> &StateCell<Vec<Toast>> {
        &self.inner.toasts
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.toasts.snapshot()
    }

    pub fn show_success(&self, message: &str) -> u64 {
        info!("{}", message);
        self.push(ToastKind::Success, message, self.inner.durations.success)
    }

    pub fn show_error(&self, message: &str) -> u64 {
        warn!("{}", message);
        self.push(ToastKind::Error, message, self.inner.durations.error)
    }

    pub fn show_info(&self, message: &str) -> u64 {
        info!("{}", message);
        self.push(ToastKind::Info, message, self.inner.durations.info)
    }

    pub fn dismiss(&self, id: u64) -> bool {
        self.inner.toasts.update_if(|toasts| {
            let before = toasts.len();
            toasts.retain(|t| t.id != id);
            toasts.len() != before
        })
    }

    fn push(&self, kind: ToastKind, message: &str, duration: Duration) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let duration = (!duration.is_zero()).then_some(duration);
        self.inner.toasts.update(|toasts| {
            toasts.push(Toast {
                id,
                kind,
                message: message.to_string(),
                duration,
            })
        });

        if let (Some(duration), Ok(runtime)) = (duration, tokio::runtime::Handle::try_current()) {
            let this = self.clone();
            runtime.spawn(async move {
                tokio::time::sleep(duration).await;
                this.dismiss(id);
            });
        }
        id
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(ToastDurations::default())
    }
}
