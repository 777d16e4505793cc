//! Wake handling: mount, focus, visibility and page-show signals feed one
//! sequential task that runs debounced warm checks.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::warmer::{SessionSource, SessionWarmer, WarmOutcome};

/// Default coalescing window for wake events.
pub const DEFAULT_WAKE_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WakeEvent {
    Mount,
    Focus,
    Visible,
    PageShow,
}

impl fmt::Display for WakeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mount => "mount",
            Self::Focus => "focus",
            Self::Visible => "visible",
            Self::PageShow => "pageshow",
        })
    }
}

/// Callback run after a wake check that left the client signed in.
pub type OnWake = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

enum Command {
    Wake { event: WakeEvent, at: Instant },
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Cloneable handle for posting wake events.
#[derive(Clone)]
pub struct WakeSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl WakeSender {
    /// Post a wake event. Ignored once the watcher has shut down.
    pub fn notify(&self, event: WakeEvent) {
        let _ = self.tx.send(Command::Wake {
            event,
            at: Instant::now(),
        });
    }
}

/// Runs at most one warm check per debounce window.
pub struct WakeWatcher {
    sender: WakeSender,
    task: JoinHandle<()>,
}

impl WakeWatcher {
    /// Start the watcher and post the initial [`WakeEvent::Mount`].
    pub fn spawn<S: SessionSource>(
        warmer: Arc<SessionWarmer<S>>,
        debounce: Duration,
        on_wake: Option<OnWake>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(warmer, debounce, on_wake, rx));
        let sender = WakeSender { tx };
        sender.notify(WakeEvent::Mount);
        Self { sender, task }
    }

    pub fn notify(&self, event: WakeEvent) {
        self.sender.notify(event);
    }

    #[must_use]
    pub fn sender(&self) -> WakeSender {
        self.sender.clone()
    }

    /// Wait until every event posted before this call has been handled.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.sender.tx.send(Command::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }

    /// Stop after the queued events are handled.
    pub async fn shutdown(self) {
        let _ = self.sender.tx.send(Command::Shutdown);
        if let Err(error) = self.task.await {
            tracing::warn!(%error, "wake watcher task ended abnormally");
        }
    }
}

async fn run<S: SessionSource>(
    warmer: Arc<SessionWarmer<S>>,
    debounce: Duration,
    on_wake: Option<OnWake>,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    let mut last_check: Option<Instant> = None;
    while let Some(command) = rx.recv().await {
        match command {
            Command::Wake { event, at } => {
                if last_check.is_some_and(|start| at.saturating_duration_since(start) < debounce) {
                    tracing::trace!(%event, "wake event coalesced");
                    continue;
                }
                last_check = Some(Instant::now());
                tracing::debug!(%event, "wake check");
                let outcome = warmer.warm_if_needed().await;
                if outcome != WarmOutcome::SignedOut
                    && let Some(hook) = &on_wake
                {
                    hook().await;
                }
            }
            Command::Flush(done) => {
                let _ = done.send(());
            }
            Command::Shutdown => break,
        }
    }
}
