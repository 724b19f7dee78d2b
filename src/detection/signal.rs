use serde::Serialize;
use tokio::sync::watch;

/// Discrete tracker notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionEvent {
    Acquired,
    Lost,
}

impl DetectionEvent {
    pub fn is_tracked(self) -> bool {
        matches!(self, Self::Acquired)
    }
}

/// Single writer of the "target currently tracked" flag.
pub struct DetectionSignal {
    tx: watch::Sender<bool>,
    _rx: watch::Receiver<bool>,
}

impl DetectionSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, _rx: rx }
    }

    /// Apply a notification. Returns `true` if the flag changed; a repeated
    /// `Acquired` or `Lost` is a no-op.
    pub fn apply(&self, event: DetectionEvent) -> bool {
        let tracked = event.is_tracked();
        self.tx.send_if_modified(|current| {
            if *current == tracked {
                false
            } else {
                *current = tracked;
                true
            }
        })
    }

    pub fn is_tracked(&self) -> bool {
        *self.tx.borrow()
    }

    /// Read-only view for consumers.
    pub fn subscribe(&self) -> DetectionFlag {
        DetectionFlag {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for DetectionSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only handle on a [`DetectionSignal`].
#[derive(Clone)]
pub struct DetectionFlag {
    rx: watch::Receiver<bool>,
}

impl DetectionFlag {
    pub fn is_tracked(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for the next transition and return the new value. `None` once
    /// the signal is gone.
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}
