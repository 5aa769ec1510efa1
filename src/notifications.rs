use log::{debug, warn};
use std::fmt::{Display, Formatter};
use std::io::Write;
use tokio::sync::mpsc;
use tokio::sync::mpsc::{Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

/// A short message for the person in front of the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub text: String,
}

impl Display for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.level {
            Level::Success => write!(f, "✔ {}", self.text),
            Level::Error => write!(f, "✖ {}", self.text),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: Sender<Notification>,
}

impl Notifier {
    pub fn new(tx: Sender<Notification>) -> Self {
        Self { tx }
    }

    pub fn channel(buffer: usize) -> (Self, Receiver<Notification>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }

    pub async fn success(&self, text: impl Into<String>) {
        self.send(Level::Success, text.into()).await;
    }

    pub async fn error(&self, text: impl Into<String>) {
        self.send(Level::Error, text.into()).await;
    }

    async fn send(&self, level: Level, text: String) {
        debug!("notify {level:?}: {text}");
        if self.tx.send(Notification { level, text }).await.is_err() {
            warn!("notification receiver dropped");
        }
    }
}

/// Prints notifications until every `Notifier` is gone.
pub async fn start_notification_handler(mut rx: Receiver<Notification>) {
    while let Some(notification) = rx.recv().await {
        let mut out = std::io::stdout().lock();
        _ = writeln!(out, "{notification}");
    }
}
