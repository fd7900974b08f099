//! Per-call execution context: an optional deadline plus a cancellation signal.
//!
//! Work driven through [`RequestContext::run`] is dropped as soon as the
//! context is cancelled or its deadline passes. Dropping a SeaORM transaction
//! rolls it back, so an aborted mutation leaves no partial writes.

use std::{future::Future, time::Duration};

use tokio::{sync::watch, time::Instant};

use super::errors::PlaylistError;

#[derive(Clone, Debug)]
pub struct RequestContext {
    deadline: Option<Instant>,
    cancel: watch::Receiver<bool>,
}

/// Cancels every clone of the context it was created with.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

impl RequestContext {
    /// Context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { deadline: None, cancel: rx }
    }

    pub fn new() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (Self { deadline: None, cancel: rx }, CancelHandle(tx))
    }

    /// Keeps the earlier of the existing and the given deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Why the context is done, if it is.
    pub fn check(&self) -> Result<(), PlaylistError> {
        if self.is_cancelled() {
            return Err(PlaylistError::Cancelled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Err(PlaylistError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    async fn cancelled(&self) {
        let mut rx = self.cancel.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // handle dropped without cancelling
                std::future::pending::<()>().await;
            }
        }
    }

    async fn expired(&self) {
        match self.deadline {
            Some(d) => tokio::time::sleep_until(d).await,
            None => std::future::pending::<()>().await,
        }
    }

    /// Drive `fut` to completion unless the context finishes first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, PlaylistError>
    where
        F: Future<Output = Result<T, PlaylistError>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(PlaylistError::Cancelled),
            _ = self.expired() => Err(PlaylistError::DeadlineExceeded),
            res = fut => res,
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}
