//! Page controllers
//!
//! Each page is an explicitly constructed controller that owns its state
//! and its timers. Building the next page always starts from a fresh
//! controller; the only state that survives a page change is what lives in
//! the session store.
//!
//! - [`splash::SplashController`] - boot sequence and stored-session check
//! - [`login::LoginController`] - credential entry
//! - [`dashboard::DashboardController`] - profile, preferences, notifications
//!
//! Every recurring or delayed piece of work a page starts goes through its
//! [`PageTimers`], and [`View::dispose`] cancels all of it at once.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::bridge::Bridge;
use crate::error::Result;

pub mod dashboard;
pub mod login;
pub mod notifications;
pub mod splash;

pub use dashboard::{DashboardController, ProfileView, Section, Uptime};
pub use login::{LoginController, LoginOutcome, LoginState};
pub use notifications::{Notification, NotificationCenter, Severity};
pub use splash::{SplashController, SplashState, SplashStatus};

/// Behavior shared by all pages: the title bar and teardown
#[async_trait]
pub trait View: Send + Sync {
    /// The capabilities this page was constructed with
    fn bridge(&self) -> &Arc<dyn Bridge>;

    /// Cancel every timer the page started
    fn dispose(&mut self);

    /// Whether [`View::dispose`] has run
    fn is_disposed(&self) -> bool;

    /// Title bar: minimize
    async fn minimize(&self) -> Result<()> {
        self.bridge().minimize().await
    }

    /// Title bar: maximize or restore
    async fn maximize(&self) -> Result<()> {
        self.bridge().maximize().await
    }

    /// Title bar: close
    async fn close(&self) -> Result<()> {
        self.bridge().close().await
    }
}

/// Timers owned by one page
///
/// All tasks stop when [`PageTimers::cancel`] is called or the owner is
/// dropped.
#[derive(Debug, Default)]
pub struct PageTimers {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl PageTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token cancelled together with these timers
    pub fn token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Run `work` until it completes or the timers are cancelled
    pub fn spawn<F>(&mut self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        self.tasks.retain(|task| !task.is_finished());
        self.tasks.push(tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = work => {}
            }
        }));
    }

    /// Call `tick` every `period`, first after one full period
    pub fn every<F>(&mut self, period: Duration, mut tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            loop {
                interval.tick().await;
                tick();
            }
        });
    }

    /// Call `fire` once after `delay`
    pub fn after<F>(&mut self, delay: Duration, fire: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.spawn(async move {
            tokio::time::sleep(delay).await;
            fire();
        });
    }

    /// Number of tasks still running
    pub fn active(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_finished()).count()
    }

    /// Stop every task
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for PageTimers {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_every_ticks_until_cancelled() {
        let mut timers = PageTimers::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        timers.every(Duration::from_secs(1), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        timers.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        assert_eq!(timers.active(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_fires_once() {
        let mut timers = PageTimers::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        timers.after(Duration::from_secs(2), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_work() {
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let mut timers = PageTimers::new();
            let counter = Arc::clone(&fired);
            timers.after(Duration::from_secs(1), move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_child_token_follows_cancel() {
        let mut timers = PageTimers::new();
        let token = timers.token();
        assert!(!token.is_cancelled());
        timers.cancel();
        assert!(token.is_cancelled());
        assert!(timers.is_cancelled());
    }
}
