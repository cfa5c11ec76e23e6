use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::activity::{ActivityPhrase, Availability, PresenceSpec};
use crate::error::Result;
use crate::rotation::{RotationSettings, RotationState};

/// Where presence updates go. Implemented over the serenity shard in
/// `astra-discord`.
#[async_trait]
pub trait PresenceSink: Send + Sync {
    async fn push(&self, spec: &PresenceSpec) -> Result<()>;
}

struct Running {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Stopped/Running state machine driving the rotation timer.
///
/// The rotation state is moved into the timer task and touched by nothing
/// else.
pub struct PresenceScheduler {
    settings: RotationSettings,
    sink: Arc<dyn PresenceSink>,
    running: Option<Running>,
}

impl PresenceScheduler {
    pub fn new(settings: RotationSettings, sink: Arc<dyn PresenceSink>) -> Self {
        Self {
            settings,
            sink,
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn settings(&self) -> &RotationSettings {
        &self.settings
    }

    /// Stopped → Running from a random category. No-op while running.
    pub async fn start(&mut self) {
        if self.is_running() {
            debug!("presence rotation already running");
            return;
        }
        let start = rand::thread_rng().gen_range(0..self.settings.catalog.len());
        self.start_at(start).await;
    }

    async fn start_at(&mut self, start: usize) {
        let mut state = RotationState::new(&self.settings.catalog, start);
        let status = self.settings.status;
        let period = self.settings.interval;

        // Tick #0 happens before the timer is armed.
        apply(self.sink.as_ref(), status, state.advance()).await;

        let (shutdown, shutdown_rx) = watch::channel(false);
        let sink = Arc::clone(&self.sink);
        let task = tokio::spawn(run_rotation(state, sink, status, period, shutdown_rx));
        self.running = Some(Running { shutdown, task });

        info!(
            interval_ms = period.as_millis() as u64,
            start_category = start,
            "presence rotation started"
        );
    }

    /// Running → Stopped. Cancels the timer and waits for it to exit.
    /// Safe to call when already stopped.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.shutdown.send(true);
        if let Err(e) = running.task.await {
            warn!(error = %e, "presence rotation task ended abnormally");
        }
        info!("presence rotation stopped");
    }
}

async fn run_rotation(
    mut state: RotationState,
    sink: Arc<dyn PresenceSink>,
    status: Availability,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                apply(sink.as_ref(), status, state.advance()).await;
            }
            changed = shutdown.changed() => {
                // A dropped sender means the scheduler is gone; stop as well.
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

/// Push one presence. Failures are logged; the rotation carries on.
async fn apply(sink: &dyn PresenceSink, status: Availability, activity: ActivityPhrase) {
    let spec = PresenceSpec { status, activity };
    match sink.push(&spec).await {
        Ok(()) => debug!(kind = %spec.activity.kind, text = %spec.activity.text, "presence updated"),
        Err(e) => warn!(error = %e, "presence update failed"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use astra_core::config::PresenceConfig;

    use super::*;
    use crate::activity::ActivityKind;
    use crate::error::PresenceError;
    use crate::rotation::PhraseCatalog;

    #[derive(Default)]
    struct RecordingSink {
        pushed: Mutex<Vec<PresenceSpec>>,
        fail: bool,
    }

    impl RecordingSink {
        fn pushed(&self) -> Vec<PresenceSpec> {
            self.pushed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PresenceSink for RecordingSink {
        async fn push(&self, spec: &PresenceSpec) -> Result<()> {
            self.pushed.lock().unwrap().push(spec.clone());
            if self.fail {
                return Err(PresenceError::Push("gateway closed".to_string()));
            }
            Ok(())
        }
    }

    fn settings() -> RotationSettings {
        let mut settings = RotationSettings::from_config(&PresenceConfig::default());
        settings.interval = Duration::from_millis(5000);
        settings.catalog = PhraseCatalog::from_lists([
            (ActivityKind::Playing, vec!["p0".to_string(), "p1".to_string()]),
            (ActivityKind::Listening, vec!["l0".to_string()]),
        ]);
        settings
    }

    #[tokio::test(start_paused = true)]
    async fn start_applies_immediately_then_every_interval() {
        let sink = Arc::new(RecordingSink::default());
        let mut scheduler = PresenceScheduler::new(settings(), sink.clone());

        scheduler.start_at(0).await;
        assert!(scheduler.is_running());
        assert_eq!(sink.pushed().len(), 1);

        tokio::time::sleep(Duration::from_millis(15_100)).await;
        let texts: Vec<String> = sink.pushed().into_iter().map(|s| s.activity.text).collect();
        assert_eq!(texts, vec!["p0", "l0", "p1", "l0"]);

        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_timer_and_is_idempotent() {
        let sink = Arc::new(RecordingSink::default());
        let mut scheduler = PresenceScheduler::new(settings(), sink.clone());

        scheduler.start().await;
        scheduler.stop().await;
        assert!(!scheduler.is_running());
        scheduler.stop().await;

        let before = sink.pushed().len();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(sink.pushed().len(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_running_is_noop() {
        let sink = Arc::new(RecordingSink::default());
        let mut scheduler = PresenceScheduler::new(settings(), sink.clone());

        scheduler.start().await;
        scheduler.start().await;
        assert_eq!(sink.pushed().len(), 1);
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failing_push_does_not_stop_rotation() {
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..RecordingSink::default()
        });
        let mut scheduler = PresenceScheduler::new(settings(), sink.clone());

        scheduler.start_at(0).await;
        tokio::time::sleep(Duration::from_millis(10_100)).await;
        assert_eq!(sink.pushed().len(), 3);
        assert!(scheduler.is_running());
        scheduler.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn status_is_carried_on_every_tick() {
        let sink = Arc::new(RecordingSink::default());
        let mut s = settings();
        s.status = Availability::DoNotDisturb;
        let mut scheduler = PresenceScheduler::new(s, sink.clone());

        scheduler.start_at(1).await;
        tokio::time::sleep(Duration::from_millis(5_100)).await;
        scheduler.stop().await;

        let pushed = sink.pushed();
        assert_eq!(pushed.len(), 2);
        assert!(pushed.iter().all(|p| p.status == Availability::DoNotDisturb));
        assert_eq!(pushed[0].activity.kind, ActivityKind::Listening);
        assert_eq!(pushed[1].activity.kind, ActivityKind::Playing);
    }
}
