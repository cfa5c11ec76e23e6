//! Presence pushed to the gateway shard, plus the slot owning the rotation.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::ActivityData;
use serenity::model::user::OnlineStatus;
use serenity::prelude::Context;
use tokio::sync::Mutex;
use tracing::debug;

use astra_presence::{
    ActivityKind, ActivityPhrase, Availability, PresenceError, PresenceScheduler, PresenceSink,
    PresenceSpec,
};

/// Longest activity text Discord accepts.
pub const MAX_ACTIVITY_CHARS: usize = 128;

/// [`PresenceSink`] writing to the shard behind a serenity `Context`.
pub struct ShardPresence {
    ctx: Context,
}

impl ShardPresence {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl PresenceSink for ShardPresence {
    async fn push(&self, spec: &PresenceSpec) -> astra_presence::Result<()> {
        let len = spec.activity.text.chars().count();
        if len > MAX_ACTIVITY_CHARS {
            return Err(PresenceError::Push(format!(
                "activity text is {len} characters, limit is {MAX_ACTIVITY_CHARS}"
            )));
        }
        self.ctx
            .set_presence(Some(activity_data(&spec.activity)), online_status(spec.status));
        Ok(())
    }
}

pub fn activity_data(activity: &ActivityPhrase) -> ActivityData {
    let name = activity.text.as_str();
    match activity.kind {
        ActivityKind::Playing => ActivityData::playing(name),
        ActivityKind::Listening => ActivityData::listening(name),
        ActivityKind::Watching => ActivityData::watching(name),
        ActivityKind::Competing => ActivityData::competing(name),
        ActivityKind::Custom => ActivityData::custom(name),
    }
}

pub fn online_status(status: Availability) -> OnlineStatus {
    match status {
        Availability::Online => OnlineStatus::Online,
        Availability::Idle => OnlineStatus::Idle,
        Availability::DoNotDisturb => OnlineStatus::DoNotDisturb,
        Availability::Invisible => OnlineStatus::Invisible,
    }
}

/// Holds the scheduler for the current gateway session.
///
/// Each `ready` replaces the scheduler (the old shard is gone), and every
/// gateway drop or shutdown stops it.
#[derive(Clone, Default)]
pub struct PresenceSlot {
    inner: Arc<Mutex<Option<PresenceScheduler>>>,
}

impl PresenceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the current scheduler, if any, and start `scheduler` in its place.
    pub async fn replace(&self, mut scheduler: PresenceScheduler) {
        let mut slot = self.inner.lock().await;
        if let Some(mut old) = slot.take() {
            old.stop().await;
        }
        scheduler.start().await;
        *slot = Some(scheduler);
    }

    /// Stop the current scheduler. Safe to call repeatedly.
    pub async fn stop(&self) {
        let mut slot = self.inner.lock().await;
        if let Some(scheduler) = slot.as_mut() {
            scheduler.stop().await;
        } else {
            debug!("no presence scheduler to stop");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.inner
            .lock()
            .await
            .as_ref()
            .is_some_and(PresenceScheduler::is_running)
    }
}
