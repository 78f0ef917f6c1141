use limbo_protocol_core::TimeoutError;
use std::time::Duration;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tracing::trace;

/// Heartbeat for one connection: one outstanding id at a time.
pub struct KeepAlive {
    interval: Interval,
    timeout: Duration,
    next_id: i64,
    pending: Option<(i64, Instant)>,
}

impl KeepAlive {
    pub fn new(every: Duration, timeout: Duration) -> Self {
        let mut interval = interval_at(Instant::now() + every, every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            interval,
            timeout,
            next_id: 1,
            pending: None,
        }
    }

    /// Wait for the next heartbeat, or for the outstanding ping's deadline
    /// if that comes first. Cancel-safe.
    pub async fn tick(&mut self) {
        match self.pending {
            Some((_, sent_at)) => {
                tokio::select! {
                    _ = self.interval.tick() => {}
                    _ = sleep_until(sent_at + self.timeout) => {}
                }
            }
            None => {
                self.interval.tick().await;
            }
        }
    }

    /// Decide what a heartbeat does: the id to send, nothing while a
    /// recent ping is still unanswered, or a timeout.
    pub fn on_tick(&mut self) -> Result<Option<i64>, TimeoutError> {
        let now = Instant::now();
        if let Some((_, sent_at)) = self.pending {
            if now.duration_since(sent_at) >= self.timeout {
                return Err(TimeoutError::KeepAlive(self.timeout));
            }
            return Ok(None);
        }
        let id = self.next_id;
        // Stays positive and within i32 for clients with narrow ids.
        self.next_id = if self.next_id >= i32::MAX as i64 { 1 } else { self.next_id + 1 };
        self.pending = Some((id, now));
        Ok(Some(id))
    }

    /// Record a client response. Stale or unknown ids are ignored.
    pub fn on_response(&mut self, id: i64) -> bool {
        match self.pending {
            Some((pending, sent_at)) if pending == id => {
                trace!("Keep-alive {} answered after {:?}", id, sent_at.elapsed());
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}
