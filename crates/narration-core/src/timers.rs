//! Arming highlight plans as delayed callbacks.
//!
//! One armed plan is one [`ArmedSession`]. The whole session is the unit of
//! cancellation: there is no way to cancel a single op, and a cancelled
//! session can never be re-armed.

use crate::cancellation::CancellationToken;
use crate::schedule::ScheduledOp;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receives every op of an armed plan when its delay elapses.
pub type TimerCallback = Arc<dyn Fn(SessionId, ScheduledOp) + Send + Sync>;

pub trait TimerScheduler {
    /// Start realizing `plan` offsets from now.
    fn arm(&mut self, session: SessionId, plan: Vec<ScheduledOp>) -> ArmedSession;
}

/// Pending timers of one playback session.
///
/// Cancelling consumes the session. Dropping an uncancelled session cancels
/// it as well.
pub struct ArmedSession {
    id: SessionId,
    token: CancellationToken,
    pending: Arc<AtomicUsize>,
    worker: Option<JoinHandle<()>>,
}

impl ArmedSession {
    fn new(id: SessionId, pending: usize) -> Self {
        Self {
            id,
            token: CancellationToken::new(),
            pending: Arc::new(AtomicUsize::new(pending)),
            worker: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Timers that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel every remaining timer. Once this returns no callback of this
    /// session will run again.
    pub fn cancel(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.token.is_cancelled() && self.worker.is_none() {
            return;
        }
        self.token.cancel();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!(session_id = %self.id, "Highlight timer thread panicked");
            }
        }
        let dropped = self.pending.swap(0, Ordering::AcqRel);
        debug!(session_id = %self.id, dropped, "Cancelled highlight timers");
    }
}

impl Drop for ArmedSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for ArmedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArmedSession")
            .field("id", &self.id)
            .field("pending", &self.pending())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Realizes each plan on its own background thread, sleeping until every
/// op's offset from the arming instant.
#[derive(Clone)]
pub struct ThreadScheduler {
    callback: TimerCallback,
}

impl ThreadScheduler {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(SessionId, ScheduledOp) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }
}

impl TimerScheduler for ThreadScheduler {
    fn arm(&mut self, session: SessionId, plan: Vec<ScheduledOp>) -> ArmedSession {
        let reference = Instant::now();
        let mut armed = ArmedSession::new(session, plan.len());
        let token = armed.token.clone();
        let pending = Arc::clone(&armed.pending);
        let callback = Arc::clone(&self.callback);
        debug!(session_id = %session, ops = plan.len(), "Arming highlight timers");

        let spawned = thread::Builder::new()
            .name(format!("highlight-timers-{session}"))
            .spawn(move || {
                for op in plan {
                    let deadline = reference + Duration::from_millis(op.fire_at_ms);
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if !remaining.is_zero() && token.wait_timeout(remaining) {
                        return;
                    }
                    if token.is_cancelled() {
                        return;
                    }
                    pending.fetch_sub(1, Ordering::AcqRel);
                    trace!(session_id = %session, fire_at_ms = op.fire_at_ms, "Highlight timer fired");
                    callback(session, op);
                }
            });

        match spawned {
            Ok(handle) => armed.worker = Some(handle),
            Err(err) => {
                warn!(session_id = %session, "Failed to spawn highlight timer thread: {err}");
                armed.token.cancel();
                armed.pending.store(0, Ordering::Release);
            }
        }
        armed
    }
}

#[cfg(test)]
pub(crate) mod manual {
    use super::{ArmedSession, SessionId, TimerScheduler};
    use crate::cancellation::CancellationToken;
    use crate::schedule::ScheduledOp;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Outside view of an armed session that stays valid after the
    /// controller has consumed the session itself.
    #[derive(Clone)]
    pub(crate) struct SessionHandle {
        token: CancellationToken,
        pending: Arc<AtomicUsize>,
    }

    impl SessionHandle {
        pub(crate) fn pending(&self) -> usize {
            self.pending.load(Ordering::Acquire)
        }

        pub(crate) fn is_cancelled(&self) -> bool {
            self.token.is_cancelled()
        }
    }

    #[derive(Default)]
    struct Recorded {
        plans: Vec<(SessionId, Vec<ScheduledOp>)>,
        handles: Vec<(SessionId, SessionHandle)>,
    }

    /// Records armed plans instead of running them; tests fire ops by hand.
    #[derive(Clone, Default)]
    pub(crate) struct ManualScheduler {
        recorded: Arc<Mutex<Recorded>>,
    }

    impl ManualScheduler {
        pub(crate) fn plans(&self) -> Vec<(SessionId, Vec<ScheduledOp>)> {
            self.recorded.lock().unwrap().plans.clone()
        }

        pub(crate) fn handle(&self, session: SessionId) -> Option<SessionHandle> {
            self.recorded
                .lock()
                .unwrap()
                .handles
                .iter()
                .find(|(id, _)| *id == session)
                .map(|(_, handle)| handle.clone())
        }
    }

    impl TimerScheduler for ManualScheduler {
        fn arm(&mut self, session: SessionId, plan: Vec<ScheduledOp>) -> ArmedSession {
            let armed = ArmedSession::new(session, plan.len());
            let handle = SessionHandle {
                token: armed.token.clone(),
                pending: Arc::clone(&armed.pending),
            };
            let mut recorded = self.recorded.lock().unwrap();
            recorded.plans.push((session, plan));
            recorded.handles.push((session, handle));
            armed
        }
    }
}
