use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::poll::VisibilitySignal;

type TickFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
type TickFn = Arc<dyn Fn() -> TickFuture + Send + Sync>;

/// Repeatedly invokes a caller-supplied async callback while the user can
/// see the session, pausing while hidden and resuming with an immediate
/// catch-up tick when visibility returns.
///
/// The callback is fire-and-forget: the controller never awaits it, never
/// serializes overlapping invocations, and never looks at what it did.
/// Anything a tick needs to do about its own failure (retry, notify, give
/// up) belongs inside the callback.
pub struct PollController {
    state: Arc<Mutex<State>>,
    visibility: VisibilitySignal,
    subscription: Option<JoinHandle<()>>,
}

struct State {
    /// Latest callback. Read at tick time, never captured by the timer, so
    /// swapping it takes effect on the very next tick.
    callback: Option<TickFn>,
    interval: Duration,
    timer: Option<JoinHandle<()>>,
    /// Bumped on every stop. A timer task that wakes up holding a stale
    /// epoch exits without firing, so a tick that raced `deactivate` is
    /// dropped instead of delivered.
    epoch: u64,
    /// True between `activate` and `deactivate`. Visibility transitions only
    /// restart the timer while engaged.
    engaged: bool,
}

impl PollController {
    /// Must be created (and used) inside a tokio runtime; ticks are driven
    /// by spawned tasks.
    pub fn new(visibility: VisibilitySignal) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                callback: None,
                interval: Duration::ZERO,
                timer: None,
                epoch: 0,
                engaged: false,
            })),
            visibility,
            subscription: None,
        }
    }

    /// Begin (or reconfigure) the poll session.
    ///
    /// Fires one immediate catch-up tick, then ticks every `interval`. While
    /// a timer is already running with the same period this only installs
    /// the new callback; it never creates a second timer. A changed period
    /// is a full reconfiguration: the old timer is torn down and the new one
    /// starts with its own catch-up tick.
    ///
    /// A zero `interval` makes the whole call inert: no tick, no timer, no
    /// visibility subscription.
    pub fn activate<C, F>(&mut self, callback: C, interval: Duration)
    where
        C: Fn() -> F + Send + Sync + 'static,
        F: Future<Output = ()> + Send + 'static,
    {
        if interval.is_zero() {
            return;
        }

        let callback: TickFn = Arc::new(move || Box::pin(callback()) as TickFuture);

        {
            let mut state = self.state.lock();
            state.callback = Some(callback);
            state.engaged = true;
            if state.interval != interval {
                stop_timer(&mut state);
                state.interval = interval;
            }
            start_timer(&mut state, &self.state);
        }

        self.ensure_subscribed();
    }

    /// End the poll session: cancel the timer, keep the visibility
    /// subscription. Safe to call in any state.
    pub fn deactivate(&mut self) {
        let mut state = self.state.lock();
        state.engaged = false;
        stop_timer(&mut state);
    }

    /// Permanent teardown: cancel the timer and drop the visibility
    /// subscription so a later visible transition cannot restart anything.
    pub fn shutdown(&mut self) {
        self.deactivate();
        if let Some(subscription) = self.subscription.take() {
            subscription.abort();
        }
    }

    #[allow(dead_code)]
    pub fn is_running(&self) -> bool {
        self.state.lock().timer.is_some()
    }

    fn ensure_subscribed(&mut self) {
        if self.subscription.is_some() {
            return;
        }

        let mut rx = self.visibility.subscribe();
        let shared = Arc::clone(&self.state);
        self.subscription = Some(tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let visible = *rx.borrow_and_update();
                let mut state = shared.lock();
                if visible {
                    if state.engaged {
                        start_timer(&mut state, &shared);
                    }
                } else {
                    stop_timer(&mut state);
                }
            }
        }));
    }
}

impl Drop for PollController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawn the repeating timer if none is running. The first tick of
/// `tokio::time::interval` completes immediately, which is exactly the
/// catch-up tick the contract asks for.
fn start_timer(state: &mut State, shared: &Arc<Mutex<State>>) {
    if state.timer.is_some() || state.callback.is_none() || state.interval.is_zero() {
        return;
    }

    let epoch = state.epoch;
    let period = state.interval;
    let shared = Arc::clone(shared);
    state.timer = Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let callback = {
                let state = shared.lock();
                if state.epoch != epoch {
                    return;
                }
                state.callback.clone()
            };
            if let Some(callback) = callback {
                tokio::spawn(callback());
            }
        }
    }));
}

fn stop_timer(state: &mut State) {
    state.epoch = state.epoch.wrapping_add(1);
    if let Some(timer) = state.timer.take() {
        timer.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PERIOD: Duration = Duration::from_secs(1);

    fn counting_callback(count: &Arc<AtomicUsize>) -> impl Fn() -> TickFuture {
        let count = Arc::clone(count);
        move || {
            let count = Arc::clone(&count);
            Box::pin(async move {
                count.fetch_add(1, Ordering::SeqCst);
            }) as TickFuture
        }
    }

    /// Let spawned timer and callback tasks run without moving the clock.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    async fn advance(duration: Duration) {
        tokio::time::advance(duration).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_tick() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut controller = PollController::new(VisibilitySignal::visible());

        controller.activate(counting_callback(&count), PERIOD);
        settle().await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_periodicity() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut controller = PollController::new(VisibilitySignal::visible());

        controller.activate(counting_callback(&count), PERIOD);
        settle().await;

        for expected in 2..=4 {
            advance(PERIOD).await;
            assert_eq!(count.load(Ordering::SeqCst), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_activate_is_single_timer() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut controller = PollController::new(VisibilitySignal::visible());

        controller.activate(counting_callback(&count), PERIOD);
        settle().await;
        controller.activate(counting_callback(&count), PERIOD);
        settle().await;

        // Second activate adds no extra immediate tick and no second timer.
        assert_eq!(count.load(Ordering::SeqCst), 1);
        advance(PERIOD).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        advance(PERIOD).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_on_hidden() {
        let count = Arc::new(AtomicUsize::new(0));
        let signal = VisibilitySignal::visible();
        let mut controller = PollController::new(signal.clone());

        controller.activate(counting_callback(&count), PERIOD);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        signal.set_visible(false);
        settle().await;

        advance(PERIOD * 5).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_catch_up_tick() {
        let count = Arc::new(AtomicUsize::new(0));
        let signal = VisibilitySignal::visible();
        let mut controller = PollController::new(signal.clone());

        controller.activate(counting_callback(&count), PERIOD);
        settle().await;
        signal.set_visible(false);
        settle().await;
        advance(PERIOD * 3).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Exactly one catch-up tick on resume, then the regular cadence.
        signal.set_visible(true);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        advance(PERIOD).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deactivate_stops_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut controller = PollController::new(VisibilitySignal::visible());

        controller.activate(counting_callback(&count), PERIOD);
        settle().await;
        controller.deactivate();
        settle().await;

        advance(PERIOD * 5).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!controller.is_running());

        // Idempotent.
        controller.deactivate();
    }

    #[tokio::test(start_paused = true)]
    async fn test_visible_transition_does_not_revive_deactivated_session() {
        let count = Arc::new(AtomicUsize::new(0));
        let signal = VisibilitySignal::visible();
        let mut controller = PollController::new(signal.clone());

        controller.activate(counting_callback(&count), PERIOD);
        settle().await;
        controller.deactivate();
        settle().await;

        signal.set_visible(false);
        settle().await;
        signal.set_visible(true);
        settle().await;
        advance(PERIOD * 3).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_inert() {
        let count = Arc::new(AtomicUsize::new(0));
        let signal = VisibilitySignal::visible();
        let mut controller = PollController::new(signal.clone());

        controller.activate(counting_callback(&count), Duration::ZERO);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!controller.is_running());

        // Not subscribed either: visibility churn starts nothing.
        signal.set_visible(false);
        settle().await;
        signal.set_visible(true);
        settle().await;
        advance(PERIOD * 3).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_callback_wins() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut controller = PollController::new(VisibilitySignal::visible());

        controller.activate(counting_callback(&first), PERIOD);
        settle().await;
        assert_eq!(first.load(Ordering::SeqCst), 1);

        // Swap without deactivating: no extra immediate tick, and the next
        // scheduled tick runs the new callback.
        controller.activate(counting_callback(&second), PERIOD);
        settle().await;
        assert_eq!(second.load(Ordering::SeqCst), 0);

        advance(PERIOD).await;
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_restarts_with_catch_up() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut controller = PollController::new(VisibilitySignal::visible());

        controller.activate(counting_callback(&count), PERIOD);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        controller.activate(counting_callback(&count), PERIOD * 2);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        advance(PERIOD).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        advance(PERIOD).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_removes_subscription() {
        let count = Arc::new(AtomicUsize::new(0));
        let signal = VisibilitySignal::visible();
        let mut controller = PollController::new(signal.clone());

        controller.activate(counting_callback(&count), PERIOD);
        settle().await;
        controller.shutdown();
        settle().await;

        signal.set_visible(false);
        settle().await;
        signal.set_visible(true);
        settle().await;
        advance(PERIOD * 3).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_callback_does_not_block_schedule() {
        let started = Arc::new(AtomicUsize::new(0));
        let callback = {
            let started = Arc::clone(&started);
            move || {
                let started = Arc::clone(&started);
                async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    // Slower than the interval; ticks must still fire.
                    tokio::time::sleep(PERIOD * 10).await;
                }
            }
        };

        let mut controller = PollController::new(VisibilitySignal::visible());
        controller.activate(callback, PERIOD);
        settle().await;
        assert_eq!(started.load(Ordering::SeqCst), 1);

        advance(PERIOD).await;
        advance(PERIOD).await;
        assert_eq!(started.load(Ordering::SeqCst), 3);
    }
}
