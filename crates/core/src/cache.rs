//! TTL-bounded memoization with a per-key single-flight recompute guard.
//!
//! Sits in front of the affinity rebuild and the per-item pairing lookups.
//! Not authoritative: entries expire by time, and an expired entry is served
//! stale while exactly one caller recomputes it, trading staleness for
//! latency under load instead of letting every request repeat the work.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::{watch, Mutex};

type Inflight<V, E> = watch::Receiver<Option<Result<V, E>>>;

struct Slot<V, E> {
    value: Option<(V, Instant)>,
    inflight: Option<Inflight<V, E>>,
}

impl<V, E> Slot<V, E> {
    fn empty() -> Self {
        Self { value: None, inflight: None }
    }
}

enum Action<V, E> {
    Hit(V),
    Wait(Inflight<V, E>),
    Lead(watch::Sender<Option<Result<V, E>>>),
}

pub struct TtlCache<K, V, E> {
    slots: Mutex<HashMap<K, Slot<V, E>>>,
}

impl<K, V, E> Default for TtlCache<K, V, E> {
    fn default() -> Self {
        Self { slots: Mutex::new(HashMap::new()) }
    }
}

impl<K, V, E> TtlCache<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, recomputing it at most once across
    /// concurrent callers when missing or expired.
    ///
    /// While a recompute is in flight, callers holding an expired value get
    /// the stale value immediately; callers with no value at all wait for the
    /// in-flight result. A failed recompute reaches the leader and every
    /// waiter, and leaves any stale value in place for the next attempt.
    pub async fn get_or_compute<F, Fut>(&self, key: K, ttl: Duration, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let mut compute = Some(compute);

        loop {
            let action = {
                let mut slots = self.slots.lock().await;
                let slot = slots.entry(key.clone()).or_insert_with(Slot::empty);

                // A receiver whose sender is gone marks a recompute that was
                // cancelled mid-flight; discard the guard and take over.
                let inflight_dead =
                    slot.inflight.as_ref().map(|rx| rx.has_changed().is_err()).unwrap_or(false);
                if inflight_dead {
                    slot.inflight = None;
                }

                if let Some((value, expires_at)) = &slot.value {
                    // Fresh, or expired with a refresh already running:
                    // either way the last-good value is the answer.
                    if *expires_at > Instant::now() || slot.inflight.is_some() {
                        Action::Hit(value.clone())
                    } else {
                        let (tx, rx) = watch::channel(None);
                        slot.inflight = Some(rx);
                        Action::Lead(tx)
                    }
                } else if let Some(rx) = &slot.inflight {
                    Action::Wait(rx.clone())
                } else {
                    let (tx, rx) = watch::channel(None);
                    slot.inflight = Some(rx);
                    Action::Lead(tx)
                }
            };

            match action {
                Action::Hit(value) => return Ok(value),
                Action::Wait(mut rx) => {
                    if rx.changed().await.is_ok() {
                        if let Some(result) = rx.borrow().clone() {
                            return result;
                        }
                    }
                    // Leader vanished without publishing; retry as leader.
                }
                Action::Lead(tx) => {
                    // Lead always returns, so the closure is consumed at
                    // most once even across Wait retries.
                    let compute = match compute.take() {
                        Some(compute) => compute,
                        None => unreachable!("single-flight leader runs at most once"),
                    };

                    let result = compute().await;

                    let mut slots = self.slots.lock().await;
                    let slot = slots.entry(key.clone()).or_insert_with(Slot::empty);
                    slot.inflight = None;
                    if let Ok(value) = &result {
                        slot.value = Some((value.clone(), Instant::now() + ttl));
                    }
                    drop(slots);

                    let _ = tx.send(Some(result.clone()));
                    return result;
                }
            }
        }
    }

    /// Drop the cached value and any staleness state for `key`. The next
    /// reader recomputes. Used by explicit manager-triggered refreshes.
    pub async fn invalidate(&self, key: &K) {
        let mut slots = self.slots.lock().await;
        if let Some(slot) = slots.get_mut(key) {
            slot.value = None;
        }
    }

    /// Drop every cached value.
    pub async fn clear(&self) {
        let mut slots = self.slots.lock().await;
        for slot in slots.values_mut() {
            slot.value = None;
        }
    }
}
