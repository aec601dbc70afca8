//! `TaskQueue`: deferred callbacks keyed to simulation ticks.
//!
//! # Layout
//!
//! Tasks live in a `BTreeMap<Tick, Vec<ScheduledTask>>` keyed by due tick,
//! plus a `TaskId → Tick` index so cancellation finds the bucket in
//! O(log W) (W = distinct due ticks).  Each tick only the buckets at or before
//! the current tick are touched, so idle future work costs nothing.
//!
//! # Ordering
//!
//! Within one `process_tasks` call tasks run by descending [`TaskPriority`],
//! then by enqueue order (a monotonically increasing sequence number), so
//! equal-priority tasks are FIFO.
//!
//! # At-most-once
//!
//! A task is removed from the queue (and the index) before its callback runs,
//! so it cannot fire twice for the same due tick and `cancel_task` returns
//! `false` once it has fired.  Repeating tasks are re-inserted with a fresh
//! due tick after firing and keep their id.
//!
//! # Timing details
//!
//! - Tasks whose due tick is already in the past fire at the next
//!   `process_tasks` call instead of being dropped.
//! - `process_tasks` snapshots the due set before running callbacks; work
//!   scheduled for the current tick while a batch runs fires no earlier than
//!   the next call.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashMap;
use tf_core::{Fault, TaskId, Tick, guard};
use tracing::{debug, warn};

/// Boxed task body.  Receives the shared simulation context `C`.
pub type TaskFn<C> = Box<dyn FnMut(&mut C) -> Result<(), Fault>>;

// ── Priority ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub enum TaskPriority {
    Low,
    #[default]
    Normal,
    High,
    /// Maintenance work that may also run from the wall-clock critical sweep.
    Critical,
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskPriority::Low      => "low",
            TaskPriority::Normal   => "normal",
            TaskPriority::High     => "high",
            TaskPriority::Critical => "critical",
        };
        f.write_str(s)
    }
}

// ── ScheduledTask ─────────────────────────────────────────────────────────────

struct ScheduledTask<C> {
    id:       TaskId,
    priority: TaskPriority,
    due:      Tick,
    /// Enqueue order; FIFO tie-break within a priority.
    seq:      u64,
    repeat:   Option<u64>,
    callback: TaskFn<C>,
}

/// Counters returned by one processing pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskRunStats {
    pub fired:  usize,
    pub failed: usize,
}

impl std::ops::AddAssign for TaskRunStats {
    fn add_assign(&mut self, rhs: TaskRunStats) {
        self.fired += rhs.fired;
        self.failed += rhs.failed;
    }
}

// ── TaskQueue ─────────────────────────────────────────────────────────────────

/// Priority task scheduler bound to simulation ticks.
///
/// `C` is the context every callback receives mutably; in the simulation it
/// is the world state, never the queue itself.
pub struct TaskQueue<C> {
    buckets:      BTreeMap<Tick, Vec<ScheduledTask<C>>>,
    index:        FxHashMap<TaskId, Tick>,
    next_id:      u64,
    next_seq:     u64,
    current_tick: Tick,
}

impl<C> Default for TaskQueue<C> {
    fn default() -> Self {
        Self {
            buckets:      BTreeMap::new(),
            index:        FxHashMap::default(),
            next_id:      0,
            next_seq:     0,
            current_tick: Tick::ZERO,
        }
    }
}

impl<C> TaskQueue<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tick of the most recent `process_tasks` call.  New tasks are
    /// scheduled relative to it.
    #[inline]
    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// Schedule a one-shot task at `current_tick + delay_ticks`.
    pub fn schedule_task<F>(&mut self, callback: F, priority: TaskPriority, delay_ticks: u64) -> TaskId
    where
        F: FnMut(&mut C) -> Result<(), Fault> + 'static,
    {
        let due = self.current_tick.offset(delay_ticks);
        self.insert(Box::new(callback), priority, due, None)
    }

    /// Schedule a task that fires every `interval_ticks` (clamped to ≥ 1).
    ///
    /// The first firing is `initial_delay_ticks` after the current tick, or
    /// one full interval when `None`.
    pub fn schedule_repeating_task<F>(
        &mut self,
        callback:            F,
        interval_ticks:      u64,
        initial_delay_ticks: Option<u64>,
        priority:            TaskPriority,
    ) -> TaskId
    where
        F: FnMut(&mut C) -> Result<(), Fault> + 'static,
    {
        let interval = interval_ticks.max(1);
        let due = self.current_tick.offset(initial_delay_ticks.unwrap_or(interval));
        self.insert(Box::new(callback), priority, due, Some(interval))
    }

    /// Remove a pending task.  Returns `false` if it already fired (one-shot)
    /// or the id is unknown.
    pub fn cancel_task(&mut self, id: TaskId) -> bool {
        let Some(due) = self.index.remove(&id) else {
            return false;
        };
        if let Some(bucket) = self.buckets.get_mut(&due) {
            bucket.retain(|t| t.id != id);
            if bucket.is_empty() {
                self.buckets.remove(&due);
            }
        }
        debug!(task = %id, due = %due, "task cancelled");
        true
    }

    /// Execute every task due at or before `now`, highest priority first,
    /// FIFO within a priority.
    ///
    /// A failing callback is logged and counted; the remaining tasks still run.
    pub fn process_tasks(&mut self, now: Tick, ctx: &mut C) -> TaskRunStats {
        self.current_tick = self.current_tick.max(now);

        // Detach every bucket with key <= now.
        let later = self.buckets.split_off(&now.offset(1));
        let due_buckets = std::mem::replace(&mut self.buckets, later);
        let mut batch: Vec<ScheduledTask<C>> = due_buckets.into_values().flatten().collect();
        batch.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));

        self.run_batch(batch, now, ctx)
    }

    /// Run CRITICAL tasks due at or before `up_to`, ahead of normal tick
    /// processing.
    ///
    /// Called from the wall-clock critical sweep with the tick wall time says
    /// we should be at, so maintenance keeps its cadence while the tick loop
    /// is backlogged.  Tasks fired here are gone from the queue and will not
    /// fire again when their tick is processed.
    pub fn process_critical_tasks(&mut self, up_to: Tick, ctx: &mut C) -> TaskRunStats {
        let mut batch = Vec::new();
        let keys: Vec<Tick> = self.buckets.range(..=up_to).map(|(&t, _)| t).collect();
        for key in keys {
            let Some(bucket) = self.buckets.get_mut(&key) else { continue };
            let (critical, rest): (Vec<_>, Vec<_>) = std::mem::take(bucket)
                .into_iter()
                .partition(|t| t.priority == TaskPriority::Critical);
            if rest.is_empty() {
                self.buckets.remove(&key);
            } else {
                *bucket = rest;
            }
            batch.extend(critical);
        }
        batch.sort_by(|a, b| a.due.cmp(&b.due).then(a.seq.cmp(&b.seq)));

        let anchor = self.current_tick.max(up_to);
        self.run_batch(batch, anchor, ctx)
    }

    /// `true` while `id` is pending.
    pub fn contains(&self, id: TaskId) -> bool {
        self.index.contains_key(&id)
    }

    /// The earliest due tick with at least one pending task.
    pub fn next_due(&self) -> Option<Tick> {
        self.buckets.keys().next().copied()
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn insert(
        &mut self,
        callback: TaskFn<C>,
        priority: TaskPriority,
        due:      Tick,
        repeat:   Option<u64>,
    ) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.enqueue(ScheduledTask { id, priority, due, seq: 0, repeat, callback });
        id
    }

    fn enqueue(&mut self, mut task: ScheduledTask<C>) {
        task.seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(task.id, task.due);
        self.buckets.entry(task.due).or_default().push(task);
    }

    fn run_batch(&mut self, batch: Vec<ScheduledTask<C>>, now: Tick, ctx: &mut C) -> TaskRunStats {
        let mut stats = TaskRunStats::default();
        for mut task in batch {
            // Every detached task still has its index entry; keep the
            // check so a missing entry can never fire.
            if self.index.remove(&task.id).is_none() {
                continue;
            }
            stats.fired += 1;
            let callback = &mut task.callback;
            if let Err(fault) = guard(|| callback(&mut *ctx)) {
                stats.failed += 1;
                warn!(
                    task = %task.id,
                    priority = %task.priority,
                    due = %task.due,
                    %fault,
                    "scheduled task failed"
                );
            }
            if let Some(interval) = task.repeat {
                task.due = now.offset(interval);
                self.enqueue(task);
            }
        }
        stats
    }
}
