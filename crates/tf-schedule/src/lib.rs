//! `tf-schedule`: tick pacing and tick-keyed deferred work.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`clock`]      | `Clock` trait, `SystemClock`, `ManualClock`                |
//! | [`scheduler`]  | `TickScheduler`, `TickInfo`, `StopHandle`, `SchedulerStats`|
//! | [`task_queue`] | `TaskQueue<C>`, `TaskPriority`, `TaskRunStats`             |
//! | [`sweep`]      | `CriticalSweep` wall-clock maintenance trigger             |
//! | [`error`]      | `ScheduleError`, `ScheduleResult<T>`                       |
//!
//! # Per-tick order (summary)
//!
//! ```text
//! scheduler deadline(n) = T0 + n * interval   (absolute, drift-free)
//!   ├─ critical sweep due?  → task_queue.process_critical_tasks(wall_tick)
//!   ├─ task_queue.process_tasks(n)             (priority desc, FIFO)
//!   └─ agent pipeline for tick n               (tf-sim)
//! ```
//!
//! Everything runs on one thread; the only cross-thread object is the
//! [`StopHandle`].

pub mod clock;
pub mod error;
pub mod scheduler;
pub mod sweep;
pub mod task_queue;


pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ScheduleError, ScheduleResult};
pub use scheduler::{SchedulerStats, StopHandle, TickInfo, TickScheduler};
pub use sweep::CriticalSweep;
pub use task_queue::{TaskFn, TaskPriority, TaskQueue, TaskRunStats};
