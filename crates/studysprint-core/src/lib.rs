//! # StudySprint Core Library
//!
//! This library provides the core business logic for the StudySprint study
//! timer. It implements a CLI-first philosophy where all operations are
//! available via a standalone CLI binary; any richer frontend is a thin
//! layer over the same core library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()` for progress updates
//! - **Progress**: Pure aggregation of recorded sessions into weekly
//!   totals, streaks and a day-by-day breakdown
//! - **Backend**: Typed clients for the REST document store (sessions,
//!   tasks, users, settings) behind swappable store traits
//! - **Storage**: SQLite-based checkpoint/cache state and TOML-based
//!   configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`ProgressReport`]: Aggregated weekly statistics
//! - [`ApiClient`]: HTTP backend client
//! - [`Database`]: Checkpoint and cache persistence
//! - [`Config`]: Application configuration management

pub mod timer;
pub mod progress;
pub mod backend;
pub mod storage;
pub mod session;
pub mod task;
pub mod user;
pub mod events;
pub mod error;

pub use timer::{
    ModeDurations, RestoredTimer, TimerEngine, TimerMode, TimerPhase, MODE_SWITCH_DELAY_MS,
};
pub use progress::{week_window, DayMinutes, ProgressReport, WeekWindow, WeeklyTotals};
pub use backend::{
    ApiClient, CachedSessions, MemoryBackend, RemoteSettings, SessionFeed, SessionStore,
    SettingsStore, TaskStore, UserStore, DEFAULT_TIMEOUT_SECS,
};
pub use storage::{data_dir, Config, Database, KeyValueStore, MemoryKv, SessionCacheEntry};
pub use session::{Session, SessionDraft, SessionLabel};
pub use task::{NewTask, Task, TaskPriority, TaskStatus, TaskUpdate};
pub use user::{NewUser, User};
pub use events::TimerEvent;
pub use error::{ConfigError, CoreError, DatabaseError, StoreError, ValidationError};
