//! Durable schedule of approved posts.
//!
//! Backed by a single SQLite table. A connection is opened for each
//! logical operation (initialize, write batch, read) and released when
//! the operation's scope ends, on success and error paths alike.

mod store;

pub use store::{CommitReport, ScheduleStore, SkippedPost};
