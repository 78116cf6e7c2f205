//! Tasks spawned by `main.rs` next to the HTTP server. Each one runs until
//! its `CancellationToken` fires.

pub mod snapshot_scheduler;
