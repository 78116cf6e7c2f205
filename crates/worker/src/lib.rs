//! Periodic jobs run outside the request path.
//!
//! Currently only the daily project snapshot, shared by the `pmo-worker`
//! binary, the API's background loop and the admin endpoint.

pub mod snapshots;
