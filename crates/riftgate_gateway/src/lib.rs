//! Rate-limited request gateway for the upstream game-data service.
//!
//! Every upstream call made with one credential goes through one
//! [`Gateway`]. The gateway keeps a FIFO queue of pending calls and a single
//! drain loop that admits them one at a time, sleeping whenever the
//! [`DualWindowLimiter`](riftgate_rate_limit::DualWindowLimiter) says so.
//!
//! The drain loop starts on the first submission and stops when the queue is
//! empty. It never runs twice for the same gateway. Independent gateways
//! share nothing and drain in parallel.

mod gateway;
mod request;

pub use gateway::Gateway;
