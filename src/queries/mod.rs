//! Query interfaces for the rate history.
//!
//! Each query struct borrows from a [`RecordStore`](crate::store::RecordStore)
//! and exposes methods returning `Result<T>` with typed payloads.

pub mod rates;

pub use rates::RateQuery;
