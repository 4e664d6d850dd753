//! Core types shared across filevault facilities
//!
//! - **Correlation**: `RequestId`, attached to log events and errors of a
//!   single upload or load
//! - **Schema constants**: canonical field keys and event names used by the
//!   logging facility

pub mod correlation;
pub mod schema;

pub use correlation::RequestId;
