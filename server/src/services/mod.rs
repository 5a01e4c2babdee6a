//! Orchestration between the booking core, the cinema backend, and the
//! hold store. Handlers stay thin and call into these.

pub mod booking;
pub mod catalog;
pub mod maintenance;
