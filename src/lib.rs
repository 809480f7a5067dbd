//! Task aggregation and reporting.
//!
//! Tasks are recurring performance objectives with one or more managers.
//! Managers journal monthly activity against each task; this crate rebuilds
//! the department hierarchy, batches the lookups a listing needs, and
//! derives each task's achievement from its journal.

pub mod achievement;
pub mod assemble;
pub mod model;
pub mod notify;
pub mod org;
pub mod prefetch;
pub mod report;
pub mod storage;
