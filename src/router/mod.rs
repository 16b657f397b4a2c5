//! Route table and path-pattern matching.
//!
//! Routes are registered at setup time and scanned in registration order at
//! request time; the first structural match wins. Patterns support literal
//! segments and single-segment `:name` parameters only.

pub mod pattern;
pub mod route;

pub use pattern::{PathPattern, Segment};
pub use route::{Route, RouteMatch, RouteTable};
