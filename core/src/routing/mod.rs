pub mod reactor;

pub use reactor::{PageRouter, RoutingReactor};
