mod fixed;
mod union;

pub use fixed::{FixedBox, FixedDeg, RingKey, ring_key};
pub use union::union_all;
