//! High-level services exposed by [`Bdk`](crate::Bdk).

mod session;

pub use session::{SessionService, UserSession};
