//! Testing utilities for CrabLens
//!
//! Provides device profiles modeled on shipping phone camera stacks and a
//! scriptable session adapter, so the resolver and the switchover logic can
//! be exercised without camera hardware.

pub mod fake_session;
pub mod profiles;
pub mod synthetic_data;

pub use fake_session::{FakeSessionAdapter, SessionCall};
pub use synthetic_data::synthetic_image;
