//! Location provider abstraction
//!
//! This module stands between the tracking controller and whatever device
//! service produces position fixes: a scripted mock for tests and demos, and
//! a replay provider that plays back a recorded track with real pacing.

pub mod provider;
pub mod mock;
pub mod replay;
pub mod error;

pub use provider::{FixHandler, LocationProvider};
pub use mock::MockProvider;
pub use replay::{ReplayProvider, Track, TrackSample};
pub use error::{ProviderError, ProviderResult};
