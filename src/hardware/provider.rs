//! Location provider interface

use crate::core::{Fix, UpdateThresholds};
use crate::hardware::ProviderResult;

/// Callback invoked by a provider for every delivered fix
///
/// Providers may call this from their own thread.
pub type FixHandler = Box<dyn Fn(Fix) + Send>;

/// Abstraction over a device location service
pub trait LocationProvider {
    /// Register the handler that receives fixes, replacing any previous one
    fn configure(&mut self, handler: FixHandler);

    /// Begin delivering fixes, suppressing updates closer than `thresholds`
    fn start(&mut self, thresholds: &UpdateThresholds) -> ProviderResult<()>;

    /// Stop delivering fixes
    ///
    /// A fix already handed to the handler before this call may still be
    /// observed by the receiver afterwards.
    fn stop(&mut self) -> ProviderResult<()>;

    fn is_running(&self) -> bool;

    /// Short name for logging
    fn name(&self) -> &str;
}
