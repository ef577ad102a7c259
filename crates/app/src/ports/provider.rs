//! Provider port: one interchangeable source of sensor readings.
//!
//! Adapters implement [`Provider`]. The [`SensorManager`](crate::sensor_manager::SensorManager)
//! holds a priority-ordered list of heterogeneous providers, so it works
//! through the object-safe [`DynProvider`] shim which every `Provider`
//! implements automatically.

use std::future::Future;
use std::time::Duration;

use futures_util::FutureExt as _;
use futures_util::future::BoxFuture;

use sensorcast_domain::definition::Definition;
use sensorcast_domain::error::ProviderError;
use sensorcast_domain::provider::ProviderClass;
use sensorcast_domain::reading::Reading;

/// Settings handed to a provider when it is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderConfig {
    /// How often the manager will call [`Provider::read_all`].
    pub poll_interval: Duration,
    /// Upper bound the manager enforces on a single read.
    pub read_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            read_timeout: Duration::from_secs(5),
        }
    }
}

/// A pluggable data source.
///
/// Lifecycle, as driven by the manager:
///
/// 1. [`initialize`](Self::initialize): probe the backend; `false` means
///    the provider is unusable and will be closed
/// 2. [`is_available`](Self::is_available): checked after initialisation
///    and before every read
/// 3. [`read_all`](Self::read_all): called once per collection tick
/// 4. [`close`](Self::close): release backend resources
pub trait Provider: Send + Sync {
    /// Stable identifier that tags every reading (e.g. `"mock"`).
    fn source_id(&self) -> &str;

    /// Human-readable name shown in provider statuses.
    fn display_name(&self) -> &str;

    /// Priority class used by the activation policy.
    fn class(&self) -> ProviderClass;

    /// Prepare the backend.
    ///
    /// Never fails to the caller: failures are reported by returning
    /// `false`, after which the provider must report itself unavailable.
    fn initialize(&mut self, config: &ProviderConfig) -> impl Future<Output = bool> + Send;

    /// Release backend resources. Calling it more than once is harmless.
    fn close(&self) -> impl Future<Output = ()> + Send;

    /// Whether the provider can currently produce readings.
    fn is_available(&self) -> impl Future<Output = bool> + Send;

    /// Static descriptors of every sensor this provider exposes.
    fn list_definitions(&self) -> Vec<Definition>;

    /// Sample every sensor once.
    fn read_all(&self) -> impl Future<Output = Result<Vec<Reading>, ProviderError>> + Send;
}

/// Object-safe mirror of [`Provider`], used to store providers of
/// different concrete types in one list.
pub trait DynProvider: Send + Sync {
    fn source_id(&self) -> &str;

    fn display_name(&self) -> &str;

    fn class(&self) -> ProviderClass;

    fn initialize<'a>(&'a mut self, config: &'a ProviderConfig) -> BoxFuture<'a, bool>;

    fn close(&self) -> BoxFuture<'_, ()>;

    fn is_available(&self) -> BoxFuture<'_, bool>;

    fn list_definitions(&self) -> Vec<Definition>;

    fn read_all(&self) -> BoxFuture<'_, Result<Vec<Reading>, ProviderError>>;
}

impl<P: Provider> DynProvider for P {
    fn source_id(&self) -> &str {
        Provider::source_id(self)
    }

    fn display_name(&self) -> &str {
        Provider::display_name(self)
    }

    fn class(&self) -> ProviderClass {
        Provider::class(self)
    }

    fn initialize<'a>(&'a mut self, config: &'a ProviderConfig) -> BoxFuture<'a, bool> {
        Provider::initialize(self, config).boxed()
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Provider::close(self).boxed()
    }

    fn is_available(&self) -> BoxFuture<'_, bool> {
        Provider::is_available(self).boxed()
    }

    fn list_definitions(&self) -> Vec<Definition> {
        Provider::list_definitions(self)
    }

    fn read_all(&self) -> BoxFuture<'_, Result<Vec<Reading>, ProviderError>> {
        Provider::read_all(self).boxed()
    }
}
