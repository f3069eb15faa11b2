//! The `BlueprintProvider` trait -- the seam to the external planning
//! service.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::ProviderError;
use crate::blueprint::{BlueprintRequest, BlueprintResponse};

/// Source of raw goal blueprints.
///
/// Implementations own transport, authentication and timeouts. A call
/// either yields a parsed [`BlueprintResponse`] (possibly with zero goals)
/// or a [`ProviderError`].
#[async_trait]
pub trait BlueprintProvider: Send + Sync {
    /// Human-readable name, used in logs.
    fn name(&self) -> &str;

    /// Generate blueprints for every goal context in `request`.
    async fn generate(&self, request: &BlueprintRequest)
    -> Result<BlueprintResponse, ProviderError>;
}

#[async_trait]
impl<P: BlueprintProvider + ?Sized> BlueprintProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(
        &self,
        request: &BlueprintRequest,
    ) -> Result<BlueprintResponse, ProviderError> {
        (**self).generate(request).await
    }
}

#[async_trait]
impl<P: BlueprintProvider + ?Sized> BlueprintProvider for &P {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate(
        &self,
        request: &BlueprintRequest,
    ) -> Result<BlueprintResponse, ProviderError> {
        (**self).generate(request).await
    }
}

// Compile-time assertion: BlueprintProvider must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn BlueprintProvider) {}
};
