//! The lifecycle contract a declarative driver uses to manage one kind of
//! catalog object.
//!
//! A driver keeps the last observed state of each object. On every pass it
//! calls [`Resource::read`] to pick up drift, then `create`, `update` or
//! `delete` to converge. Absence is expressed as `None`, never as an error:
//! when `read` returns `None` the driver drops the object from its state.

use std::future::Future;

/// Something with a stable identity across reconciliation passes.
pub trait Identity {
    fn id(&self) -> &str;
}

pub trait Resource: Send + Sync {
    /// Declared state, as written by the user.
    type Desired: Send + Sync;

    /// Observed state, as read back from the catalog.
    type Observed: Identity + Clone + Send + Sync;

    /// Human-readable kind, used in logs.
    const KIND: &'static str;

    /// Create the object and read it back.
    ///
    /// Returns `None` if the object vanished between the two steps.
    fn create(
        &self,
        desired: &Self::Desired,
    ) -> impl Future<Output = crate::Result<Option<Self::Observed>>> + Send;

    /// Whether an object with this identity exists.
    fn exists(&self, id: &str) -> impl Future<Output = crate::Result<bool>> + Send;

    /// Observe the object. `None` means it is gone.
    fn read(&self, id: &str)
    -> impl Future<Output = crate::Result<Option<Self::Observed>>> + Send;

    /// Converge the object from its last observed state to `desired`, then
    /// read it back. Attributes that already match are left alone; when
    /// nothing differs no SQL is sent and `previous` is returned as is.
    fn update(
        &self,
        id: &str,
        previous: &Self::Observed,
        desired: &Self::Desired,
    ) -> impl Future<Output = crate::Result<Option<Self::Observed>>> + Send;

    /// Remove the object. On success its identity is gone.
    fn delete(&self, id: &str) -> impl Future<Output = crate::Result<()>> + Send;

    /// Adopt an existing object. The raw id is used as the identity as is.
    fn import(
        &self,
        raw_id: &str,
    ) -> impl Future<Output = crate::Result<Option<Self::Observed>>> + Send {
        self.read(raw_id)
    }
}
