//! Reconciler capability trait.

use appmixer_client::AppmixerClient;
use async_trait::async_trait;

use crate::error::ReconcileResult;

/// Lifecycle of one remote entity kind.
///
/// The host owns persistence: it stores the record returned by `create`,
/// `update` and `import`, passes it back to `read`/`update`/`delete`, and
/// drops it when `read` returns `None` or `delete` succeeds.
#[async_trait]
pub trait Reconciler: Send + Sync {
    /// Desired state supplied by the host.
    type Spec: Send + Sync;

    /// Observed state persisted by the host.
    type Record: Send + Sync;

    /// Entity kind used in logs and errors, e.g. "user".
    fn kind(&self) -> &'static str;

    /// Remote identifier of a record.
    fn record_id<'a>(&self, record: &'a Self::Record) -> &'a str;

    /// Whether moving from `record` to `spec` needs delete + create.
    fn requires_replacement(&self, record: &Self::Record, spec: &Self::Spec) -> bool;

    /// Fields `update` would change, in a stable order.
    fn changed_fields(&self, record: &Self::Record, spec: &Self::Spec) -> Vec<&'static str>;

    /// Whether `update` would change anything.
    fn needs_update(&self, record: &Self::Record, spec: &Self::Spec) -> bool {
        !self.changed_fields(record, spec).is_empty()
    }

    /// Create the entity and return its record.
    async fn create(
        &self,
        client: &AppmixerClient,
        spec: &Self::Spec,
    ) -> ReconcileResult<Self::Record>;

    /// Refresh a record. `None` means the entity is gone remotely.
    async fn read(
        &self,
        client: &AppmixerClient,
        record: &Self::Record,
    ) -> ReconcileResult<Option<Self::Record>>;

    /// Apply the mutable fields of `spec` and return the refreshed record.
    async fn update(
        &self,
        client: &AppmixerClient,
        record: &Self::Record,
        spec: &Self::Spec,
    ) -> ReconcileResult<Self::Record>;

    /// Delete the entity. Returns once the deletion is complete.
    async fn delete(&self, client: &AppmixerClient, record: &Self::Record) -> ReconcileResult<()>;

    /// Adopt an existing entity by id. Not found is an error.
    async fn import(&self, client: &AppmixerClient, id: &str) -> ReconcileResult<Self::Record>;
}
