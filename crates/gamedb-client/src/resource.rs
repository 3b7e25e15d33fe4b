//! Uniform CRUD over entity collections.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use gamedb_core::entity::{
    Ailment, Armor, ArmorSet, Charm, Decoration, Entity, Event, Item, Location, Monster,
    MotionValue, Skill, Weapon,
};
use gamedb_core::{Filter, Projection};

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::params::Params;

/// Typed access to one entity collection at `E::PATH`.
///
/// Each operation is exactly one request: no caching, batching or retry.
pub struct Resource<E> {
    client: ApiClient,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Resource<E> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for Resource<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("entity", &E::NAME)
            .field("path", &E::PATH)
            .finish()
    }
}

impl<E: Entity> Resource<E> {
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    fn item_path(id: u64) -> String {
        format!("{}/{id}", E::PATH)
    }

    /// Fetch the collection, optionally filtered and projected.
    pub async fn list(
        &self,
        filter: Option<&Filter>,
        projection: Option<&Projection>,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<Vec<E>> {
        let params = Params::new().filter(filter).projection(projection);
        let items: Vec<E> = self.client.get(E::PATH, &params, cancel).await?;
        debug!(entity = E::NAME, count = items.len(), "Listed entities");
        Ok(items)
    }

    pub async fn read(
        &self,
        id: u64,
        projection: Option<&Projection>,
        cancel: Option<&CancellationToken>,
    ) -> ApiResult<E> {
        let params = Params::new().projection(projection);
        self.client.get(&Self::item_path(id), &params, cancel).await
    }

    /// Create a record. The server answers with the stored entity.
    pub async fn create<P: Serialize + Sync>(
        &self,
        payload: &P,
        projection: Option<&Projection>,
    ) -> ApiResult<E> {
        let params = Params::new().projection(projection);
        let created: E = self.client.post(E::PATH, payload, &params).await?;
        debug!(entity = E::NAME, id = ?created.id(), "Created entity");
        Ok(created)
    }

    /// Partially update a record with the fields present in `payload`.
    pub async fn update<P: Serialize + Sync>(
        &self,
        id: u64,
        payload: &P,
        projection: Option<&Projection>,
    ) -> ApiResult<E> {
        let params = Params::new().projection(projection);
        self.client
            .patch(&Self::item_path(id), payload, &params)
            .await
    }

    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        let _: Value = self
            .client
            .delete(&Self::item_path(id), &Params::new())
            .await?;
        debug!(entity = E::NAME, id, "Deleted entity");
        Ok(())
    }
}

impl ApiClient {
    pub fn resource<E: Entity>(&self) -> Resource<E> {
        Resource::new(self.clone())
    }

    pub fn ailments(&self) -> Resource<Ailment> {
        self.resource()
    }

    pub fn armor(&self) -> Resource<Armor> {
        self.resource()
    }

    pub fn armor_sets(&self) -> Resource<ArmorSet> {
        self.resource()
    }

    pub fn charms(&self) -> Resource<Charm> {
        self.resource()
    }

    pub fn decorations(&self) -> Resource<Decoration> {
        self.resource()
    }

    pub fn events(&self) -> Resource<Event> {
        self.resource()
    }

    pub fn items(&self) -> Resource<Item> {
        self.resource()
    }

    pub fn locations(&self) -> Resource<Location> {
        self.resource()
    }

    pub fn monsters(&self) -> Resource<Monster> {
        self.resource()
    }

    pub fn motion_values(&self) -> Resource<MotionValue> {
        self.resource()
    }

    pub fn skills(&self) -> Resource<Skill> {
        self.resource()
    }

    pub fn weapons(&self) -> Resource<Weapon> {
        self.resource()
    }
}

/// "Last request wins": each `begin` cancels whatever the previous call
/// handed out.
#[derive(Debug, Default)]
pub struct LatestRequest {
    current: Mutex<Option<CancellationToken>>,
}

impl LatestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the previous request and return a token for the next one.
    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        token
    }

    pub fn cancel(&self) {
        if let Some(token) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }
}
