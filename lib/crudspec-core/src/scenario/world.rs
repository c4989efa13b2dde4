use serde::Serialize;
use tracing::{info, warn};

use super::World;
use crate::client::{HarnessError, NormalizedResponse, ResourceClient};
use crate::tracker::{CleanupReport, ResourceTracker};

/// World of a CRUD scenario: a client, a fresh tracker, the last response and the id of
/// the resource under test.
///
/// Operations going through the world record their response; a successful `create`
/// tracks the new id and makes it current, a successful `delete` untracks it. The
/// teardown deletes whatever is still tracked.
#[derive(Debug)]
pub struct ResourceWorld {
    client: ResourceClient,
    tracker: ResourceTracker,
    last_response: Option<NormalizedResponse>,
    current_id: Option<String>,
    cleanup: Option<CleanupReport>,
}

impl ResourceWorld {
    /// A fresh world: nothing tracked, no response recorded.
    pub fn new(client: ResourceClient) -> Self {
        Self {
            client,
            tracker: ResourceTracker::new(),
            last_response: None,
            current_id: None,
            cleanup: None,
        }
    }

    /// The client operations go through.
    pub fn client(&self) -> &ResourceClient {
        &self.client
    }

    /// Ids created so far and not yet deleted.
    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Mutable access, for steps that create resources outside the world helpers.
    pub fn tracker_mut(&mut self) -> &mut ResourceTracker {
        &mut self.tracker
    }

    /// Report of the teardown, once it ran.
    pub fn cleanup_report(&self) -> Option<&CleanupReport> {
        self.cleanup.as_ref()
    }

    /// The response of the latest operation.
    ///
    /// # Errors
    ///
    /// [`HarnessError::MissingState`] if no operation ran yet.
    pub fn last_response(&self) -> Result<&NormalizedResponse, HarnessError> {
        self.last_response
            .as_ref()
            .ok_or(HarnessError::MissingState { what: "response" })
    }

    /// Id of the resource under test.
    ///
    /// # Errors
    ///
    /// [`HarnessError::MissingState`] if nothing was created or selected.
    pub fn current_id(&self) -> Result<&str, HarnessError> {
        self.current_id
            .as_deref()
            .ok_or(HarnessError::MissingState { what: "resource id" })
    }

    /// Makes `id` the resource under test, e.g. one picked from a list.
    pub fn set_current_id(&mut self, id: impl Into<String>) {
        self.current_id = Some(id.into());
    }

    fn record(&mut self, response: NormalizedResponse) -> &NormalizedResponse {
        self.last_response.insert(response)
    }
}

// Operations
impl ResourceWorld {
    /// Lists the collection.
    ///
    /// # Errors
    ///
    /// See [`ResourceClient::list`].
    pub async fn list(&mut self) -> Result<&NormalizedResponse, HarnessError> {
        let response = self.client.list().await?;
        Ok(self.record(response))
    }

    /// Reads a resource by id.
    ///
    /// # Errors
    ///
    /// See [`ResourceClient::get_by_id`].
    pub async fn get(&mut self, id: &str) -> Result<&NormalizedResponse, HarnessError> {
        let response = self.client.get_by_id(id).await?;
        Ok(self.record(response))
    }

    /// Reads the resource under test.
    ///
    /// # Errors
    ///
    /// Without a current id, or see [`ResourceClient::get_by_id`].
    pub async fn get_current(&mut self) -> Result<&NormalizedResponse, HarnessError> {
        let id = self.current_id()?.to_string();
        self.get(&id).await
    }

    /// Creates a resource; on success its id is tracked and becomes current.
    ///
    /// # Errors
    ///
    /// See [`ResourceClient::create`].
    pub async fn create<T>(&mut self, fields: &T) -> Result<&NormalizedResponse, HarnessError>
    where
        T: Serialize + ?Sized,
    {
        let response = self.client.create(fields).await?;
        if response.is_success()
            && let Some(id) = response.id()
        {
            self.tracker.track(id.as_str());
            self.current_id = Some(id);
        }
        Ok(self.record(response))
    }

    /// Replaces the resource under test (`PUT`).
    ///
    /// # Errors
    ///
    /// Without a current id, or see [`ResourceClient::replace`].
    pub async fn replace_current<T>(
        &mut self,
        fields: &T,
    ) -> Result<&NormalizedResponse, HarnessError>
    where
        T: Serialize + ?Sized,
    {
        let id = self.current_id()?.to_string();
        let response = self.client.replace(&id, fields).await?;
        Ok(self.record(response))
    }

    /// Partially updates the resource under test (`PATCH`).
    ///
    /// # Errors
    ///
    /// Without a current id, or see [`ResourceClient::patch`].
    pub async fn patch_current<T>(
        &mut self,
        fields: &T,
    ) -> Result<&NormalizedResponse, HarnessError>
    where
        T: Serialize + ?Sized,
    {
        let id = self.current_id()?.to_string();
        let response = self.client.patch(&id, fields).await?;
        Ok(self.record(response))
    }

    /// Deletes a resource; on success it is no longer tracked.
    ///
    /// # Errors
    ///
    /// See [`ResourceClient::delete`].
    pub async fn delete(&mut self, id: &str) -> Result<&NormalizedResponse, HarnessError> {
        let response = self.client.delete(id).await?;
        if response.is_success() {
            self.tracker.untrack(id);
        }
        Ok(self.record(response))
    }

    /// Deletes the resource under test.
    ///
    /// # Errors
    ///
    /// Without a current id, or see [`ResourceClient::delete`].
    pub async fn delete_current(&mut self) -> Result<&NormalizedResponse, HarnessError> {
        let id = self.current_id()?.to_string();
        self.delete(&id).await
    }
}

impl World for ResourceWorld {
    async fn teardown(&mut self) {
        let client = &self.client;
        let report = self
            .tracker
            .cleanup(|id| async move { client.delete(&id).await })
            .await;

        if report.is_clean() {
            info!(deleted = report.deleted.len(), "cleanup done");
        } else {
            warn!(failures = ?report.failures, "cleanup incomplete");
        }
        self.cleanup = Some(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_world() -> ResourceWorld {
        let client = ResourceClient::builder()
            .with_base_url("http://127.0.0.1:9")
            .expect("valid url")
            .with_base_path("/products")
            .expect("valid path")
            .for_products()
            .build()
            .expect("client");
        ResourceWorld::new(client)
    }

    #[test]
    fn test_fresh_world_has_no_state() {
        let world = offline_world();

        assert!(matches!(
            world.last_response(),
            Err(HarnessError::MissingState { what: "response" })
        ));
        assert!(world.current_id().is_err());
        assert!(world.tracker().is_empty());
        assert!(world.cleanup_report().is_none());
    }

    #[tokio::test]
    async fn test_current_operations_require_an_id() {
        let mut world = offline_world();

        let result = world.get_current().await;

        assert!(matches!(
            result,
            Err(HarnessError::MissingState { what: "resource id" })
        ));
    }

    #[tokio::test]
    async fn test_teardown_reports_unreachable_server() {
        let mut world = offline_world();
        world.tracker_mut().track("42");

        world.teardown().await;

        let report = world.cleanup_report().expect("teardown ran");
        assert_eq!(report.failures.len(), 1);
        assert!(world.tracker().is_empty());
    }
}
