//! Generic CRUD over a REST collection.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::http::{ApiClient, ApiResponse, ApiResult, Transport};
use crate::resources::types::{Blog, Doctor, Event, Testimonial};

/// A record type served under a collection path.
pub trait Resource: Serialize + DeserializeOwned + Send + Sync {
    /// Collection path relative to the base URL, e.g. `blogs`.
    const PATH: &'static str;
}

impl Resource for Blog {
    const PATH: &'static str = "blogs";
}

impl Resource for Doctor {
    const PATH: &'static str = "doctors";
}

impl Resource for Event {
    const PATH: &'static str = "events";
}

impl Resource for Testimonial {
    const PATH: &'static str = "testimonials";
}

/// Bodies come either bare or wrapped as `{"success": true, "data": ...}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Wrapped { data: T },
    Bare(T),
}

/// Decode a response body that may or may not use the `data` envelope.
pub fn decode<T: DeserializeOwned>(response: &ApiResponse) -> ApiResult<T> {
    Ok(match response.json::<Payload<T>>()? {
        Payload::Wrapped { data } => data,
        Payload::Bare(value) => value,
    })
}

/// Typed view of one collection.
pub struct Collection<'a, R, T> {
    client: &'a ApiClient<T>,
    _marker: PhantomData<fn() -> R>,
}

impl<'a, R: Resource, T: Transport> Collection<'a, R, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", R::PATH, id)
    }

    pub async fn list(&self) -> ApiResult<Vec<R>> {
        decode(&self.client.get(R::PATH).await?)
    }

    pub async fn get(&self, id: &str) -> ApiResult<R> {
        decode(&self.client.get(&Self::item_path(id)).await?)
    }

    pub async fn create(&self, record: &R) -> ApiResult<R> {
        decode(&self.client.post(R::PATH, record).await?)
    }

    pub async fn update(&self, id: &str, record: &R) -> ApiResult<R> {
        decode(&self.client.put(&Self::item_path(id), record).await?)
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.client.delete(&Self::item_path(id)).await?;
        Ok(())
    }
}

impl<T: Transport> ApiClient<T> {
    /// Typed CRUD access to a collection.
    pub fn resource<R: Resource>(&self) -> Collection<'_, R, T> {
        Collection::new(self)
    }
}
