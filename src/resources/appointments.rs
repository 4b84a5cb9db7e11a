//! Appointment booking and administration.

use serde::Serialize;

use crate::http::{ApiClient, ApiResult, Transport};
use crate::resources::crud::decode;
use crate::resources::types::{Appointment, AppointmentStatus};

const PATH: &str = "appointments";

#[derive(Serialize)]
struct StatusUpdate {
    status: AppointmentStatus,
}

pub struct Appointments<'a, T> {
    client: &'a ApiClient<T>,
}

impl<'a, T: Transport> Appointments<'a, T> {
    pub fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    /// Book a new appointment. Public endpoint, no credentials required.
    pub async fn book(&self, appointment: &Appointment) -> ApiResult<Appointment> {
        decode(&self.client.post(PATH, appointment).await?)
    }

    pub async fn list(&self) -> ApiResult<Vec<Appointment>> {
        decode(&self.client.get(PATH).await?)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Appointment> {
        decode(&self.client.get(&format!("{PATH}/{id}")).await?)
    }

    pub async fn update_status(&self, id: &str, status: AppointmentStatus) -> ApiResult<Appointment> {
        let path = format!("{PATH}/{id}/status");
        decode(&self.client.put(&path, &StatusUpdate { status }).await?)
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn appointments(&self) -> Appointments<'_, T> {
        Appointments::new(self)
    }
}
