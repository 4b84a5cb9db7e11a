//! Typed services for the hospital backend's collections.

pub mod appointments;
pub mod crud;
pub mod notifications;
pub mod types;
pub mod uploads;

pub use appointments::Appointments;
pub use crud::{decode, Collection, Resource};
pub use types::{
    Appointment, AppointmentStatus, Blog, Doctor, Event, PushKeys, PushSubscription,
    Testimonial, UploadedImage,
};
pub use uploads::image_content_type;
