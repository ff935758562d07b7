//! HTTP request handlers, one module per resource.

pub mod bookings;
pub mod children;
pub mod events;
pub mod favorites;
pub mod health;

pub use health::health_check;
