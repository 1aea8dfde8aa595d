//! External collaborators consumed by the core

pub mod geo;
pub mod payment;

pub use geo::{GeoLocationProvider, StaticGeocoder};
pub use payment::{CardRejection, CardValidator, PaymentAuthenticator};
