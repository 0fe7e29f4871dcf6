//! reqwest-backed adapters for the remote collaborators.

mod geocoder;
mod subscription_api;

pub use geocoder::BigDataCloudGeocoder;
pub use subscription_api::HttpSubscriptionApi;
