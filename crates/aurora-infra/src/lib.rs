//! Infrastructure adapters for the Aurora Alert client: the file-backed
//! session store, the REST and geocoding clients, and the system clock.

pub mod http;
pub mod storage;
pub mod time;

pub use http::{BigDataCloudGeocoder, HttpSubscriptionApi};
pub use storage::FileKeyValueStore;
pub use time::SystemClock;
