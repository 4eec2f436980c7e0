//! WLAN backend abstraction layer

pub mod simulated;
pub mod wlan_backend;

pub use simulated::SimulatedBackend;
pub use wlan_backend::WlanBackend;
