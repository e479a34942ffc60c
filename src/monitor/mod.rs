pub mod cache;
pub mod names;
pub mod poller;

pub use cache::MonitorCache;
pub use poller::Poller;
