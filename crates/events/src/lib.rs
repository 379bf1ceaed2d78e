//! Catalog events and the pub/sub plumbing that delivers them.

pub mod bus;
pub mod event;
pub mod in_memory_bus;
pub mod stock;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
pub use stock::StockStatusChanged;
