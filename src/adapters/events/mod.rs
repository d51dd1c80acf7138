//! Event bus adapters.
//!
//! - `InMemoryEventBus` - In-process capture for tests and local runs
//! - `RedisEventPublisher` - Redis pub/sub for deployed environments

mod in_memory;
mod redis;

pub use self::redis::{channel_for, RedisEventPublisher};
pub use in_memory::InMemoryEventBus;
