pub mod bus;
pub mod storage;
pub mod store;

pub use bus::{Subscription, WatchlistBus, WatchlistUpdate};
pub use storage::{FileStorage, MemoryStorage, WatchlistStorage};
pub use store::{StatusCounts, WatchlistStore, WATCHLIST_KEY};
