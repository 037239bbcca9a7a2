//! Session adapters: token persistence, refresh endpoint, navigation and
//! notifications.

pub mod navigation;
pub mod notifier;
pub mod refresher;
pub mod token_store;

pub use navigation::MemoryNavigator;
pub use notifier::TracingNotifier;
pub use refresher::EndpointRefresher;
pub use token_store::{FileTokenStore, MemoryTokenStore, StoredSession};
