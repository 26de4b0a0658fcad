pub mod app_config;
pub mod config;
pub mod flyers;
pub mod record;
pub mod shopping_list;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use flyers::{FlyerCollection, FlyerStoreError, FLYERS_FILE};
pub use record::{ProductRecord, StoreKey};
pub use shopping_list::{ShoppingList, ShoppingListEntry};
