//! SideView Tab Model
//!
//! The ordered tab strip of a single window: tab records, the single active
//! pointer, and the bounded stack of recently closed tabs.
//! Tabs are only ever mutated by the lifecycle layer in `sideview-core`.

mod error;
mod history;
mod registry;
mod state;
mod tab;

pub use error::TabError;
pub use history::{ClosedTabHistory, ClosedTabRecord, DEFAULT_CLOSED_TAB_CAPACITY};
pub use registry::{TabPatch, TabRegistry};
pub use state::TabState;
pub use tab::{LabelAllocator, Tab, TabLabel};

pub type Result<T> = std::result::Result<T, TabError>;
