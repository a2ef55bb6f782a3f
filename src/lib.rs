//! Periplus - Namespace Browser Core
//!
//! The engine behind a browser for distributed namespaces that provides:
//! - Streaming glob aggregation into live observable result collections
//! - LRU caching of finished glob results and service signatures
//! - Request-identity tracking to discard stale in-flight responses
//! - On-device learning for shortcut, argument and invocation suggestions
//! - Durable learner state over a pluggable key-value store
//!
//! # Architecture
//!
//! The crate is organized into several layers:
//! - **Learning**: perceptron, ranking and path-feature primitives
//! - **Learners**: shortcut/auto-RPC/method-value models and their registry
//! - **Namespace**: glob aggregation, item classification, caches, slots
//! - **Transport**: traits the naming/RPC runtime is consumed through
//!
//! # Example
//!
//! ```ignore
//! use periplus::{NamespaceBrowser, RecommendationService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BrowserConfig::from_file("periplus.toml")?;
//!     let browser = NamespaceBrowser::new(transport, &config);
//!
//!     // Browse: the list fills as the remote stream delivers results
//!     let children = browser.get_children("house").await?;
//!     let mut events = children.subscribe();
//!
//!     // Learn from the visit and ask for shortcuts
//!     recommendations.record_visit("house").await?;
//!     let shortcuts = recommendations.shortcuts().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod collection;
pub mod config;
pub mod error;
pub mod learners;
pub mod learning;
pub mod naming;
pub mod namespace;
pub mod recommendations;
pub mod signature;
pub mod store;
pub mod transport;

// Re-export commonly used types
pub use collection::{ListEvent, ListState, ObservableList};
pub use config::BrowserConfig;
pub use error::{PeriplusError, Result};
pub use learners::{Learner, LearnerKind, LearnerRegistry};
pub use namespace::{ItemType, NamespaceBrowser, NamespaceItem, RequestSlot, ViewSlot};
pub use recommendations::RecommendationService;
pub use signature::ServiceSignature;
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use transport::{NamingTransport, ServiceHandle};
