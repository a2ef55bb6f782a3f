//! Shortcut recommendations over the learner registry
//!
//! Thin service around the shared shortcut learner: browsing records a
//! visit, the UI asks for the current best shortcuts, either as scored
//! names or resolved to live namespace items. One instance owns the
//! well-known learner id; constructing a second against the same
//! registry fails, which keeps "one shortcut model per application"
//! explicit instead of hidden in a global.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::collection::ObservableList;
use crate::error::Result;
use crate::learners::{LearnerInput, LearnerKind, LearnerParams, LearnerQuery, LearnerRegistry};
use crate::learning::ScoredItem;
use crate::namespace::{NamespaceBrowser, NamespaceItem};
use crate::naming;

/// Registry id of the application-wide shortcut learner.
pub const SHORTCUT_LEARNER_ID: &str = "learner-shortcut";

/// How many shortcuts a prediction returns at most.
pub const MAX_RECOMMENDATIONS: isize = 10;

pub struct RecommendationService {
    registry: Arc<LearnerRegistry>,
    browser: NamespaceBrowser,
}

impl RecommendationService {
    /// Register (or rehydrate) the shortcut learner and wrap it.
    pub async fn new(registry: Arc<LearnerRegistry>, browser: NamespaceBrowser) -> Result<Self> {
        registry
            .load_or_create(
                SHORTCUT_LEARNER_ID,
                LearnerKind::Shortcut,
                LearnerParams::default().with_k(MAX_RECOMMENDATIONS),
            )
            .await?;
        Ok(Self { registry, browser })
    }

    /// Record that `name` was visited.
    pub async fn record_visit(&self, name: &str) -> Result<()> {
        let name = naming::clean(name);
        debug!(name = %name, "recording visit");
        self.registry
            .update(SHORTCUT_LEARNER_ID, LearnerInput::Visit { name })
            .await
    }

    /// The current best shortcuts as scored names, most recommendable
    /// first.
    pub async fn shortcuts(&self) -> Result<Vec<ScoredItem<String>>> {
        let prediction = self
            .registry
            .predict(SHORTCUT_LEARNER_ID, LearnerQuery::Shortcuts { prefix: None })
            .await?;
        Ok(prediction.shortcuts().unwrap_or_default())
    }

    /// Best shortcuts under `prefix` only.
    pub async fn get_for_prefix(&self, prefix: &str) -> Result<Vec<ScoredItem<String>>> {
        let prediction = self
            .registry
            .predict(
                SHORTCUT_LEARNER_ID,
                LearnerQuery::Shortcuts {
                    prefix: Some(naming::clean(prefix)),
                },
            )
            .await?;
        Ok(prediction.shortcuts().unwrap_or_default())
    }

    /// Current recommendations resolved to namespace items, best first.
    /// Returns as soon as the list exists; items arrive as each name
    /// resolves. A shortcut that no longer resolves is logged and
    /// skipped, and the list still completes for the rest.
    pub async fn get_all(&self) -> Result<Arc<ObservableList<NamespaceItem>>> {
        let picks = self.shortcuts().await?;
        let list = Arc::new(ObservableList::default());

        let browser = self.browser.clone();
        let resolved = Arc::clone(&list);
        tokio::spawn(async move {
            for pick in picks {
                match browser.get_item(&pick.item).await {
                    Ok(item) => {
                        resolved.push(item);
                    }
                    Err(err) => {
                        warn!(name = %pick.item, error = %err, "dropping unresolvable shortcut");
                    }
                }
            }
            resolved.complete();
        });

        Ok(list)
    }
}
