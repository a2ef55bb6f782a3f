//! Learners: pluggable online recommendation models
//!
//! Each learner implements the same `update`/`predict` contract over its
//! own typed state and is addressed through the [`registry::LearnerRegistry`]
//! by a caller-chosen id. Persistence snapshots carry plain data only,
//! tagged by kind; behavior is reconstructed from the tag on load.
//!
//! Kinds:
//! - **Shortcut**: recommends frequently visited names (path-prefix credit)
//! - **AutoRpc**: scores how likely a method is worth auto-invoking
//! - **MethodInput**: suggests previously used values for one argument
//! - **MethodInvocation**: suggests previously used full invocations

pub mod auto_rpc;
pub mod method_value;
pub mod registry;
pub mod shortcut;

pub use auto_rpc::AutoRpcLearner;
pub use method_value::MethodValueLearner;
pub use registry::LearnerRegistry;
pub use shortcut::ShortcutLearner;

use crate::error::{PeriplusError, Result};
use crate::learning::ScoredItem;
use crate::signature::ServiceSignature;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of learner kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LearnerKind {
    Shortcut,
    AutoRpc,
    MethodInput,
    MethodInvocation,
}

impl fmt::Display for LearnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            LearnerKind::Shortcut => "shortcut",
            LearnerKind::AutoRpc => "auto-rpc",
            LearnerKind::MethodInput => "method-input",
            LearnerKind::MethodInvocation => "method-invocation",
        };
        write!(f, "{}", tag)
    }
}

/// Optional per-learner parameter overrides. `None` fields inherit the
/// kind's default (or, on rehydration, the stored value).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnerParams {
    /// Shortcut: how many recommendations to produce
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<isize>,

    /// AutoRpc: perceptron learning rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_rate: Option<f64>,

    /// Method learners: minimum score a candidate needs to be predicted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_threshold: Option<f64>,

    /// Method learners: maximum candidates to predict (-1 = unlimited)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_values: Option<i64>,
}

impl LearnerParams {
    pub fn with_k(mut self, k: isize) -> Self {
        self.k = Some(k);
        self
    }

    pub fn with_learning_rate(mut self, rate: f64) -> Self {
        self.learning_rate = Some(rate);
        self
    }

    pub fn with_min_threshold(mut self, threshold: f64) -> Self {
        self.min_threshold = Some(threshold);
        self
    }

    pub fn with_max_values(mut self, max: i64) -> Self {
        self.max_values = Some(max);
        self
    }
}

/// A usage event forwarded to a learner's `update`
#[derive(Debug, Clone)]
pub enum LearnerInput {
    /// A name was visited (shortcut learner)
    Visit { name: String },

    /// An RPC finished with a reward signal (auto-rpc learner)
    RpcOutcome {
        object_name: String,
        method_name: String,
        signature: ServiceSignature,
        reward: f64,
    },

    /// A value was used for a method call (method learners). `arg_name`
    /// is set for per-argument learning and absent for whole-invocation
    /// learning. `reset` removes the candidate instead of reinforcing it.
    MethodValue {
        signature: ServiceSignature,
        method_name: String,
        arg_name: Option<String>,
        value: String,
        reset: bool,
    },
}

/// A read-only question for a learner's `predict`
#[derive(Debug, Clone)]
pub enum LearnerQuery {
    /// Shortcut recommendations, optionally filtered to a name prefix
    Shortcuts { prefix: Option<String> },

    /// Predicted reward for invoking a method (auto-rpc learner)
    RpcScore {
        object_name: String,
        method_name: String,
        signature: ServiceSignature,
    },

    /// Candidate values for a method (method learners)
    MethodValues {
        signature: ServiceSignature,
        method_name: String,
        arg_name: Option<String>,
    },
}

/// What a learner predicted
#[derive(Debug, Clone, PartialEq)]
pub enum Prediction {
    Shortcuts(Vec<ScoredItem<String>>),
    Score(f64),
    Values(Vec<String>),
}

impl Prediction {
    pub fn shortcuts(self) -> Option<Vec<ScoredItem<String>>> {
        match self {
            Prediction::Shortcuts(items) => Some(items),
            _ => None,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            Prediction::Score(score) => Some(*score),
            _ => None,
        }
    }

    pub fn values(self) -> Option<Vec<String>> {
        match self {
            Prediction::Values(values) => Some(values),
            _ => None,
        }
    }
}

/// A learner: kind tag plus typed state, one `update`/`predict` surface
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Learner {
    Shortcut(ShortcutLearner),
    AutoRpc(AutoRpcLearner),
    MethodInput(MethodValueLearner),
    MethodInvocation(MethodValueLearner),
}

impl Learner {
    /// Construct a fresh learner of `kind` with `params` applied over the
    /// kind's defaults.
    pub fn create(kind: LearnerKind, params: &LearnerParams) -> Self {
        match kind {
            LearnerKind::Shortcut => Learner::Shortcut(ShortcutLearner::new(params)),
            LearnerKind::AutoRpc => Learner::AutoRpc(AutoRpcLearner::new(params)),
            LearnerKind::MethodInput => Learner::MethodInput(MethodValueLearner::new(
                method_value::INPUT_MIN_THRESHOLD,
                method_value::INPUT_MAX_VALUES,
                params,
            )),
            LearnerKind::MethodInvocation => Learner::MethodInvocation(MethodValueLearner::new(
                method_value::INVOCATION_MIN_THRESHOLD,
                method_value::INVOCATION_MAX_VALUES,
                params,
            )),
        }
    }

    pub fn kind(&self) -> LearnerKind {
        match self {
            Learner::Shortcut(_) => LearnerKind::Shortcut,
            Learner::AutoRpc(_) => LearnerKind::AutoRpc,
            Learner::MethodInput(_) => LearnerKind::MethodInput,
            Learner::MethodInvocation(_) => LearnerKind::MethodInvocation,
        }
    }

    /// Apply caller params over the current (stored or default) values.
    pub fn apply_params(&mut self, params: &LearnerParams) {
        match self {
            Learner::Shortcut(learner) => learner.apply_params(params),
            Learner::AutoRpc(learner) => learner.apply_params(params),
            Learner::MethodInput(learner) | Learner::MethodInvocation(learner) => {
                learner.apply_params(params)
            }
        }
    }

    /// Feed one usage event into the learner. The input variant must match
    /// the learner kind.
    pub fn update(&mut self, input: &LearnerInput) -> Result<()> {
        match (self, input) {
            (Learner::Shortcut(learner), LearnerInput::Visit { name }) => {
                learner.record_visit(name);
                Ok(())
            }
            (
                Learner::AutoRpc(learner),
                LearnerInput::RpcOutcome {
                    object_name,
                    method_name,
                    signature,
                    reward,
                },
            ) => {
                learner.record_outcome(object_name, method_name, signature, *reward);
                Ok(())
            }
            (
                Learner::MethodInput(learner) | Learner::MethodInvocation(learner),
                LearnerInput::MethodValue {
                    signature,
                    method_name,
                    arg_name,
                    value,
                    reset,
                },
            ) => {
                let key = method_value::method_key(signature, method_name, arg_name.as_deref());
                learner.reinforce(&key, value, *reset);
                Ok(())
            }
            (learner, _) => Err(PeriplusError::LearnerInput(format!(
                "input does not match {} learner",
                learner.kind()
            ))),
        }
    }

    /// Answer a read-only query. Pure: only `update` mutates state.
    pub fn predict(&self, query: &LearnerQuery) -> Result<Prediction> {
        match (self, query) {
            (Learner::Shortcut(learner), LearnerQuery::Shortcuts { prefix }) => Ok(
                Prediction::Shortcuts(learner.predict(prefix.as_deref())),
            ),
            (
                Learner::AutoRpc(learner),
                LearnerQuery::RpcScore {
                    object_name,
                    method_name,
                    signature,
                },
            ) => Ok(Prediction::Score(learner.predict(
                object_name,
                method_name,
                signature,
            ))),
            (
                Learner::MethodInput(learner) | Learner::MethodInvocation(learner),
                LearnerQuery::MethodValues {
                    signature,
                    method_name,
                    arg_name,
                },
            ) => {
                let key = method_value::method_key(signature, method_name, arg_name.as_deref());
                Ok(Prediction::Values(learner.predict(&key)))
            }
            (learner, _) => Err(PeriplusError::LearnerInput(format!(
                "query does not match {} learner",
                learner.kind()
            ))),
        }
    }
}

/// Persisted form of a learner: plain data plus the kind tag and a
/// timestamp. Deserializing reconstructs the right variant from the tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerSnapshot {
    #[serde(flatten)]
    pub learner: Learner,
    pub updated_at: DateTime<Utc>,
}

impl LearnerSnapshot {
    pub fn of(learner: &Learner) -> Self {
        Self {
            learner: learner.clone(),
            updated_at: Utc::now(),
        }
    }
}
