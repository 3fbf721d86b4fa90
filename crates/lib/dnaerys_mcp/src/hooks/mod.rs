// @zen-component: MCP-HookPipeline
//
//! Hook pipeline for MCP tool calls.
//!
//! Hooks run before and after every tool call. They see the call's
//! parameters and its outcome, including the reason when a query was
//! answered with its neutral default, and may rewrite either. This is
//! where failures surface to operators, since tool results never carry
//! them.

pub mod audit;

use std::sync::Arc;

use async_trait::async_trait;
use dnaerys_core::query::Outcome;
use serde::Serialize;

/// Context passed to hooks for each tool call.
#[derive(Debug, Clone)]
pub struct HookContext {
    pub tool_name: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HookContext {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Outcome of a tool call, passed to after_call hooks.
#[derive(Debug, Clone)]
pub enum ToolCallOutcome {
    /// The store answered.
    Success(serde_json::Value),
    /// The neutral default was returned instead.
    Defaulted {
        value: serde_json::Value,
        reason: String,
        /// `true` when the query was voided locally, before any store call.
        input: bool,
    },
}

impl ToolCallOutcome {
    pub fn from_outcome<T: Serialize>(outcome: &Outcome<T>) -> Self {
        let value = serde_json::to_value(outcome.value()).unwrap_or_default();
        match outcome.reason() {
            None => Self::Success(value),
            Some(reason) => Self::Defaulted {
                value,
                reason: reason.to_string(),
                input: reason.is_input(),
            },
        }
    }

    pub fn value(&self) -> &serde_json::Value {
        match self {
            Self::Success(value) | Self::Defaulted { value, .. } => value,
        }
    }

    pub fn into_value(self) -> serde_json::Value {
        match self {
            Self::Success(value) | Self::Defaulted { value, .. } => value,
        }
    }
}

/// Errors that can occur in hooks.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("Call rejected: {0}")]
    Rejected(String),
}

/// Hook trait: implement for custom hook logic.
///
/// Hooks form an ordered pipeline. `before_call` runs in order; `after_call`
/// runs in reverse order (onion model).
#[async_trait]
pub trait ToolHook: Send + Sync {
    /// Called before the tool runs. The tool is built from `params` as
    /// left by the last hook. Return Err to reject the call.
    async fn before_call(
        &self,
        ctx: &HookContext,
        params: &mut serde_json::Value,
    ) -> Result<(), HookError>;

    /// Called after the tool runs. The tool renders the outcome's value
    /// as left by the last hook.
    async fn after_call(
        &self,
        ctx: &HookContext,
        outcome: &mut ToolCallOutcome,
    ) -> Result<(), HookError>;

    fn name(&self) -> &str;
}

/// Ordered pipeline of hooks, applied to every tool call.
pub struct HookPipeline {
    hooks: Vec<Arc<dyn ToolHook>>,
}

impl HookPipeline {
    pub fn new(hooks: Vec<Arc<dyn ToolHook>>) -> Self {
        Self { hooks }
    }

    /// Run all before_call hooks in order. Short-circuits on error.
    pub async fn run_before(
        &self,
        ctx: &HookContext,
        params: &mut serde_json::Value,
    ) -> Result<(), HookError> {
        for hook in &self.hooks {
            hook.before_call(ctx, params).await?;
        }
        Ok(())
    }

    /// Run all after_call hooks in reverse order.
    pub async fn run_after(
        &self,
        ctx: &HookContext,
        outcome: &mut ToolCallOutcome,
    ) -> Result<(), HookError> {
        for hook in self.hooks.iter().rev() {
            hook.after_call(ctx, outcome).await?;
        }
        Ok(())
    }
}

/// Build the default hook pipeline: a single [`audit::AuditHook`].
pub fn default_pipeline() -> HookPipeline {
    let audit: Arc<dyn ToolHook> = Arc::new(audit::AuditHook);
    HookPipeline::new(vec![audit])
}
