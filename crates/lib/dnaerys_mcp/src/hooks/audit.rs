// @zen-component: MCP-AuditHook
//
//! Audit hook: one structured log event per tool call.
//!
//! Tool results never carry failures, so this is the operator's view of
//! defaulted answers. Store failures are already logged at error level
//! where they are settled, so only input failures carry their reason here.

use async_trait::async_trait;
use dnaerys_core::query::EMPTY_SENTINEL;
use tracing::info;

use super::{HookContext, HookError, ToolCallOutcome, ToolHook};

/// Number of result items in a tool value: array length, otherwise one.
/// A lone empty sentinel counts as no items.
pub fn item_count(value: &serde_json::Value) -> usize {
    match value {
        serde_json::Value::Array(items) if is_sentinel(items) => 0,
        serde_json::Value::Array(items) => items.len(),
        serde_json::Value::Null => 0,
        _ => 1,
    }
}

fn is_sentinel(items: &[serde_json::Value]) -> bool {
    matches!(items, [serde_json::Value::String(s)] if s == EMPTY_SENTINEL)
}

/// Reason worth logging for an outcome. Store failures return `None`.
pub fn logged_reason(outcome: &ToolCallOutcome) -> Option<&str> {
    match outcome {
        ToolCallOutcome::Defaulted {
            reason,
            input: true,
            ..
        } => Some(reason),
        _ => None,
    }
}

/// Audit hook: logs every tool call with its outcome.
pub struct AuditHook;

#[async_trait]
impl ToolHook for AuditHook {
    async fn before_call(
        &self,
        _ctx: &HookContext,
        _params: &mut serde_json::Value,
    ) -> Result<(), HookError> {
        Ok(())
    }

    async fn after_call(
        &self,
        ctx: &HookContext,
        outcome: &mut ToolCallOutcome,
    ) -> Result<(), HookError> {
        let items = item_count(outcome.value());
        let elapsed_ms = (chrono::Utc::now() - ctx.timestamp).num_milliseconds();

        match (&*outcome, logged_reason(outcome)) {
            (ToolCallOutcome::Success(_), _) => {
                info!(tool = %ctx.tool_name, success = true, items, elapsed_ms, "tool call");
            }
            (_, Some(reason)) => {
                info!(tool = %ctx.tool_name, success = false, items, elapsed_ms, reason, "tool call defaulted");
            }
            (_, None) => {
                info!(tool = %ctx.tool_name, success = false, store_failure = true, items, elapsed_ms, "tool call defaulted");
            }
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "AuditHook"
    }
}
