//! Tool parameter types and result rendering.
//!
//! Counts render as one text item, lists as one text item per element,
//! kinship as a single (possibly empty) text item, and dataset info as
//! pretty JSON.

pub mod params;

use rmcp::model::{CallToolResult, Content, ErrorCode, ErrorData};
use serde::Serialize;

pub fn count_result(count: i64) -> Result<CallToolResult, ErrorData> {
    Ok(CallToolResult::success(vec![Content::text(count.to_string())]))
}

pub fn list_result(items: Vec<String>) -> Result<CallToolResult, ErrorData> {
    Ok(CallToolResult::success(
        items.into_iter().map(Content::text).collect(),
    ))
}

pub fn text_result(text: String) -> Result<CallToolResult, ErrorData> {
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Serialize a value to a pretty JSON CallToolResult.
pub fn json_result<T: Serialize>(value: T) -> Result<CallToolResult, ErrorData> {
    let json = serde_json::to_string_pretty(&value)
        .map_err(|e| ErrorData::new(ErrorCode::INTERNAL_ERROR, e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod tests;
