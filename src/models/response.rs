// SPDX-License-Identifier: MIT

//! Uniform response envelope returned by every endpoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response envelope: `{success, message, data}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn ok_empty(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Slice a full result set into one page and report paging totals.
///
/// `page` is 1-based and `limit` is clamped to 1..=100. Returns
/// `(page_items, total, total_pages)`.
pub fn paginate<T: Clone>(items: &[T], page: usize, limit: usize) -> (Vec<T>, usize, usize) {
    let total = items.len();
    let limit = limit.clamp(1, 100);
    let total_pages = total.div_ceil(limit);
    let start = (page.max(1) - 1) * limit;
    let page_items = if start >= total {
        Vec::new()
    } else {
        items[start..(start + limit).min(total)].to_vec()
    };
    (page_items, total, total_pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_basic() {
        let items: Vec<u32> = (1..=25).collect();
        let (page, total, total_pages) = paginate(&items, 2, 10);
        assert_eq!(page, (11..=20).collect::<Vec<u32>>());
        assert_eq!(total, 25);
        assert_eq!(total_pages, 3);
    }

    #[test]
    fn test_paginate_past_end() {
        let items: Vec<u32> = (1..=5).collect();
        let (page, total, total_pages) = paginate(&items, 4, 10);
        assert!(page.is_empty());
        assert_eq!(total, 5);
        assert_eq!(total_pages, 1);
    }

    #[test]
    fn test_paginate_empty() {
        let items: Vec<u32> = Vec::new();
        let (page, total, total_pages) = paginate(&items, 1, 20);
        assert!(page.is_empty());
        assert_eq!(total, 0);
        assert_eq!(total_pages, 0);
    }

    #[test]
    fn test_paginate_clamps_oversized_limit() {
        let items: Vec<u32> = (1..=250).collect();
        let (page, total, total_pages) = paginate(&items, 1, 10_000);
        assert_eq!(page.len(), 100);
        assert_eq!(total, 250);
        assert_eq!(total_pages, 3);
    }

    #[test]
    fn test_envelope_omits_null_data() {
        let json = serde_json::to_string(&ApiResponse::ok_empty("done")).unwrap();
        assert!(!json.contains("data"));
    }
}
