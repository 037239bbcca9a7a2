//! API data transfer types
//!
//! Request payloads and response models for the backend's REST resources.
//! Field names follow the backend's camelCase JSON.

pub mod audit;
pub mod auth;
pub mod document;
pub mod product;
pub mod rule;

use serde::{Deserialize, Serialize};

pub use audit::{AuditFinding, AuditRequest, AuditStatus, AuditTask};
pub use auth::{
    ChangePasswordRequest, LoginData, LoginRequest, RefreshData, RefreshRequest, UserInfo,
};
pub use document::{Document, DocumentQuery, ParseStatus};
pub use product::{Product, ProductPayload, ProductQuery, ProductStatus};
pub use rule::{Rule, RulePayload, RuleQuery, RuleSeverity};

/// One page of a paged listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
}

/// Turn a query struct into `(key, value)` pairs, dropping `None` fields.
///
/// Query structs serialize to flat JSON objects; nested values are rendered
/// with their JSON text.
pub fn query_pairs<Q: Serialize>(query: &Q) -> Vec<(String, String)> {
    let Ok(serde_json::Value::Object(map)) = serde_json::to_value(query) else {
        return Vec::new();
    };

    map.into_iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_skip_missing_fields() {
        let query = ProductQuery { page: Some(2), keyword: Some("寿险".into()), ..Default::default() };
        let mut pairs = query_pairs(&query);
        pairs.sort();
        assert_eq!(
            pairs,
            vec![("keyword".to_string(), "寿险".to_string()), ("page".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn page_result_tolerates_missing_fields() {
        let page: PageResult<Product> = serde_json::from_str(r#"{"total":0}"#).unwrap();
        assert!(page.list.is_empty());
        assert_eq!(page.total, 0);
    }
}
