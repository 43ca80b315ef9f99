//! Collection (bookmark folder) types

use serde::{Deserialize, Serialize};

/// Collection summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub paper_count: u64,
}

/// Paper stored in a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionPaperInfo {
    pub arxiv_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub published: String,
    #[serde(default)]
    pub updated: Option<String>,
    pub pdf_url: String,
    pub categories: Vec<String>,
    pub entry_id: String,
    pub added_at: String,
}

/// Collection with its papers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDetail {
    #[serde(flatten)]
    pub info: CollectionInfo,
    #[serde(default)]
    pub papers: Vec<CollectionPaperInfo>,
}

/// Body of `POST /collections`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `PUT /collections/{id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_flattens_info() {
        let detail: CollectionDetail = serde_json::from_str(
            r#"{
                "id": 1, "name": "Reading", "description": null,
                "created_at": "c", "updated_at": "u", "paper_count": 0, "papers": []
            }"#,
        )
        .unwrap();
        assert_eq!(detail.info.name, "Reading");
        assert!(detail.papers.is_empty());
    }

    #[test]
    fn test_update_omits_unset_fields() {
        let body = serde_json::to_value(CollectionUpdate {
            name: Some("Renamed".into()),
            description: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"name": "Renamed"}));
    }
}
