//! Produce category models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A grouping of produce types (Fruit, Greens, Herbs, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProduceCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Explicit ordering used instead of alphabetical sort
    #[serde(default, alias = "display_order")]
    pub display_order: i32,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(alias = "updated_at")]
    pub updated_at: DateTime<Utc>,
}

/// Sort categories by display order, then by name
pub fn sort_categories(categories: &mut [ProduceCategory]) {
    categories.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, order: i32) -> ProduceCategory {
        ProduceCategory {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            display_order: order,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sort_by_display_order_not_name() {
        let mut categories = vec![
            category("Vegetables", 4),
            category("Fruit", 1),
            category("Herbs", 3),
            category("Greens", 2),
        ];
        sort_categories(&mut categories);
        let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Fruit", "Greens", "Herbs", "Vegetables"]);
    }

    #[test]
    fn test_sort_ties_fall_back_to_name() {
        let mut categories = vec![category("Zinnias", 0), category("Asters", 0)];
        sort_categories(&mut categories);
        assert_eq!(categories[0].name, "Asters");
    }

    #[test]
    fn test_accepts_snake_case_fields() {
        let json = r#"{
            "id": "6f9619ff-8b86-d011-b42d-00cf4fc964ff",
            "name": "Herbs",
            "description": null,
            "display_order": 3,
            "created_at": "2024-03-01T00:00:00Z",
            "updated_at": "2024-03-01T00:00:00Z"
        }"#;
        let parsed: ProduceCategory = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.display_order, 3);
    }
}
