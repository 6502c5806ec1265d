use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::models::recommendation::PackingListPayload;

/// One packing item with its packed/unpacked state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingItemState {
    pub name: String,
    #[serde(default)]
    pub packed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackingChecklistCategory {
    pub name: String,
    #[serde(default)]
    pub items: Vec<PackingItemState>,
}

/// A packing list as the traveler interacts with it: categories of items,
/// each with a packed flag. Built from the model's raw payload with every
/// item unpacked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackingChecklist {
    #[serde(default)]
    pub categories: Vec<PackingChecklistCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<String>,
}

impl PackingChecklist {
    pub fn from_payload(payload: &PackingListPayload) -> Self {
        Self {
            categories: payload
                .categories
                .iter()
                .map(|category| PackingChecklistCategory {
                    name: category.name.clone(),
                    items: category
                        .items
                        .iter()
                        .map(|item| PackingItemState {
                            name: item.clone(),
                            packed: false,
                        })
                        .collect(),
                })
                .collect(),
            tips: payload.tips.clone(),
        }
    }

    pub fn to_payload(&self) -> PackingListPayload {
        PackingListPayload {
            categories: self
                .categories
                .iter()
                .map(|category| crate::models::recommendation::PackingCategoryPayload {
                    name: category.name.clone(),
                    items: category.items.iter().map(|item| item.name.clone()).collect(),
                })
                .collect(),
            tips: self.tips.clone(),
        }
    }

    /// Flips one item's packed state. Returns false when the category/item
    /// pair does not exist.
    pub fn set_packed(&mut self, category: &str, item: &str, packed: bool) -> bool {
        for cat in self.categories.iter_mut() {
            if cat.name == category {
                for entry in cat.items.iter_mut() {
                    if entry.name == item {
                        entry.packed = packed;
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// Durable packing list, keyed by (user_id, destination, start_date).
/// The key deliberately omits travel method, budget and companions: two
/// trips to the same destination on the same start date reuse one list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPackingList {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub destination: String,
    pub start_date: String,
    pub checklist: PackingChecklist,
    pub created_at: Option<bson::DateTime>,
    pub updated_at: Option<bson::DateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recommendation::PackingCategoryPayload;

    fn sample_payload() -> PackingListPayload {
        PackingListPayload {
            categories: vec![PackingCategoryPayload {
                name: "Clothes".to_string(),
                items: vec!["T-shirts".to_string(), "Swimwear".to_string()],
            }],
            tips: Some("Pack light".to_string()),
        }
    }

    #[test]
    fn checklist_starts_unpacked() {
        let checklist = PackingChecklist::from_payload(&sample_payload());
        assert!(checklist.categories[0].items.iter().all(|item| !item.packed));
    }

    #[test]
    fn set_packed_toggles_only_the_named_item() {
        let mut checklist = PackingChecklist::from_payload(&sample_payload());
        assert!(checklist.set_packed("Clothes", "Swimwear", true));
        assert!(!checklist.categories[0].items[0].packed);
        assert!(checklist.categories[0].items[1].packed);
        assert!(!checklist.set_packed("Clothes", "Sunscreen", true));
        assert!(!checklist.set_packed("Toiletries", "Swimwear", true));
    }

    #[test]
    fn payload_round_trip_drops_packed_state() {
        let mut checklist = PackingChecklist::from_payload(&sample_payload());
        checklist.set_packed("Clothes", "T-shirts", true);
        assert_eq!(checklist.to_payload(), sample_payload());
    }
}
