//! Local metadata overrides for built-in catalog furniture.
//!
//! Overrides rename, resize, recategorize, retag or hide catalog entries
//! without touching the bundled data. The whole map lives as one JSON object
//! under [`FURNITURE_OVERRIDES_KEY`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::FURNITURE_OVERRIDES_KEY;
use crate::placement::Footprint;
use crate::storage::KeyValueStorage;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FurnitureCategory {
    #[default]
    Living,
    Bedroom,
    Kitchen,
    Bathroom,
    Office,
    Outdoor,
    Decorative,
    Storage,
}

/// A built-in catalog entry, reduced to the fields overrides touch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_ko: String,
    #[serde(default)]
    pub category: FurnitureCategory,
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<String>,
    pub footprint: Footprint,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One override entry. Also used as a partial patch for [`OverrideRegistry::set`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurnitureOverride {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footprint: Option<Footprint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<FurnitureCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl FurnitureOverride {
    /// True when no field would change anything.
    pub fn is_empty(&self) -> bool {
        self.name.as_deref().map_or(true, str::is_empty)
            && self.footprint.is_none()
            && !self.hidden.unwrap_or(false)
            && self.category.is_none()
            && self.tags.as_ref().map_or(true, Vec::is_empty)
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.unwrap_or(false)
    }

    /// Present fields of `patch` replace the ones in `self`.
    fn merge(&mut self, patch: FurnitureOverride) {
        if patch.name.is_some() {
            self.name = patch.name;
        }
        if patch.footprint.is_some() {
            self.footprint = patch.footprint;
        }
        if patch.hidden.is_some() {
            self.hidden = patch.hidden;
        }
        if patch.category.is_some() {
            self.category = patch.category;
        }
        if patch.tags.is_some() {
            self.tags = patch.tags;
        }
    }

    fn apply(&self, item: &mut CatalogItem) {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            item.name = name.to_owned();
            item.name_ko = name.to_owned();
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(tags) = &self.tags {
            item.tags = tags.clone();
        }
        if let Some(footprint) = self.footprint {
            item.footprint = footprint;
        }
    }
}

pub type OverrideMap = BTreeMap<String, FurnitureOverride>;

/// Read-modify-write access to the override map in a [`KeyValueStorage`].
///
/// Every call reloads the map; nothing is cached between calls. Storage
/// failures never surface: reads fall back to an empty map and writes are
/// dropped with a warning.
pub struct OverrideRegistry<S> {
    storage: S,
}

impl<S: KeyValueStorage> OverrideRegistry<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn load(&self) -> OverrideMap {
        let raw = match self.storage.get_item(FURNITURE_OVERRIDES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return OverrideMap::new(),
            Err(e) => {
                log::warn!("[overrides] load skipped: {}", e);
                return OverrideMap::new();
            }
        };
        let entries = match serde_json::from_str::<BTreeMap<String, serde_json::Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("[overrides] ignoring malformed data: {}", e);
                return OverrideMap::new();
            }
        };
        entries
            .into_iter()
            .filter_map(|(id, value)| match serde_json::from_value::<FurnitureOverride>(value) {
                Ok(entry) => Some((id, entry)),
                Err(e) => {
                    log::warn!("[overrides] dropping malformed entry {}: {}", id, e);
                    None
                }
            })
            .collect()
    }

    pub fn save(&self, map: &OverrideMap) {
        let json = match serde_json::to_string(map) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("[overrides] encode failed: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set_item(FURNITURE_OVERRIDES_KEY, &json) {
            log::warn!("[overrides] save dropped: {}", e);
        }
    }

    /// Merges `patch` into the entry for `id`, dropping the entry when it ends
    /// up empty.
    pub fn set(&self, id: &str, patch: FurnitureOverride) {
        let mut map = self.load();
        let mut entry = map.remove(id).unwrap_or_default();
        entry.merge(patch);
        entry.id = id.to_owned();
        if entry.is_empty() {
            log::debug!("[overrides] {} cleared (empty)", id);
        } else {
            log::debug!("[overrides] {} updated", id);
            map.insert(id.to_owned(), entry);
        }
        self.save(&map);
    }

    pub fn clear(&self, id: &str) {
        let mut map = self.load();
        map.remove(id);
        self.save(&map);
    }

    pub fn get(&self, id: &str) -> Option<FurnitureOverride> {
        self.load().remove(id)
    }

    pub fn is_overridden(&self, id: &str) -> bool {
        self.load().contains_key(id)
    }

    /// Catalog items with overrides applied and hidden items removed.
    pub fn apply_to_items(&self, items: &[CatalogItem]) -> Vec<CatalogItem> {
        let map = self.load();
        items
            .iter()
            .filter_map(|item| match map.get(&item.id) {
                None => Some(item.clone()),
                Some(ov) if ov.is_hidden() => None,
                Some(ov) => {
                    let mut out = item.clone();
                    ov.apply(&mut out);
                    Some(out)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn catalog() -> Vec<CatalogItem> {
        ["sofa", "lamp", "desk"]
            .iter()
            .map(|id| CatalogItem {
                id: id.to_string(),
                name: id.to_uppercase(),
                name_ko: String::new(),
                category: FurnitureCategory::Living,
                model_path: Some(format!("/models/{id}.glb")),
                thumbnail_path: None,
                footprint: Footprint::new(1.0, 1.0, 1.0),
                tags: vec!["base".into()],
            })
            .collect()
    }

    fn registry() -> OverrideRegistry<MemoryStorage> {
        OverrideRegistry::new(MemoryStorage::new())
    }

    #[test]
    fn rename_and_resize_apply() {
        let reg = registry();
        reg.set(
            "sofa",
            FurnitureOverride {
                name: Some("Couch".into()),
                footprint: Some(Footprint::new(2.0, 0.9, 0.8)),
                ..Default::default()
            },
        );
        let out = reg.apply_to_items(&catalog());
        assert_eq!(out[0].name, "Couch");
        assert_eq!(out[0].name_ko, "Couch");
        assert_eq!(out[0].footprint, Footprint::new(2.0, 0.9, 0.8));
        assert_eq!(out[1].name, "LAMP");
    }

    #[test]
    fn hidden_items_are_filtered_in_order() {
        let reg = registry();
        reg.set(
            "lamp",
            FurnitureOverride {
                hidden: Some(true),
                ..Default::default()
            },
        );
        let ids: Vec<_> = reg
            .apply_to_items(&catalog())
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec!["sofa", "desk"]);
    }

    #[test]
    fn patches_merge_and_force_id() {
        let reg = registry();
        reg.set(
            "desk",
            FurnitureOverride {
                id: "bogus".into(),
                category: Some(FurnitureCategory::Office),
                ..Default::default()
            },
        );
        reg.set(
            "desk",
            FurnitureOverride {
                tags: Some(vec!["work".into()]),
                ..Default::default()
            },
        );
        let ov = reg.get("desk").unwrap();
        assert_eq!(ov.id, "desk");
        assert_eq!(ov.category, Some(FurnitureCategory::Office));
        assert_eq!(ov.tags, Some(vec!["work".to_string()]));
        let out = reg.apply_to_items(&catalog());
        assert_eq!(out[2].category, FurnitureCategory::Office);
        assert_eq!(out[2].tags, vec!["work".to_string()]);
    }

    #[test]
    fn emptied_entry_is_removed() {
        let reg = registry();
        reg.set(
            "sofa",
            FurnitureOverride {
                hidden: Some(true),
                ..Default::default()
            },
        );
        assert!(reg.is_overridden("sofa"));
        reg.set(
            "sofa",
            FurnitureOverride {
                hidden: Some(false),
                ..Default::default()
            },
        );
        assert!(!reg.is_overridden("sofa"));
        assert!(reg.load().is_empty());
    }

    #[test]
    fn clear_removes_entry() {
        let reg = registry();
        reg.set(
            "sofa",
            FurnitureOverride {
                name: Some("X".into()),
                ..Default::default()
            },
        );
        reg.clear("sofa");
        assert_eq!(reg.get("sofa"), None);
    }

    #[test]
    fn malformed_data_reads_as_empty() {
        let storage = MemoryStorage::new();
        storage.set_item(FURNITURE_OVERRIDES_KEY, "[1, 2").unwrap();
        let reg = OverrideRegistry::new(storage);
        assert!(reg.load().is_empty());
        assert_eq!(reg.apply_to_items(&catalog()), catalog());
    }

    #[test]
    fn malformed_entry_does_not_discard_the_rest() {
        let reg = registry();
        reg.storage()
            .set_item(
                FURNITURE_OVERRIDES_KEY,
                r#"{"sofa":{"id":"sofa","name":"Couch"},"bed":{"id":"bed","footprint":{"width":1}}}"#,
            )
            .unwrap();
        let map = reg.load();
        assert_eq!(map.len(), 1);
        assert_eq!(map["sofa"].name.as_deref(), Some("Couch"));
        assert!(!reg.is_overridden("bed"));
    }

    #[test]
    fn unavailable_storage_is_a_no_op() {
        let reg = OverrideRegistry::new(MemoryStorage::unavailable());
        reg.set(
            "sofa",
            FurnitureOverride {
                name: Some("X".into()),
                ..Default::default()
            },
        );
        assert!(reg.load().is_empty());
        assert_eq!(reg.apply_to_items(&catalog()), catalog());
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let reg = registry();
        reg.set(
            "ghost",
            FurnitureOverride {
                hidden: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(reg.apply_to_items(&catalog()).len(), 3);
    }

    #[test]
    fn stored_json_uses_camel_case_keys() {
        let reg = registry();
        reg.set(
            "sofa",
            FurnitureOverride {
                category: Some(FurnitureCategory::Bedroom),
                ..Default::default()
            },
        );
        let raw = reg.storage().get_item(FURNITURE_OVERRIDES_KEY).unwrap().unwrap();
        assert_eq!(raw, r#"{"sofa":{"id":"sofa","category":"bedroom"}}"#);
    }
}
