//! The scene: an ordered list of items.

use crate::items::{Item, ItemId, ItemTrait};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// An ordered collection of items.
///
/// Insertion order is the paint order within a kind; see
/// [`Scene::render_order`] for the full layering rule. Serializes as a bare
/// JSON array, which is the format of saved and shared payloads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scene {
    items: Vec<Item>,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item on top of its layer.
    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Remove an item, returning it if it was present.
    pub fn remove_item(&mut self, id: &ItemId) -> Option<Item> {
        let index = self.index_of(id)?;
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.index_of(id).is_some()
    }

    fn index_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Items in paint order (back to front).
    ///
    /// Items are grouped by kind layer (tiles and signs, then vehicles, then
    /// text, then arrows), keeping insertion order within a layer. The
    /// selected item, if present, is always painted last.
    pub fn render_order(&self, selection: Option<&ItemId>) -> Vec<&Item> {
        let mut ordered: Vec<&Item> = self.items.iter().collect();
        // Stable sort keeps insertion order inside each layer
        ordered.sort_by_key(|item| item.kind().layer());
        if let Some(id) = selection {
            if let Some(pos) = ordered.iter().position(|item| item.id() == id) {
                let selected = ordered.remove(pos);
                ordered.push(selected);
            }
        }
        ordered
    }

    /// Find the topmost item at a point (in scene coordinates).
    pub fn item_at_point(&self, point: Point, tolerance: f64, selection: Option<&ItemId>) -> Option<&Item> {
        self.render_order(selection)
            .into_iter()
            .rev()
            .find(|item| item.hit_test(point, tolerance))
    }

    /// Check that no two items share an identifier.
    pub fn has_unique_ids(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.items.iter().all(|item| seen.insert(item.id().clone()))
    }

    /// Serialize the item list to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize an item list from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl FromIterator<Item> for Scene {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
