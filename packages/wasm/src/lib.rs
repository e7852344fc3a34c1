//! Family Forest - WASM Module
//!
//! Turns a flat list of people and parent → child relationships into a
//! drawable family forest: boxes, connector curves and canvas size. It is
//! compiled to WebAssembly and exposes a JavaScript-friendly API via
//! wasm-bindgen.
//!
//! # Architecture
//!
//! - `family`: people, relationships and the editable `FamilyGraph` (petgraph StableGraph)
//! - `layout`: forest construction and the pedigree layout
//! - `spatial`: R-tree spatial indexing for O(log n) hit testing

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod family;
pub mod layout;
pub mod spatial;

use family::{FamilyError, FamilyGraph, FamilySnapshot, PersonDraft, PersonId, RelationshipId};
use layout::{compute_forest_layout, ForestLayout, PedigreeLayoutConfig};
use spatial::SpatialIndex;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(target_arch = "wasm32")]
    web_sys::console::debug_1(&JsValue::from_str(concat!(
        "family-forest-wasm ",
        env!("CARGO_PKG_VERSION")
    )));
}

/// Lay out a `{people, relationships}` snapshot in one call.
///
/// `config` may be `undefined`, or a partial `PedigreeLayoutConfig` in
/// camelCase; missing fields take their defaults.
#[wasm_bindgen(js_name = layoutFamilyTree)]
pub fn layout_family_tree(snapshot: JsValue, config: JsValue) -> Result<JsValue, JsValue> {
    let snapshot: FamilySnapshot = serde_wasm_bindgen::from_value(snapshot)?;
    let config = config_from_js(config)?;
    let layout = compute_forest_layout(&snapshot, &config);
    Ok(serde_wasm_bindgen::to_value(&layout)?)
}

fn config_from_js(config: JsValue) -> Result<PedigreeLayoutConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(PedigreeLayoutConfig::default());
    }
    Ok(serde_wasm_bindgen::from_value(config)?)
}

fn js_error(err: FamilyError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Editable family data plus its most recent layout.
///
/// Edits mark the layout stale; it is recomputed on the next call that
/// needs it.
#[wasm_bindgen]
pub struct FamilyForestWasm {
    graph: FamilyGraph,
    config: PedigreeLayoutConfig,
    layout: ForestLayout,
    spatial: SpatialIndex,
    dirty: bool,
}

#[wasm_bindgen]
impl FamilyForestWasm {
    /// Create an empty family with the default layout configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::from_parts(FamilyGraph::new(), PedigreeLayoutConfig::default())
    }

    /// Create an empty family with a (possibly partial) layout configuration.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<FamilyForestWasm, JsValue> {
        Ok(Self::from_parts(FamilyGraph::new(), config_from_js(config)?))
    }

    // =========================================================================
    // People
    // =========================================================================

    /// Add a person from a `{firstName, lastName?, birthDate?, ...}` draft.
    ///
    /// Returns the new person's id.
    #[wasm_bindgen(js_name = addPerson)]
    pub fn add_person(&mut self, draft: JsValue) -> Result<String, JsValue> {
        let draft: PersonDraft = serde_wasm_bindgen::from_value(draft)?;
        let id = self.graph.insert_person(draft).map_err(js_error)?;
        self.dirty = true;
        Ok(id.to_string())
    }

    /// Replace a person's details. Returns the updated person.
    #[wasm_bindgen(js_name = updatePerson)]
    pub fn update_person(&mut self, id: &str, draft: JsValue) -> Result<JsValue, JsValue> {
        let draft: PersonDraft = serde_wasm_bindgen::from_value(draft)?;
        let person = self
            .graph
            .update_person(&PersonId::from(id), draft)
            .map_err(js_error)?;
        let value = serde_wasm_bindgen::to_value(person)?;
        self.dirty = true;
        Ok(value)
    }

    /// Remove a person and every relationship that names them.
    #[wasm_bindgen(js_name = removePerson)]
    pub fn remove_person(&mut self, id: &str) -> Result<JsValue, JsValue> {
        let person = self
            .graph
            .remove_person(&PersonId::from(id))
            .map_err(js_error)?;
        self.dirty = true;
        Ok(serde_wasm_bindgen::to_value(&person)?)
    }

    #[wasm_bindgen(js_name = personCount)]
    pub fn person_count(&self) -> u32 {
        self.graph.person_count()
    }

    // =========================================================================
    // Relationships
    // =========================================================================

    /// Link `parent` to `child`. Returns the relationship id.
    #[wasm_bindgen(js_name = addRelationship)]
    pub fn add_relationship(&mut self, parent: &str, child: &str) -> Result<String, JsValue> {
        let id = self
            .graph
            .add_relationship(&PersonId::from(parent), &PersonId::from(child))
            .map_err(js_error)?;
        self.dirty = true;
        Ok(id.to_string())
    }

    #[wasm_bindgen(js_name = removeRelationship)]
    pub fn remove_relationship(&mut self, id: &str) -> Result<(), JsValue> {
        self.graph
            .remove_relationship(&RelationshipId::from(id))
            .map_err(js_error)?;
        self.dirty = true;
        Ok(())
    }

    #[wasm_bindgen(js_name = relationshipCount)]
    pub fn relationship_count(&self) -> u32 {
        self.graph.relationship_count()
    }

    #[wasm_bindgen(js_name = parentsOf)]
    pub fn parents_of(&self, id: &str) -> Result<JsValue, JsValue> {
        let parents = self.graph.parents_of(&PersonId::from(id)).map_err(js_error)?;
        Ok(serde_wasm_bindgen::to_value(&parents)?)
    }

    #[wasm_bindgen(js_name = childrenOf)]
    pub fn children_of(&self, id: &str) -> Result<JsValue, JsValue> {
        let children = self.graph.children_of(&PersonId::from(id)).map_err(js_error)?;
        Ok(serde_wasm_bindgen::to_value(&children)?)
    }

    /// People who can still be linked to `id` as a parent or child.
    #[wasm_bindgen(js_name = availableRelatives)]
    pub fn available_relatives(&self, id: &str) -> Result<JsValue, JsValue> {
        let people = self
            .graph
            .available_relatives(&PersonId::from(id))
            .map_err(js_error)?;
        Ok(serde_wasm_bindgen::to_value(&people)?)
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Replace all data with a `{people, relationships}` object.
    #[wasm_bindgen(js_name = loadSnapshot)]
    pub fn load_snapshot(&mut self, snapshot: JsValue) -> Result<(), JsValue> {
        let snapshot: FamilySnapshot = serde_wasm_bindgen::from_value(snapshot)?;
        self.load(snapshot);
        Ok(())
    }

    /// Replace all data with a JSON-encoded snapshot.
    #[wasm_bindgen(js_name = loadSnapshotJson)]
    pub fn load_snapshot_json(&mut self, json: &str) -> Result<(), JsValue> {
        let snapshot = FamilySnapshot::from_json(json).map_err(js_error)?;
        self.load(snapshot);
        Ok(())
    }

    /// Current people and relationships, in insertion order.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.graph.snapshot())?)
    }

    /// Clear all people and relationships.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.dirty = true;
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// The current layout: placements, connectors, suppressed edges and canvas size.
    #[wasm_bindgen(js_name = computeLayout)]
    pub fn compute_layout(&mut self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(self.current_layout())?)
    }

    /// Box centers as a Float32Array `[x0, y0, x1, y1, ...]`, in placement order.
    pub fn positions(&mut self) -> Float32Array {
        let layout = self.current_layout();
        let half_height = layout.node_height / 2.0;
        let positions: Vec<f32> = layout
            .placements
            .iter()
            .flat_map(|p| [p.x, p.y + half_height])
            .collect();
        Float32Array::from(&positions[..])
    }

    /// SVG path data for every drawn connector, in connector order.
    #[wasm_bindgen(js_name = connectorPaths)]
    pub fn connector_paths(&mut self) -> Vec<String> {
        self.current_layout()
            .connectors
            .iter()
            .map(|c| c.svg_path())
            .collect()
    }

    #[wasm_bindgen(js_name = canvasWidth)]
    pub fn canvas_width(&mut self) -> f32 {
        self.current_layout().width
    }

    #[wasm_bindgen(js_name = canvasHeight)]
    pub fn canvas_height(&mut self) -> f32 {
        self.current_layout().height
    }

    // =========================================================================
    // Hit Testing
    // =========================================================================

    /// Id of the person whose box contains the point, if any.
    #[wasm_bindgen(js_name = personAt)]
    pub fn person_at(&mut self, x: f32, y: f32) -> Option<String> {
        self.refresh();
        self.spatial.person_at(x, y).map(PersonId::to_string)
    }

    /// Ids of everyone whose box intersects the rectangle.
    #[wasm_bindgen(js_name = peopleInRect)]
    pub fn people_in_rect(
        &mut self,
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    ) -> Vec<String> {
        self.refresh();
        self.spatial
            .people_in_rect(min_x, min_y, max_x, max_y)
            .into_iter()
            .map(PersonId::to_string)
            .collect()
    }

    /// Id of the person closest to the point, within `max_distance`.
    #[wasm_bindgen(js_name = nearestPerson)]
    pub fn nearest_person(&mut self, x: f32, y: f32, max_distance: f32) -> Option<String> {
        self.refresh();
        self.spatial
            .nearest_within(x, y, max_distance)
            .map(PersonId::to_string)
    }
}

impl FamilyForestWasm {
    fn from_parts(graph: FamilyGraph, config: PedigreeLayoutConfig) -> Self {
        Self {
            graph,
            config,
            layout: ForestLayout::empty(),
            spatial: SpatialIndex::new(),
            dirty: true,
        }
    }

    fn load(&mut self, snapshot: FamilySnapshot) {
        self.graph = FamilyGraph::from_snapshot(snapshot);
        self.dirty = true;
    }

    /// Recompute the layout and hit-test index if an edit made them stale.
    fn refresh(&mut self) {
        if !self.dirty {
            return;
        }
        self.layout = self.graph.layout(&self.config);
        self.spatial.rebuild(&self.layout);
        self.dirty = false;
    }

    fn current_layout(&mut self) -> &ForestLayout {
        self.refresh();
        &self.layout
    }
}

impl Default for FamilyForestWasm {
    fn default() -> Self {
        Self::new()
    }
}
