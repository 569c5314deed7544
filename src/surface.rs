//! Attribute layer: the seam between interaction logic and whatever renders the scene.
//!
//! ARCHITECTURE
//! ============
//! Controllers never touch a DOM directly. They read and write through the
//! [`Surface`] trait, which a browser host implements over real SVG nodes and
//! which [`MemorySurface`] implements in memory for tests, the replay tool,
//! and headless hosts. Every method tolerates unknown element ids: writes are
//! dropped and reads return `None`, so a controller holding a stale id after
//! the scene removed an element degrades instead of failing.

#[cfg(test)]
#[path = "surface_test.rs"]
mod surface_test;

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use uuid::Uuid;

use crate::consts::ATTR_TRANSFORM;
use crate::geometry::{Point, Rect, Size};
use crate::input::PointerId;
use crate::transform::Transform;

/// Opaque reference to a scene element.
pub type ElementId = Uuid;

/// Operations the interaction core needs from the rendering layer.
pub trait Surface {
    /// Whether the element is still attached to the scene.
    fn contains(&self, el: ElementId) -> bool;

    fn parent(&self, el: ElementId) -> Option<ElementId>;

    fn attribute(&self, el: ElementId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str);

    fn remove_attribute(&mut self, el: ElementId, name: &str);

    /// Numeric attribute value; 0 when missing or unparseable.
    fn read_attribute_number(&self, el: ElementId, name: &str) -> f64 {
        match self.attribute(el, name).map(|raw| raw.trim().parse::<f64>()) {
            Some(Ok(v)) if v.is_finite() => v,
            _ => 0.0,
        }
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool;

    fn add_class(&mut self, el: ElementId, class: &str);

    fn remove_class(&mut self, el: ElementId, class: &str);

    fn set_text(&mut self, el: ElementId, text: &str);

    /// Append a new child element. Returns `None` if `parent` is unknown.
    fn create_element(&mut self, parent: ElementId, tag: &str) -> Option<ElementId>;

    /// Detach an element and its subtree.
    fn remove_element(&mut self, el: ElementId);

    /// Move the element to the end of its parent's children (top of paint order).
    fn raise(&mut self, el: ElementId);

    fn set_pointer_capture(&mut self, el: ElementId, pointer: PointerId);

    fn release_pointer_capture(&mut self, el: ElementId, pointer: PointerId);

    fn has_pointer_capture(&self, el: ElementId, pointer: PointerId) -> bool;

    /// Uniform factor between screen pixels and the root's own coordinate
    /// system, e.g. a `viewBox` rendered at twice its size reports 2.0.
    fn screen_scale(&self, _root: ElementId) -> f64 {
        1.0
    }

    /// Viewport size of the element in its own coordinate system.
    fn extent(&self, el: ElementId) -> Option<Size>;

    /// Bounding box of the element in its parent's coordinate system.
    fn bounds(&self, el: ElementId) -> Option<Rect>;

    /// Whether the runtime can animate `name` on `el`.
    fn can_animate(&self, _el: ElementId, _name: &str) -> bool {
        true
    }

    /// Whether `el` is `ancestor` or lies beneath it.
    fn is_within(&self, el: ElementId, ancestor: ElementId) -> bool {
        let mut cursor = Some(el);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Topmost ancestor of `el` (itself when parentless).
    fn root_of(&self, el: ElementId) -> ElementId {
        let mut current = el;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Transform of the nearest ancestor (excluding `el`) whose `transform`
    /// attribute parses; identity when there is none.
    fn inherited_transform(&self, el: ElementId) -> Transform {
        let mut cursor = self.parent(el);
        while let Some(current) = cursor {
            if let Some(Ok(t)) = self.attribute(current, ATTR_TRANSFORM).map(|raw| raw.parse::<Transform>()) {
                return t;
            }
            cursor = self.parent(current);
        }
        Transform::IDENTITY
    }

    /// Convert a screen position into the coordinate system `el` is drawn in:
    /// undo the outer screen scale, then the inherited transform.
    fn local_point(&self, el: ElementId, screen: Point) -> Point {
        let scale = self.screen_scale(self.root_of(el));
        self.inherited_transform(el).invert(screen.scaled_down(scale))
    }
}

// =============================================================================
// IN-MEMORY SURFACE
// =============================================================================

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    attributes: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    text: Option<String>,
    extent: Option<Size>,
    bounds: Option<Rect>,
}

impl Node {
    fn new(tag: &str, parent: Option<ElementId>) -> Self {
        Self {
            tag: tag.to_owned(),
            parent,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            classes: BTreeSet::new(),
            text: None,
            extent: None,
            bounds: None,
        }
    }
}

/// Element tree held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    nodes: HashMap<ElementId, Node>,
    captures: HashSet<(ElementId, PointerId)>,
    screen_scale: f64,
    frozen_attributes: HashSet<String>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            captures: HashSet::new(),
            screen_scale: 1.0,
            frozen_attributes: HashSet::new(),
        }
    }

    /// Create a parentless element.
    pub fn create_root(&mut self, tag: &str) -> ElementId {
        let id = Uuid::new_v4();
        self.nodes.insert(id, Node::new(tag, None));
        id
    }

    /// Set the outer screen scale reported for every root.
    pub fn set_screen_scale(&mut self, scale: f64) {
        self.screen_scale = scale;
    }

    pub fn set_extent(&mut self, el: ElementId, extent: Size) {
        if let Some(node) = self.nodes.get_mut(&el) {
            node.extent = Some(extent);
        }
    }

    pub fn set_bounds(&mut self, el: ElementId, bounds: Rect) {
        if let Some(node) = self.nodes.get_mut(&el) {
            node.bounds = Some(bounds);
        }
    }

    /// Mark an attribute name as not animatable by this runtime.
    pub fn freeze_attribute(&mut self, name: &str) {
        self.frozen_attributes.insert(name.to_owned());
    }

    #[must_use]
    pub fn tag(&self, el: ElementId) -> Option<&str> {
        self.nodes.get(&el).map(|n| n.tag.as_str())
    }

    #[must_use]
    pub fn children(&self, el: ElementId) -> &[ElementId] {
        self.nodes.get(&el).map_or(&[], |n| n.children.as_slice())
    }

    /// Sorted class list of an element.
    #[must_use]
    pub fn classes(&self, el: ElementId) -> Vec<String> {
        self.nodes
            .get(&el)
            .map_or_else(Vec::new, |n| n.classes.iter().cloned().collect())
    }

    #[must_use]
    pub fn text(&self, el: ElementId) -> Option<&str> {
        self.nodes.get(&el).and_then(|n| n.text.as_deref())
    }

    /// Ids of every element carrying `class`.
    #[must_use]
    pub fn find_by_class(&self, class: &str) -> Vec<ElementId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.classes.contains(class))
            .map(|(id, _)| *id)
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of live pointer captures across all elements.
    #[must_use]
    pub fn capture_count(&self) -> usize {
        self.captures.len()
    }

    fn collect_subtree(&self, el: ElementId, out: &mut Vec<ElementId>) {
        out.push(el);
        if let Some(node) = self.nodes.get(&el) {
            for child in &node.children {
                self.collect_subtree(*child, out);
            }
        }
    }
}

impl Surface for MemorySurface {
    fn contains(&self, el: ElementId) -> bool {
        self.nodes.contains_key(&el)
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.nodes.get(&el).and_then(|n| n.parent)
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.nodes.get(&el).and_then(|n| n.attributes.get(name).cloned())
    }

    fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) {
        if let Some(node) = self.nodes.get_mut(&el) {
            node.attributes.insert(name.to_owned(), value.to_owned());
        }
    }

    fn remove_attribute(&mut self, el: ElementId, name: &str) {
        if let Some(node) = self.nodes.get_mut(&el) {
            node.attributes.remove(name);
        }
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.nodes.get(&el).is_some_and(|n| n.classes.contains(class))
    }

    fn add_class(&mut self, el: ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(&el) {
            node.classes.insert(class.to_owned());
        }
    }

    fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(node) = self.nodes.get_mut(&el) {
            node.classes.remove(class);
        }
    }

    fn set_text(&mut self, el: ElementId, text: &str) {
        if let Some(node) = self.nodes.get_mut(&el) {
            node.text = Some(text.to_owned());
        }
    }

    fn create_element(&mut self, parent: ElementId, tag: &str) -> Option<ElementId> {
        let id = Uuid::new_v4();
        let parent_node = self.nodes.get_mut(&parent)?;
        parent_node.children.push(id);
        self.nodes.insert(id, Node::new(tag, Some(parent)));
        Some(id)
    }

    fn remove_element(&mut self, el: ElementId) {
        let mut doomed = Vec::new();
        self.collect_subtree(el, &mut doomed);
        if let Some(parent) = self.parent(el)
            && let Some(parent_node) = self.nodes.get_mut(&parent)
        {
            parent_node.children.retain(|c| *c != el);
        }
        for id in &doomed {
            self.nodes.remove(id);
        }
        self.captures.retain(|(id, _)| !doomed.contains(id));
    }

    fn raise(&mut self, el: ElementId) {
        let Some(parent) = self.parent(el) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|c| *c != el);
            parent_node.children.push(el);
        }
    }

    fn set_pointer_capture(&mut self, el: ElementId, pointer: PointerId) {
        if self.nodes.contains_key(&el) {
            // A pointer can only be captured by one element at a time.
            self.captures.retain(|(_, p)| *p != pointer);
            self.captures.insert((el, pointer));
        }
    }

    fn release_pointer_capture(&mut self, el: ElementId, pointer: PointerId) {
        self.captures.remove(&(el, pointer));
    }

    fn has_pointer_capture(&self, el: ElementId, pointer: PointerId) -> bool {
        self.captures.contains(&(el, pointer))
    }

    fn screen_scale(&self, _root: ElementId) -> f64 {
        self.screen_scale
    }

    fn extent(&self, el: ElementId) -> Option<Size> {
        self.nodes.get(&el).and_then(|n| n.extent)
    }

    fn bounds(&self, el: ElementId) -> Option<Rect> {
        self.nodes.get(&el).and_then(|n| n.bounds)
    }

    fn can_animate(&self, _el: ElementId, name: &str) -> bool {
        !self.frozen_attributes.contains(name)
    }
}
