//! Host document interface and an in-memory implementation.
//!
//! Operations only see a drawing through [`Document`]: a string
//! key-value metadata store, a tree of labelled layers, and drawables
//! addressed by id. [`MemoryDocument`] implements it on plain data and
//! round-trips through JSON.

use std::collections::BTreeMap;
use std::fmt;

use landscape_geom::PathData;
use landscape_math::Point2;
use serde::{Deserialize, Serialize};

/// Address of a layer as the labels from the root down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerPath(Vec<String>);

impl LayerPath {
    /// The document root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Top-level layer with `label`.
    pub fn top(label: impl Into<String>) -> Self {
        Self(vec![label.into()])
    }

    /// Sub-layer `label` of this layer.
    pub fn child(&self, label: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(label.into());
        Self(segments)
    }

    /// Label segments from the root down.
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for LayerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// Geometry of a drawable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    /// SVG path data.
    Path {
        /// `d` attribute.
        d: String,
    },
    /// Straight line between two points.
    Line {
        /// Start point.
        from: Point2,
        /// End point.
        to: Point2,
    },
    /// Axis-aligned rectangle.
    Rect {
        /// Top-left corner.
        origin: Point2,
        /// Width in document units.
        width: f64,
        /// Height in document units.
        height: f64,
    },
    /// Circle.
    Circle {
        /// Center.
        center: Point2,
        /// Radius.
        radius: f64,
    },
    /// Text anchored at a point.
    Text {
        /// Anchor point.
        anchor: Point2,
        /// Content.
        text: String,
    },
}

impl Shape {
    /// Path shape from path data.
    pub fn path(data: &PathData) -> Self {
        Shape::Path {
            d: data.to_string(),
        }
    }

    /// Short name of the shape kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Path { .. } => "path",
            Shape::Line { .. } => "line",
            Shape::Rect { .. } => "rect",
            Shape::Circle { .. } => "circle",
            Shape::Text { .. } => "text",
        }
    }
}

/// A drawable element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawable {
    /// Document-unique identifier.
    pub id: String,
    /// User-visible label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// CSS style string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Geometry.
    pub shape: Shape,
}

impl Drawable {
    /// Drawable without label or style.
    pub fn new(id: impl Into<String>, shape: Shape) -> Self {
        Self {
            id: id.into(),
            label: None,
            style: None,
            shape,
        }
    }

    /// Set the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the style.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }
}

/// A labelled group of drawables and sub-layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer label.
    pub label: String,
    /// Drawables directly in this layer.
    #[serde(default)]
    pub drawables: Vec<Drawable>,
    /// Sub-layers.
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Layer {
    /// Empty layer.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Default::default()
        }
    }

    /// Direct sub-layer with `label`.
    pub fn sublayer(&self, label: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.label == label)
    }

    /// Direct sub-layer with `label`, created when absent.
    pub fn sublayer_or_insert(&mut self, label: &str) -> &mut Layer {
        let pos = match self.layers.iter().position(|l| l.label == label) {
            Some(pos) => pos,
            None => {
                self.layers.push(Layer::new(label));
                self.layers.len() - 1
            }
        };
        &mut self.layers[pos]
    }

    fn descend(&self, segments: &[String]) -> Option<&Layer> {
        match segments.split_first() {
            None => Some(self),
            Some((head, rest)) => self.sublayer(head)?.descend(rest),
        }
    }

    fn find_drawable(&self, id: &str, path: &LayerPath) -> Option<(LayerPath, &Drawable)> {
        if let Some(d) = self.drawables.iter().find(|d| d.id == id) {
            return Some((path.clone(), d));
        }
        self.layers
            .iter()
            .find_map(|l| l.find_drawable(id, &path.child(l.label.clone())))
    }

    fn take_drawable(&mut self, id: &str) -> Option<Drawable> {
        if let Some(pos) = self.drawables.iter().position(|d| d.id == id) {
            return Some(self.drawables.remove(pos));
        }
        self.layers.iter_mut().find_map(|l| l.take_drawable(id))
    }

    fn contains_id(&self, id: &str) -> bool {
        self.drawables.iter().any(|d| d.id == id) || self.layers.iter().any(|l| l.contains_id(id))
    }

    /// Number of drawables in this layer and all sub-layers.
    pub fn drawable_count(&self) -> usize {
        self.drawables.len() + self.layers.iter().map(Layer::drawable_count).sum::<usize>()
    }
}

/// Drawing document as seen by the drafting operations.
pub trait Document {
    /// Metadata value for `key`.
    fn metadata(&self, key: &str) -> Option<&str>;

    /// Set a metadata value.
    fn set_metadata(&mut self, key: &str, value: String);

    /// Remove a metadata value, returning the old one.
    fn remove_metadata(&mut self, key: &str) -> Option<String>;

    /// Page width and height in document units.
    fn page_size(&self) -> (f64, f64);

    /// Layer at `path`.
    fn find_layer(&self, path: &LayerPath) -> Option<&Layer>;

    /// Layer at `path`, creating missing layers along the way.
    fn layer_mut(&mut self, path: &LayerPath) -> &mut Layer;

    /// Drawable with `id` and the layer that holds it.
    fn find_drawable(&self, id: &str) -> Option<(LayerPath, &Drawable)>;

    /// Detach the drawable with `id` from the document.
    fn take_drawable(&mut self, id: &str) -> Option<Drawable>;

    /// Fresh drawable id starting with `prefix`.
    fn next_id(&mut self, prefix: &str) -> String;

    /// Append `drawable` to the layer at `path`, creating the layer if needed.
    fn append_to_layer(&mut self, path: &LayerPath, drawable: Drawable) {
        self.layer_mut(path).drawables.push(drawable);
    }
}

/// Plain-data [`Document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    /// Page width in document units.
    pub width: f64,
    /// Page height in document units.
    pub height: f64,
    /// Metadata store.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Root layer; its label is ignored.
    #[serde(default)]
    pub root: Layer,
    #[serde(default)]
    next_id: u64,
}

impl MemoryDocument {
    /// Empty page of the given size.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            metadata: BTreeMap::new(),
            root: Layer::default(),
            next_id: 0,
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Document for MemoryDocument {
    fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    fn set_metadata(&mut self, key: &str, value: String) {
        self.metadata.insert(key.to_string(), value);
    }

    fn remove_metadata(&mut self, key: &str) -> Option<String> {
        self.metadata.remove(key)
    }

    fn page_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn find_layer(&self, path: &LayerPath) -> Option<&Layer> {
        self.root.descend(path.segments())
    }

    fn layer_mut(&mut self, path: &LayerPath) -> &mut Layer {
        let mut layer = &mut self.root;
        for segment in path.segments() {
            layer = layer.sublayer_or_insert(segment);
        }
        layer
    }

    fn find_drawable(&self, id: &str) -> Option<(LayerPath, &Drawable)> {
        self.root.find_drawable(id, &LayerPath::root())
    }

    fn take_drawable(&mut self, id: &str) -> Option<Drawable> {
        self.root.take_drawable(id)
    }

    fn next_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_id += 1;
            let id = format!("{prefix}{}", self.next_id);
            if !self.root.contains_id(&id) {
                return id;
            }
        }
    }
}
