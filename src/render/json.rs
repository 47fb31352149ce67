//! JSON renderer.
//!
//! Serializes the render model as-is, for surfaces that paint it themselves.

use crate::render::{DiffRenderModel, SurfaceRenderer};

/// JSON output renderer.
pub struct JsonRenderer;

impl SurfaceRenderer for JsonRenderer {
    fn render(&self, model: &DiffRenderModel) -> String {
        serde_json::to_string_pretty(model).unwrap_or_else(|_| "{}".to_string())
    }
}
