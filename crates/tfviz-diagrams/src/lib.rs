//! Diagram assembly and rendering for tfviz.
//!
//! Maps extracted [`tfviz_model::ParsedConfig`] aggregates into a
//! [`DiagramDescription`] (nodes, edges, styling hints), serializes that
//! description to Graphviz DOT, and renders it to image files through a
//! Kroki service.
//!
//! # Architecture
//!
//! - [`category`]: `CategoryMap` mapping resource kinds to visual categories
//! - [`preset`]: `LayoutPreset` font and spacing constants
//! - [`descriptor`]: node/edge descriptor types
//! - [`assemble`]: model-to-description mapping
//! - [`dot`]: DOT serialization
//! - [`kroki`]: parallel HTTP rendering via a Kroki server
//!
//! Layout itself (node placement, edge routing) belongs to Graphviz behind
//! the Kroki service; this crate only describes what to draw.

mod assemble;
mod category;
mod consts;
mod descriptor;
mod dot;
mod kroki;
mod preset;

pub use assemble::{AssembleOptions, assemble, build_edges, build_node};
pub use category::{Category, CategoryMap};
pub use consts::{DEFAULT_DPI, DEFAULT_TIMEOUT};
pub use descriptor::{
    Annotation, DiagramDescription, EdgeDescriptor, EdgeStyle, NodeDescriptor,
};
pub use dot::to_dot;
pub use kroki::{
    FigureError, FigureErrorKind, FigureRequest, OutputFormat, PartialRenderResult,
    RenderedFigure, create_agent, render_all,
};
pub use preset::LayoutPreset;
