//! Renderers for laid-out diagrams.
//!
//! Both renderers consume the same layout structures. The SVG renderer
//! draws in user units; the text-grid renderer re-derives integer geometry
//! from the layout's rank/order structure.

pub mod ascii;
pub mod svg;
