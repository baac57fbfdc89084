//! Core types for undine diagrams.
//!
//! This crate provides the foundations the parser, layout engines, and
//! renderers share:
//!
//! - **Geometry**: points, sizes, rectangles, insets ([`geometry`])
//! - **Colors**: validated CSS colors ([`color::Color`])
//! - **Themes**: named palettes and color-role resolution ([`theme`])
//! - **Semantic model**: the parsed diagram representation ([`semantic`])

pub mod color;
pub mod geometry;
pub mod semantic;
pub mod theme;
