//! Rendering of the dashboard.

pub mod dashboard;
pub mod metrics;

pub use dashboard::render_dashboard as render;
