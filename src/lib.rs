#![warn(clippy::all, rust_2018_idioms)]

pub mod codec;
pub mod editor;
pub mod feature;
pub mod geometry;
pub mod history;
pub mod id_generator;
pub mod import;
pub mod input;
pub mod properties;
pub mod renderer;

pub use editor::{Editor, Selection, ToolMode};
pub use feature::{DrawMode, Feature, FeatureCollection, Geometry, LngLat, PathMode};
pub use history::History;
pub use id_generator::{IdSource, SequentialSource, UuidSource};
pub use import::ImportMode;
pub use input::{HistoryAction, Modifiers};
pub use renderer::{MapRenderer, NoopRenderer};
