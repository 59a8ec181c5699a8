/*!
# RingMap SVG Output

A [`Canvas`](ringmap_core::Canvas) that collects SVG elements, and an exporter that renders a
[`GenomeMap`](ringmap_core::GenomeMap) into an SVG file. Label bounds can be written next to it as
JSON, or as an HTML page whose image map links the labels.

Text is measured with a fixed per-character estimate, so label boxes approximate what a browser
draws with a proportional sans-serif font.
*/

pub mod canvas;
pub mod html;
pub mod vector_export;

pub use canvas::SvgCanvas;
pub use html::image_map_page;
pub use vector_export::{ExportConfig, VectorExporter};
