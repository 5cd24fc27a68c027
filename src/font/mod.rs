//! Title text: typeface loading, layout and extrusion.
//!
//! ```ignore
//! let typeface = Typeface::load("droid_serif_regular.typeface.json")?;
//! let mesh = TextMesh::build(&typeface, "I Love Kim Chi", &TextStyle::default())?;
//! ```

pub mod mesh;
pub mod outline;
pub mod task;
pub mod typeface;

pub use mesh::{TextMesh, TextStyle};
pub use task::{should_retry, FontRequest, FontTask};
pub use typeface::{Glyph, Typeface, FALLBACK_GLYPH};
