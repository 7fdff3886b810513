//! Content module - overlay documents and their rendering

mod frontmatter;
mod markdown;
pub mod overlay;
mod project;

pub use frontmatter::{FrontMatter, FrontMatterError};
pub use markdown::{MarkdownRenderer, DEFAULT_THEME};
pub use overlay::{OverlayResolver, OverlayStatus, CONTENT_NOT_PREPARED, CONTENT_UNAVAILABLE};
pub use project::ProjectDetail;
