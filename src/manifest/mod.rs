//! Manifests: YAML documents declaring which agents and tools to load.
//!
//! ```text
//! YAML file
//!   ↓  ManifestParser::parse()
//! ManifestDocument (validated, disabled entries included)
//!   ↓  ManifestDocument::enabled_in_order()
//! ordered entries handed to the loader
//! ```

pub mod entry;
pub mod parser;

pub use entry::{enabled_in_order, ManifestDocument, ManifestEntry, ManifestKind};
pub use parser::{ManifestParser, MissingManifest};
