//! Content taxonomy: typed listing records, the selection path through
//! coaching → class → subject → test type → chapter, and the resolver that lists the children
//! of a node for a given session.

pub mod model;
pub mod path;
pub mod resolver;

pub use model::{ChildEntry, Keyed, PdfRecord};
pub use path::{Depth, Selections, Step};
pub use resolver::TaxonomyResolver;
