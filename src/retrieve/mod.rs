//! Retrieval over the knowledge base: graph triples and vector-ranked
//! passages. The two retrievers are independent — neither orders before the
//! other — and both feed the fusion scorer and prompt composer.

pub mod graph;
pub mod vector;

pub use graph::{Relation, Triple, TRIPLE_CAP};
pub use vector::{RetrievedPassage, DEFAULT_TOP_K};
