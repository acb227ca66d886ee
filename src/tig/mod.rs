//! The unitig layer: `ufNode`, `Unitig`, and the `TigVector` arena that
//! owns every `Unitig` (`spec.md` §3, §4.1, §4.2).

pub mod node;
pub mod unitig;
pub mod vector;

pub use node::{Position, UfNode};
pub use unitig::Unitig;
pub use vector::TigVector;
