//! The syntax tree: shared immutable green nodes, the arena that allocates
//! them, and the external handles that view them with absolute positions.

mod arena;
mod green;
mod node;

pub use arena::NodeArena;
pub use green::GreenNode;
pub use node::SyntaxNode;
