mod node;
mod program;

pub use node::Node;
pub use program::ProgramTree;
