mod glob_tool;
mod graph;
mod read;
mod search;
mod tree;

pub use glob_tool::GlobTool;
pub use graph::GraphTool;
pub use read::ReadTool;
pub use search::SearchTool;
pub use tree::TreeTool;
