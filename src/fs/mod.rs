pub mod dir_tree;
pub mod drives;
pub mod entry;
pub mod scanner;
pub mod watcher;
