pub mod columns;
pub mod file_list;
pub mod viewport;
