pub mod editor;
pub mod printer;
pub mod reader;
pub mod types;
