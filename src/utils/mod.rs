pub mod structured_parser;
pub mod text;
