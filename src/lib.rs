
pub mod bbox;
pub mod group;
pub mod scene;
pub mod error;
pub mod command;
pub mod numeric;
pub mod interval;
pub mod settings;
pub mod json_structs;
pub mod json_parser;

pub mod prelude;
