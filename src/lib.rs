#[macro_use]
pub mod macros;

pub mod bms_writer;
pub mod chart;
pub mod header;
pub mod pipeline;
pub mod section_parser;
pub mod session;
