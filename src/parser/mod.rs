// Parser module: turns feed XML pages into raw records.

pub mod feed_xml;

pub use feed_xml::{ParsedPage, parse_page};
