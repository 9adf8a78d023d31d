// Section parsing: free-form / Markdown leaflet text → the nine sheet fields.
// Pure and synchronous; a parser instance carries its own keyword table.

pub mod fields;
pub mod handlers;
pub mod markdown;
pub mod patterns;
pub mod section_parser;

pub use fields::{FieldKey, SheetFields};
pub use section_parser::{ParseResult, SectionParser};
