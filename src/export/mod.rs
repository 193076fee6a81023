pub mod json;

pub use json::{ExportError, export_json_to_path, import_json};
