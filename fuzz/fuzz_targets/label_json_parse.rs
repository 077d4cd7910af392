//! Fuzz target for label JSON parsing.
//!
//! Feeds arbitrary bytes to the label file parser and decodes every
//! parsed image into a shape store, checking for panics.

#![no_main]

use libfuzzer_sys::fuzz_target;
use labelreview::ir::io_json::from_json_slice;
use labelreview::store::ShapeStore;
use labelreview::validation::{validate_label_file, ValidateOptions};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(labels) = from_json_slice(data) {
        let _ = validate_label_file(&labels, &ValidateOptions::default());
        for record in &labels.images {
            let _ = ShapeStore::load(record);
        }
    }
});
