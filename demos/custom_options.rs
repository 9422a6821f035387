//! Customizing the line format with RecordOptions.
//!
//! Run with: cargo run --example custom_options

use serde::{Deserialize, Serialize};
use serde_delimited::{
    from_str_with_options, schema, to_string_with_options, Delimiter, RecordOptions,
};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize)]
struct DataRow {
    id: u32,
    ratio: f64,
    active: bool,
    note: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let row = DataRow {
        id: 1,
        ratio: 2.0 / 3.0,
        active: true,
        note: "first | row".to_string(),
    };

    let layout = schema::<DataRow>()?;
    println!("Schema `{}` with {} fields:", layout.name(), layout.arity());
    for field in layout.fields() {
        println!("  {}: {}", field.name().unwrap_or("?"), field.kind());
    }
    println!();

    // Default format (pipe delimiter, shortest round-trip floats)
    println!("Default (pipe):");
    print!("{}", serde_delimited::to_string(&row)?);
    println!("  note: the pipe inside `note` is not escaped\n");

    // Tab delimiter (useful for spreadsheets)
    println!("Tab delimiter:");
    let tab_options = RecordOptions::new().with_delimiter(Delimiter::TAB);
    let tab_line = to_string_with_options(&row, tab_options.clone())?;
    print!("{}", tab_line);
    let back: DataRow = from_str_with_options(&tab_line, tab_options)?;
    println!("  read back: {:?}\n", back);

    // Fixed float precision (lossy)
    println!("Two decimals:");
    let fixed = RecordOptions::new()
        .with_delimiter(Delimiter::SEMICOLON)
        .with_float_precision(2);
    print!("{}", to_string_with_options(&row, fixed)?);

    Ok(())
}
