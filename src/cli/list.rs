use crate::core::resolver::Resolver;
use anyhow::{bail, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,
}

#[derive(Serialize)]
struct ListEntry {
    key: String,
    address: String,
}

/// Show manifest entries (key and interpolated address) without resolving
/// any values, so no backend reads happen.
pub fn run(resolver: &mut Resolver, args: ListArgs) -> Result<()> {
    let mut entries = Vec::new();
    for key in resolver.keys()? {
        let address = resolver.address_of(&key)?.unwrap_or_default();
        entries.push(ListEntry { key, address });
    }

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        "table" => {
            if entries.is_empty() {
                println!("No entries in manifest.");
                return Ok(());
            }
            let mut table = Table::new();
            table.load_preset(UTF8_FULL);
            table.set_header(vec![
                Cell::new("Key").add_attribute(Attribute::Bold),
                Cell::new("Address").add_attribute(Attribute::Bold),
            ]);
            for entry in &entries {
                table.add_row(vec![Cell::new(&entry.key), Cell::new(&entry.address)]);
            }
            println!("{table}");
        }
        other => bail!("unknown format '{}', expected table|json", other),
    }

    Ok(())
}
