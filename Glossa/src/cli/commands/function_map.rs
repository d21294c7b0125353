//! CLI command for checking function maps

use std::path::Path;

use crate::function_map::{FunctionMap, FunctionType};

/// Compile a function map and list its functions
pub fn check(file: &Path) -> anyhow::Result<()> {
    let map = FunctionMap::from_file(file)?;

    for function in map.functions() {
        let types = match &function.kind {
            FunctionType::Single(type_id) => type_id.to_string(),
            FunctionType::Discard => "_".to_string(),
            FunctionType::Range(_) | FunctionType::Mapped(_) => {
                let ids: Vec<String> = function.type_ids().iter().map(ToString::to_string).collect();
                format!("({})", ids.join(", "))
            }
        };
        let args: Vec<&str> = function
            .args
            .iter()
            .filter(|arg| !arg.is_padding && !arg.is_discard)
            .map(|arg| arg.name.as_str())
            .collect();
        println!("[{}, {types}] {} {}", function.group, function.name, args.join(" "));
    }

    println!();
    println!("{} functions OK", map.len());
    Ok(())
}
