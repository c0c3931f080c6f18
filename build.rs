use std::fs;

fn main() {
    // Validate default config at compile time
    let config_path = "src/default_config.toml";
    println!("cargo:rerun-if-changed={}", config_path);

    let content = fs::read_to_string(config_path).expect("Failed to read default_config.toml");

    // Try to parse it as TOML to catch syntax errors
    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid default_config.toml: {}", e),
    };

    // The segmenter needs at least one delimiter pair to find explicit math
    let delimiters = table
        .get("grammar")
        .and_then(|g| g.get("delimiters"))
        .and_then(|d| d.as_array());
    match delimiters {
        Some(list) if !list.is_empty() => {}
        _ => panic!("default_config.toml must declare at least one [[grammar.delimiters]] entry"),
    }
}
