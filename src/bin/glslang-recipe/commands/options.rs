//! `glslang-recipe options` command

use anyhow::Result;

use glslang_recipe::OptionKey;

pub fn execute() -> Result<()> {
    println!("{:<20} {:<8} {:<12} DESCRIPTION", "OPTION", "DEFAULT", "VALUES");
    for key in OptionKey::ALL {
        println!(
            "{:<20} {:<8} {:<12} {}",
            key.as_str(),
            key.default_value(),
            key.kind().allowed_values().join("|"),
            key.description()
        );
    }
    Ok(())
}
