use crate::core::config::Config;
use crate::core::personality::all_personalities;

pub fn list_personalities() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let current = config.personality();

    println!("Available personalities:\n");
    for personality in all_personalities() {
        let mark = if personality.id == current.id { "*" } else { " " };
        println!(
            "  {} {} {} - {}",
            mark, personality.avatar_glyph, personality.id, personality.display_name
        );
    }

    println!("\nCurrent: {}", current.id);
    Ok(())
}
