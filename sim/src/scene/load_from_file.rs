use bevy_log::info;
use ron::de::from_str;
use std::fs;
use std::path::Path;

use super::SceneConfig;

pub fn load_scene(path: Option<&Path>) -> Result<SceneConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        info!("No scene file given, using the built-in scene");
        return Ok(SceneConfig::default());
    };

    if !path.exists() {
        info!(
            "Scene file not found: {}. Using the built-in scene.",
            path.display()
        );
        return Ok(SceneConfig::default());
    }

    let contents: String = fs::read_to_string(path)?;
    let scene = parse_scene(&contents)?;

    info!("Loaded scene \"{}\" from {}", scene.name, path.display());

    Ok(scene)
}

/// Parses and checks a RON scene. Every water grid and buoyancy override must
/// be valid.
pub fn parse_scene(contents: &str) -> Result<SceneConfig, Box<dyn std::error::Error>> {
    let scene: SceneConfig = from_str(contents)?;
    for water in &scene.waters {
        water.surface_config().validate()?;
    }
    for body in &scene.bodies {
        if let Some(settings) = &body.buoyancy {
            settings.validate()?;
        }
    }
    Ok(scene)
}
