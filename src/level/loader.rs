//! Load level definitions from TOML files

use std::fs;
use std::path::Path;

use crate::core::error::Result;
use crate::level::definition::LevelDefinition;

/// Parse and validate a level from TOML text
pub fn parse_level(content: &str) -> Result<LevelDefinition> {
    let level: LevelDefinition = toml::from_str(content)?;
    level.validate()?;
    Ok(level)
}

/// Load a single level file
pub fn load_level(path: &Path) -> Result<LevelDefinition> {
    let content = fs::read_to_string(path)?;
    parse_level(&content)
}

/// Load every `*.toml` level in a directory, ordered by file name
///
/// Files that fail to parse are skipped with a warning.
pub fn load_levels(dir: &Path) -> Result<Vec<LevelDefinition>> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    let mut levels = Vec::with_capacity(paths.len());
    for path in paths {
        match load_level(&path) {
            Ok(level) => levels.push(level),
            Err(e) => tracing::warn!("Skipping level {}: {}", path.display(), e),
        }
    }
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::WellError;
    use crate::disposition::{DispositionType, Tier};
    use crate::objective::PlanDefinition;

    const LEVEL: &str = r#"
        name = "First Session"
        seed = 7

        [initial]
        amount = [60.0, 60.0, 60.0, 60.0, 60.0, 60.0]
        spin = [10.0, 0.0, 0.0, 0.0, 0.0, -10.0]

        [plan]
        kind = "all_band_hold"
        low = 150.0
        high = 300.0
        hold_sec = 12.0

        [[dispositions]]
        type = "locks_in"
        hue = 2
        tier = 1
        duration = 15.0

        [[dispositions]]
        type = "spirals"
        tier = 2
        strength = 1.5
    "#;

    #[test]
    fn test_parse_level() {
        let level = parse_level(LEVEL).unwrap();
        assert_eq!(level.name, "First Session");
        assert_eq!(level.seed, Some(7));
        assert_eq!(level.initial.spin[5], -10.0);
        assert_eq!(level.initial.psyche, [100.0; 6]);
        assert_eq!(
            level.plan,
            PlanDefinition::AllBandHold {
                low: 150.0,
                high: 300.0,
                hold_sec: 12.0
            }
        );
        assert_eq!(level.dispositions.len(), 2);
        assert_eq!(level.dispositions[0].kind, DispositionType::LocksIn);
        assert_eq!(level.dispositions[0].hue, Some(2));
        assert_eq!(level.dispositions[1].tier, Tier::High);
        assert_eq!(level.dispositions[1].duration, 20.0);
    }

    #[test]
    fn test_minimal_level_is_sandbox() {
        let level = parse_level("name = \"Open\"").unwrap();
        assert_eq!(level.plan, PlanDefinition::default());
        assert!(level.dispositions.is_empty());
        assert_eq!(level.initial.amount, [62.5; 6]);
    }

    #[test]
    fn test_bad_hue_is_rejected() {
        let text = "name = \"Bad\"\n[[dispositions]]\ntype = \"amped\"\nhue = 6\n";
        assert!(matches!(parse_level(text), Err(WellError::InvalidLevel(_))));
    }

    #[test]
    fn test_bad_tier_is_rejected() {
        let text = "name = \"Bad\"\n[[dispositions]]\ntype = \"amped\"\ntier = 3\n";
        assert!(parse_level(text).is_err());
    }
}
