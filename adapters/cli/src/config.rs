use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use robo_trail_system_runner::RunSettings;
use serde::Deserialize;

const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Settings resolved from the optional configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Settings {
    /// Tunables handed to the run controller.
    pub(crate) run: RunSettings,
    /// Whether narration cues are printed.
    pub(crate) narration: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            run: RunSettings::default(),
            narration: true,
        }
    }
}

impl Settings {
    /// Reads settings from a TOML file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {}", path.display()))?;
        parse_config(&contents)
            .with_context(|| format!("invalid config file at {}", path.display()))
    }

    /// Applies command-line overrides on top of the loaded values.
    pub(crate) fn with_overrides(
        mut self,
        step_delay_ms: Option<u64>,
        action_ceiling: Option<usize>,
        mute: bool,
    ) -> Self {
        if let Some(delay) = step_delay_ms {
            self.run.step_delay = Duration::from_millis(delay);
        }
        if let Some(ceiling) = action_ceiling {
            self.run.action_ceiling = ceiling;
        }
        if mute {
            self.narration = false;
        }
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    version: u32,
    #[serde(default)]
    run: RunSection,
    #[serde(default)]
    narration: NarrationSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RunSection {
    step_delay_ms: Option<u64>,
    action_ceiling: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct NarrationSection {
    enabled: Option<bool>,
}

fn parse_config(contents: &str) -> Result<Settings> {
    let config: ConfigFile =
        toml::from_str(contents).context("failed to parse config toml contents")?;
    if config.version != SUPPORTED_CONFIG_VERSION {
        bail!(
            "unsupported config version {}; expected {}",
            config.version,
            SUPPORTED_CONFIG_VERSION
        );
    }
    if config.run.action_ceiling == Some(0) {
        bail!("action_ceiling must be at least 1");
    }

    let defaults = Settings::default();
    Ok(Settings {
        run: RunSettings {
            step_delay: config
                .run
                .step_delay_ms
                .map_or(defaults.run.step_delay, Duration::from_millis),
            action_ceiling: config
                .run
                .action_ceiling
                .unwrap_or(defaults.run.action_ceiling),
        },
        narration: config.narration.enabled.unwrap_or(defaults.narration),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_only_config_keeps_defaults() {
        let settings = parse_config("version = 1\n").expect("config parses");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.run.step_delay, Duration::from_millis(220));
        assert_eq!(settings.run.action_ceiling, 220);
    }

    #[test]
    fn sections_override_defaults() {
        let settings = parse_config(
            r#"
            version = 1

            [run]
            step_delay_ms = 50
            action_ceiling = 100

            [narration]
            enabled = false
            "#,
        )
        .expect("config parses");

        assert_eq!(settings.run.step_delay, Duration::from_millis(50));
        assert_eq!(settings.run.action_ceiling, 100);
        assert!(!settings.narration);
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let error = parse_config("version = 2\n").expect_err("version 2 is unknown");
        assert!(error.to_string().contains("unsupported config version 2"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_config("version = 1\n[run]\nspeed = 3\n").is_err());
    }

    #[test]
    fn zero_ceiling_is_rejected() {
        assert!(parse_config("version = 1\n[run]\naction_ceiling = 0\n").is_err());
    }

    #[test]
    fn flags_win_over_file_values() {
        let settings = Settings::default().with_overrides(Some(0), Some(10), true);
        assert_eq!(settings.run.step_delay, Duration::ZERO);
        assert_eq!(settings.run.action_ceiling, 10);
        assert!(!settings.narration);
    }
}
