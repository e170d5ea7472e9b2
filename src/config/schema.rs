use crate::markers::{DEFAULT_DELAY_FRAMES, MAX_OUTFITS};
use serde::Deserialize;
use std::fmt;

/// Every parameter of a run, each optional.
///
/// This is both the schema of a preset file and the shape CLI flags are
/// collected into; missing values are prompted for.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialParameters {
    #[serde(default)]
    pub outfits: Option<usize>,
    #[serde(default)]
    pub swap_values: Option<Vec<i64>>,
    #[serde(default)]
    pub toggle_key: Option<String>,
    #[serde(default)]
    pub cycle_key: Option<String>,
    #[serde(default)]
    pub delay: Option<u32>,
    #[serde(default)]
    pub underwater_only: Option<bool>,
    #[serde(default)]
    pub global_detection: Option<bool>,
    #[serde(default)]
    pub shader_patch: Option<bool>,
    #[serde(default)]
    pub modern_game_version: Option<bool>,
    #[serde(default)]
    pub revert: Option<bool>,
}

impl PartialParameters {
    /// Fill every unset field of `self` from `fallback`.
    pub fn or(self, fallback: PartialParameters) -> PartialParameters {
        PartialParameters {
            outfits: self.outfits.or(fallback.outfits),
            swap_values: self.swap_values.or(fallback.swap_values),
            toggle_key: self.toggle_key.or(fallback.toggle_key),
            cycle_key: self.cycle_key.or(fallback.cycle_key),
            delay: self.delay.or(fallback.delay),
            underwater_only: self.underwater_only.or(fallback.underwater_only),
            global_detection: self.global_detection.or(fallback.global_detection),
            shader_patch: self.shader_patch.or(fallback.shader_patch),
            modern_game_version: self.modern_game_version.or(fallback.modern_game_version),
            revert: self.revert.or(fallback.revert),
        }
    }

    /// Check the values that are present for consistency.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.outfits == Some(0) {
            issues.push(ValidationIssue::NoOutfits);
        }
        if let (Some(outfits), Some(values)) = (self.outfits, &self.swap_values) {
            if outfits != values.len() {
                issues.push(ValidationIssue::CountMismatch {
                    outfits,
                    values: values.len(),
                });
            }
        }
        if self.outfits.is_none() && self.swap_values.as_ref().is_some_and(Vec::is_empty) {
            issues.push(ValidationIssue::NoOutfits);
        }
        let requested = self
            .outfits
            .into_iter()
            .chain(self.swap_values.as_ref().map(Vec::len))
            .max();
        if let Some(outfits) = requested.filter(|count| *count > MAX_OUTFITS) {
            issues.push(ValidationIssue::TooManyOutfits { outfits });
        }
        for (field, key) in [
            ("toggle_key", &self.toggle_key),
            ("cycle_key", &self.cycle_key),
        ] {
            if key.as_deref().is_some_and(|k| k.trim().is_empty()) {
                issues.push(ValidationIssue::EmptyKey { field });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// How the generated logic learns that the character is underwater.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMode {
    /// The mod carries its own swim-icon and water-censor overrides
    Local,
    /// A separately installed global censorship-removal mod exports
    /// `$\global\submerged\submerged_start`
    Global,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderPatch {
    Disabled,
    Enabled { modern_game_version: bool },
}

/// The user-facing outfit settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutfitConfiguration {
    toggle_key: String,
    swap_values: Vec<i64>,
    cycle_key: Option<String>,
    delay_frames: u32,
    underwater_only: bool,
}

impl OutfitConfiguration {
    /// Build a configuration, enforcing one swap value per outfit and a
    /// non-empty toggle key.
    pub fn new(
        toggle_key: impl Into<String>,
        swap_values: Vec<i64>,
        cycle_key: Option<String>,
        delay_frames: Option<u32>,
        underwater_only: bool,
    ) -> Result<Self, ValidationError> {
        let toggle_key = toggle_key.into();
        let candidate = PartialParameters {
            outfits: Some(swap_values.len()),
            swap_values: Some(swap_values.clone()),
            toggle_key: Some(toggle_key.clone()),
            cycle_key: cycle_key.clone(),
            ..PartialParameters::default()
        };
        candidate.validate()?;

        Ok(Self {
            toggle_key: toggle_key.trim().to_string(),
            swap_values,
            cycle_key: cycle_key.map(|key| key.trim().to_string()),
            delay_frames: delay_frames.unwrap_or(DEFAULT_DELAY_FRAMES),
            underwater_only,
        })
    }

    pub fn outfit_count(&self) -> usize {
        self.swap_values.len()
    }

    pub fn toggle_key(&self) -> &str {
        &self.toggle_key
    }

    pub fn swap_values(&self) -> &[i64] {
        &self.swap_values
    }

    pub fn cycle_key(&self) -> Option<&str> {
        self.cycle_key.as_deref()
    }

    pub fn delay_frames(&self) -> u32 {
        self.delay_frames
    }

    pub fn underwater_only(&self) -> bool {
        self.underwater_only
    }

    /// `0,1,…,N-1` for the outfit selection cycle.
    pub fn select_values(&self) -> String {
        (0..self.outfit_count())
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Everything the applicator needs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchPlan {
    pub outfits: OutfitConfiguration,
    pub detection: DetectionMode,
    pub shader_patch: ShaderPatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.issues.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    NoOutfits,
    CountMismatch { outfits: usize, values: usize },
    TooManyOutfits { outfits: usize },
    EmptyKey { field: &'static str },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::NoOutfits => write!(f, "at least one underwater outfit is required"),
            ValidationIssue::CountMismatch { outfits, values } => write!(
                f,
                "{} outfits requested but {} swap values given",
                outfits, values
            ),
            ValidationIssue::TooManyOutfits { outfits } => write!(
                f,
                "{} underwater outfits requested, at most {} are supported",
                outfits, MAX_OUTFITS
            ),
            ValidationIssue::EmptyKey { field } => write!(f, "{} must not be empty", field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_defaults_delay() {
        let config = OutfitConfiguration::new("VK_RIGHT", vec![4, 5], None, None, false).unwrap();
        assert_eq!(config.delay_frames(), DEFAULT_DELAY_FRAMES);
        assert_eq!(config.outfit_count(), 2);
        assert_eq!(config.select_values(), "0,1");
    }

    #[test]
    fn configuration_rejects_empty_values() {
        let err = OutfitConfiguration::new("VK_RIGHT", vec![], None, None, false).unwrap_err();
        assert!(err.issues.contains(&ValidationIssue::NoOutfits));
    }

    #[test]
    fn configuration_rejects_blank_key() {
        let err = OutfitConfiguration::new("  ", vec![1], None, None, false).unwrap_err();
        assert_eq!(
            err.issues,
            vec![ValidationIssue::EmptyKey {
                field: "toggle_key"
            }]
        );
    }

    #[test]
    fn partial_parameters_detect_count_mismatch() {
        let params = PartialParameters {
            outfits: Some(3),
            swap_values: Some(vec![1, 2]),
            ..PartialParameters::default()
        };
        let err = params.validate().unwrap_err();
        assert_eq!(
            err.issues,
            vec![ValidationIssue::CountMismatch {
                outfits: 3,
                values: 2
            }]
        );
    }

    #[test]
    fn partial_parameters_cap_outfit_count() {
        let params = PartialParameters {
            outfits: Some(usize::MAX / 4),
            ..PartialParameters::default()
        };
        let err = params.validate().unwrap_err();
        assert_eq!(
            err.issues,
            vec![ValidationIssue::TooManyOutfits {
                outfits: usize::MAX / 4
            }]
        );

        let at_limit = PartialParameters {
            outfits: Some(MAX_OUTFITS),
            ..PartialParameters::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn flags_take_precedence_over_preset() {
        let flags = PartialParameters {
            toggle_key: Some("VK_LEFT".to_string()),
            ..PartialParameters::default()
        };
        let preset = PartialParameters {
            toggle_key: Some("VK_RIGHT".to_string()),
            delay: Some(60),
            ..PartialParameters::default()
        };
        let merged = flags.or(preset);
        assert_eq!(merged.toggle_key.as_deref(), Some("VK_LEFT"));
        assert_eq!(merged.delay, Some(60));
    }
}
