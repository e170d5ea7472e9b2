//! Turns flags + preset into a complete [`PatchPlan`], prompting for
//! whatever is still missing.

use crate::config::schema::{
    DetectionMode, OutfitConfiguration, PartialParameters, PatchPlan, ShaderPatch,
    ValidationError,
};
use crate::markers::{MAX_OUTFITS, SWAPVAR_VARIABLE};
use crate::prompt::{InputError, Prompter};
use std::io::{BufRead, Write};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("invalid parameters: {0}")]
    Invalid(#[from] ValidationError),
}

/// A fully specified run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRun {
    pub plan: PatchPlan,
    /// Answer to the final "restore backups?" question, when known up front
    pub revert: Option<bool>,
}

pub fn resolve<R: BufRead, W: Write>(
    params: PartialParameters,
    prompter: &mut Prompter<R, W>,
) -> Result<ResolvedRun, ResolveError> {
    params.validate()?;

    let outfits = match (params.outfits, &params.swap_values) {
        (Some(outfits), _) => outfits,
        (None, Some(values)) => values.len(),
        (None, None) => prompter.ask_parsed(
            "How many Underwater Outfits do you have? (e.g., 'Number'):",
            |count: &usize| (1..=MAX_OUTFITS).contains(count),
        )?,
    };

    let swap_values = match params.swap_values {
        Some(values) => values,
        None => {
            let mut values = Vec::new();
            for outfit in 1..=outfits {
                values.push(prompter.ask_integer(&format!(
                    "Enter the value of {} for Underwater Outfit {} (e.g., 'Number'):",
                    SWAPVAR_VARIABLE, outfit
                ))?);
            }
            values
        }
    };

    let toggle_key = match params.toggle_key {
        Some(key) => key,
        None => prompter.ask_key(
            "Enter a key for toggling auto underwater outfit (e.g., 'Number, Letter, or Special Key (VK_RIGHT)'):",
        )?,
    };

    let global_detection = match params.global_detection {
        Some(answer) => answer,
        None => prompter
            .ask_yes_no("Are you using RemoveUnderwaterCensorship global version? (yes/no):")?,
    };

    let underwater_only = match params.underwater_only {
        Some(answer) => answer,
        None => prompter.ask_yes_no(
            "Do you want the Underwater Outfits to only be available when you are underwater or if functionality is toggled off? (yes/no):",
        )?,
    };

    let shader_patch = match params.shader_patch {
        Some(answer) => answer,
        None => prompter
            .ask_yes_no("Do you want to add the ORFix shader compatibility patch? (yes/no):")?,
    };

    let shader_patch = if shader_patch {
        let modern_game_version = match params.modern_game_version {
            Some(answer) => answer,
            None => prompter
                .ask_yes_no("Are you playing on game version 4.0 or newer? (yes/no):")?,
        };
        ShaderPatch::Enabled {
            modern_game_version,
        }
    } else {
        ShaderPatch::Disabled
    };

    let outfits = OutfitConfiguration::new(
        toggle_key,
        swap_values,
        params.cycle_key,
        params.delay,
        underwater_only,
    )?;

    let plan = PatchPlan {
        outfits,
        detection: if global_detection {
            DetectionMode::Global
        } else {
            DetectionMode::Local
        },
        shader_patch,
    };
    debug!(?plan, "resolved parameters");

    Ok(ResolvedRun {
        plan,
        revert: params.revert,
    })
}
