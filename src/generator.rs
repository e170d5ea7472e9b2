//! Text of the underwater outfit feature.
//!
//! The generated logic is a three-state machine kept in mod variables:
//! idle, submerged (outfit swapped) and delayed-restore (back on land,
//! counting `$delay` up to `$delayInFrames` before the stored variant is
//! put back). This module only emits that text; nothing here evaluates it.

use crate::config::schema::{DetectionMode, OutfitConfiguration};
use crate::ini::KeySwapParameters;
use crate::markers::{GENERATED_MARKER, KEYSWAP_ALT_SECTION, SWAPVAR_VARIABLE};

/// Lines for `[Constants]` and for `[Present]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedBlocks {
    pub constants: Vec<String>,
    pub present: Vec<String>,
}

struct Block(Vec<String>);

impl Block {
    fn new() -> Self {
        Block(Vec::new())
    }

    fn line(&mut self, line: impl Into<String>) -> &mut Self {
        self.0.push(line.into());
        self
    }

    fn lines(&mut self, lines: &[&str]) -> &mut Self {
        self.0.extend(lines.iter().map(|line| line.to_string()));
        self
    }

    /// `name = value`, skipped when the value is empty.
    fn binding(&mut self, name: &str, value: &str) -> &mut Self {
        if !value.trim().is_empty() {
            self.0.push(format!("{} = {}", name, value.trim()));
        }
        self
    }

    fn blank(&mut self, count: usize) -> &mut Self {
        self.0.extend(std::iter::repeat(String::new()).take(count));
        self
    }
}

pub fn generate(
    config: &OutfitConfiguration,
    keyswap: &KeySwapParameters,
    mode: DetectionMode,
) -> GeneratedBlocks {
    GeneratedBlocks {
        constants: constants_block(config, keyswap, mode),
        present: present_block(config, mode),
    }
}

fn constants_block(
    config: &OutfitConfiguration,
    keyswap: &KeySwapParameters,
    mode: DetectionMode,
) -> Vec<String> {
    let submerged_start = match mode {
        DetectionMode::Local => "global persist $submerged_start = 0",
        // Overwritten from the global mod every frame
        DetectionMode::Global => "global persist $submerged_start",
    };

    let mut block = Block::new();
    block
        .line(GENERATED_MARKER)
        .lines(&[
            "global persist $underwaterOutfit = 0",
            "global persist $underwaterOutfitSelect = 0",
            "global persist $submerged = 0",
            submerged_start,
            "global persist $swapvar_set = 0",
            "global persist $previousSwapvar = 0",
        ])
        .line(format!("global $delayInFrames = {}", config.delay_frames()))
        .line("global $delay = 0")
        .blank(3)
        .lines(&[
            ";Underwater Outfit On/Off",
            "[KeyUnderwaterOutfit]",
            "condition = $active == 1",
        ])
        .line(format!("key = {}", config.toggle_key()))
        .lines(&["type = cycle", "$underwaterOutfit = 0,1"])
        .blank(1);

    if config.outfit_count() > 1 {
        let cycle_key = config.cycle_key().unwrap_or(keyswap.key());
        block
            .lines(&[
                ";Underwater Outfit Cycle",
                "[KeyUnderwaterOutfitSelect]",
                "condition = $active == 1 && $submerged == 1",
            ])
            .binding("key", cycle_key)
            .binding("back", keyswap.back())
            .binding("type", keyswap.swap_type())
            .line(format!("$underwaterOutfitSelect = {}", config.select_values()))
            .blank(1);
    }

    block
        .line(";Key for switching variants when Underwater Outfit is ON")
        .line(format!("[{}]", KEYSWAP_ALT_SECTION))
        .line("condition = $active == 1 && $submerged == 0 && $underwaterOutfit == 0")
        .binding("key", keyswap.key())
        .binding("back", keyswap.back())
        .binding("type", keyswap.swap_type())
        .line(format!("{} = {}", SWAPVAR_VARIABLE, keyswap.swap_values()))
        .blank(1);

    block.0
}

fn present_block(config: &OutfitConfiguration, mode: DetectionMode) -> Vec<String> {
    let mut block = Block::new();
    block.line(GENERATED_MARKER);

    match mode {
        DetectionMode::Local => {
            block.line("post $submerged_start = 0");
        }
        DetectionMode::Global => {
            block.lines(&[
                "if $active == 1",
                "$submerged_start = $\\global\\submerged\\submerged_start",
                "endif",
            ]);
        }
    }

    // idle -> submerged: remember the worn variant once per dive
    block
        .blank(1)
        .lines(&[
            ";autoUnderwater store outfit",
            "if $underwaterOutfit == 0",
            "    if $submerged_start == 1 && $submerged == 0 && $swapvar_set == 0",
        ])
        .line(format!("        $previousSwapvar = {}", SWAPVAR_VARIABLE))
        .lines(&[
            "        $swapvar_set = 1",
            "        $submerged = 1",
            "",
            "    else if $submerged_start == 1 && $submerged == 0 && $swapvar_set == 1",
            "        $delay = 0",
            "    endif",
            "",
            "    ;autoUnderwater change outfit",
            "    if $submerged == 1",
        ]);

    for (index, value) in config.swap_values().iter().enumerate() {
        let keyword = if index == 0 { "if" } else { "elif" };
        block
            .line(format!(
                "        {} $underwaterOutfitSelect == {}",
                keyword, index
            ))
            .line(format!("            {} = {}", SWAPVAR_VARIABLE, value));
    }

    // submerged -> delayed-restore -> idle
    block
        .lines(&[
            "        endif",
            "    endif",
            "",
            "    ;autoUnderwater reset",
            "    if $submerged_start == 0",
            "        $submerged = 0",
            "    endif",
            "",
            "    if $submerged_start == 0 && $swapvar_set == 1",
            "        $delay = $delay+1",
            "",
            "    ;autoUnderwater restore outfit",
            "        if $submerged_start == 0 && $swapvar_set == 1 && $delay >= $delayInFrames",
        ])
        .line(format!("            {} = $previousSwapvar", SWAPVAR_VARIABLE))
        .lines(&[
            "            $swapvar_set = 0",
            "            $delay = 0",
            "        endif",
            "    endif",
            "endif",
            "",
            "if $delay > $delayInFrames",
            "    $delay = 0",
            "endif",
        ])
        .blank(3);

    if mode == DetectionMode::Local {
        water_detection_sections(&mut block);
    }

    block.0
}

/// Overrides that raise `$submerged_start` while the swim UI or the
/// underwater censor shader is on screen.
fn water_detection_sections(block: &mut Block) {
    block
        .lines(&[
            GENERATED_MARKER,
            "[TextureOverrideSwimIcon]",
            "hash = 45cbdd97",
            "match_priority = 99",
            "$submerged_start = 1",
            "",
        ])
        .lines(&[
            GENERATED_MARKER,
            "[TextureOverrideSwimDownIcon]",
            "hash = 46d6aa04",
            "match_priority = 99",
            "$submerged_start = 1",
            "",
        ])
        .lines(&[
            GENERATED_MARKER,
            "[ShaderOverrideWaterCensor3]",
            "hash = 2ff98a686aae5e81",
            "allow_duplicate_hash = true",
            "if ps-t1 == 45",
            "    $submerged_start = 1",
            "endif",
            "",
        ])
        .lines(&[
            GENERATED_MARKER,
            "[TextureOverrideWaterCensor3]",
            "hash = 7c897a3a",
            "match_priority = 99",
            "filter_index = 45",
        ])
        .blank(3);
}
