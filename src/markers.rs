//! Section names, variables and fixed lines shared by the validator,
//! generator and applicator.

/// Section holding the merged mod's global variables.
pub const CONSTANTS_SECTION: &str = "Constants";

/// Key binding section that cycles `$swapvar`.
pub const KEYSWAP_SECTION: &str = "KeySwap";

/// Variant keys that stay usable while the underwater outfit is off.
pub const KEYSWAP_ALT_SECTION: &str = "KeySwap_Alt";

/// Per-frame logic section.
pub const PRESENT_SECTION: &str = "Present";

/// Variable selecting the visible variant.
pub const SWAPVAR_VARIABLE: &str = "$swapvar";

/// Key of the `[KeySwap]` line rewritten with [`KEYSWAP_CONDITION`].
pub const CONDITION_KEY: &str = "condition";

/// Normal variant switching only while dry and with the feature enabled.
pub const KEYSWAP_CONDITION: &str = "$active == 1 && $submerged == 0 && $underwaterOutfit == 1";

/// Comment line opening every generated block; its presence means the
/// file was already patched.
pub const GENERATED_MARKER: &str = ";autoUnderwaterOutfit";

/// Trailing provenance comment appended to each modified file.
pub const PROVENANCE_LINE: &str =
    "; .ini modified by underwater-patcher - adds autoUnderwaterOutfit swapping";

/// Outline/reflection fix command list for 4.0+ game builds.
pub const SHADER_FIX_LINE: &str = "run = CommandList\\global\\ORFix\\ORFix";

/// Comment headings a new section may be placed in front of, in order of
/// preference.
pub const SECTION_ANCHORS: [&str; 2] = ["; Shader", "; Overrides"];

/// Frames to wait after leaving the water before restoring the outfit.
pub const DEFAULT_DELAY_FRAMES: u32 = 480;

/// Upper bound on the number of underwater outfits in one run.
pub const MAX_OUTFITS: usize = 256;
