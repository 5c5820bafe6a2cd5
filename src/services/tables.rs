// src/services/tables.rs

//! Fixed text tables used by listing classification.
//!
//! Listing text is a frozen legacy format; these tables are data, matched
//! literally.

/// Exterior tag value, in wear order (index + 1 is the wear tier).
pub const WEARS: [&str; 5] = [
    "Factory New",
    "Minimal Wear",
    "Field-Tested",
    "Well-Worn",
    "Battle Scarred",
];

/// Name fragments preceding "Killstreak " by tier, highest first.
pub const KILLSTREAK_MARKERS: [(&str, u8); 3] = [
    ("Professional Killstreak ", 3),
    ("Specialized Killstreak ", 2),
    ("Killstreak ", 1),
];

pub const NOT_CRAFTABLE: &str = "( Not Usable in Crafting )";
pub const UNUSUAL_EFFECT_PREFIX: &str = "★ Unusual Effect: ";
pub const CASE_GLOBAL_EFFECT: &str = "Case Global Unusual Effect(s)";
pub const STRANGE_CLOCK: &str = "Strange Stat Clock Attached";
pub const PAINT_COLOR_PREFIX: &str = "Paint Color: ";
pub const PAINT_COLOR_CODE: &str = "756b5e";
pub const RECIPE_OUTPUTS: &str =
    "You will receive all of the following outputs once all of the inputs are fulfilled.";
pub const WIKI_ACTION: &str = "Item Wiki Page...";

/// Decorated weapon whose stock skin has no line of its own.
pub const STOCK_SKIN_WEAPON: &str = "Red Rock Roscoe Pistol";

/// Legacy painted item recognised by its icon only.
pub const LEGACY_PAINT_ICON: &str = "SLcfMQEs5nqWSMU5OD2NwHzHZdmi";
pub const LEGACY_PAINT_VALUE: u32 = 5801378;

/// Kit Fabricator output: (tier phrase, output defindex), indexed by tier - 1.
pub const FABRICATOR_OUTPUTS: [(&str, u32); 3] = [
    ("Killstreak", 6527),
    ("Specialized Killstreak", 6523),
    ("Professional Killstreak", 6526),
];
pub const STRANGIFIER_OUTPUT: u32 = 6522;

/// Basic Killstreak Kits: the generic kit plus the per-weapon ones.
pub const KILLSTREAK_KITS: [u32; 27] = [
    6527, // general
    5726, // Rocket Launcher
    5727, // Scattergun
    5728, // Sniper Rifle
    5729, // Shotgun
    5730, // Ubersaw
    5731, // GRU
    5732, // Spy-cicle
    5733, // Axtinguisher
    5743, // Sticky Launcher
    5744, // Minigun
    5745, // Direct Hit
    5746, // Huntsman
    5747, // Backburner
    5748, // Backscatter
    5749, // Kritzkrieg
    5750, // Ambassador
    5751, // Frontier Justice
    5793, // Flaregun
    5794, // Wrench
    5795, // Revolver
    5796, // Machina
    5797, // Baby Face Blaster
    5798, // Huo Long Heatmaker
    5799, // Loose Cannon
    5800, // Vaccinator
    5801, // Air Strike
];

/// Kits whose target is the name with fixed-width prefix/suffix trimmed:
/// (defindex, leading chars, trailing chars).
pub const NAME_TRIMMED_KITS: [(u32, usize, usize); 3] = [
    (6523, 22, 3), // "Specialized Killstreak <weapon> Kit"
    (6526, 23, 3), // "Professional Killstreak <weapon> Kit"
    (9258, 7, 12), // "Unusual <weapon> Unusualifier"
];
/// Leading/trailing chars trimmed from basic kit names ("Killstreak <weapon> Kit").
pub const BASIC_KIT_TRIM: (usize, usize) = (10, 3);

/// Supply crates whose series is only visible in the name.
pub const CRATE_SERIES: [(u32, &[(&str, u32)]); 4] = [
    (
        5022,
        &[
            ("Mann Co. Supply Crate Series #1", 1),
            ("Mann Co. Supply Crate Series #3", 3),
            ("Mann Co. Supply Crate Series #7", 7),
            ("Mann Co. Supply Crate Series #12", 12),
            ("Mann Co. Supply Crate Series #13", 13),
            ("Mann Co. Supply Crate Series #18", 18),
            ("Mann Co. Supply Crate Series #19", 19),
            ("Mann Co. Supply Crate Series #23", 23),
            ("Mann Co. Supply Crate Series #26", 26),
            ("Mann Co. Supply Crate Series #31", 31),
            ("Mann Co. Supply Crate Series #34", 34),
            ("Mann Co. Supply Crate Series #39", 39),
            ("Mann Co. Supply Crate Series #43", 43),
            ("Mann Co. Supply Crate Series #47", 47),
            ("Mann Co. Supply Crate Series #54", 54),
            ("Mann Co. Supply Crate Series #57", 57),
            ("Mann Co. Supply Crate Series #75", 75),
        ],
    ),
    (
        5041,
        &[
            ("Mann Co. Supply Crate Series #2", 2),
            ("Mann Co. Supply Crate Series #4", 4),
            ("Mann Co. Supply Crate Series #8", 8),
            ("Mann Co. Supply Crate Series #11", 11),
            ("Mann Co. Supply Crate Series #14", 14),
            ("Mann Co. Supply Crate Series #17", 17),
            ("Mann Co. Supply Crate Series #20", 20),
            ("Mann Co. Supply Crate Series #24", 24),
            ("Mann Co. Supply Crate Series #27", 27),
            ("Mann Co. Supply Crate Series #32", 32),
            ("Mann Co. Supply Crate Series #37", 37),
            ("Mann Co. Supply Crate Series #42", 42),
            ("Mann Co. Supply Crate Series #44", 44),
            ("Mann Co. Supply Crate Series #49", 49),
            ("Mann Co. Supply Crate Series #56", 56),
            ("Mann Co. Supply Crate Series #71", 71),
            ("Mann Co. Supply Crate Series #76", 76),
        ],
    ),
    (
        5045,
        &[
            ("Mann Co. Supply Crate Series #5", 5),
            ("Mann Co. Supply Crate Series #9", 9),
            ("Mann Co. Supply Crate Series #10", 10),
            ("Mann Co. Supply Crate Series #15", 15),
            ("Mann Co. Supply Crate Series #16", 16),
            ("Mann Co. Supply Crate Series #21", 21),
            ("Mann Co. Supply Crate Series #25", 25),
            ("Mann Co. Supply Crate Series #28", 28),
            ("Mann Co. Supply Crate Series #29", 29),
            ("Mann Co. Supply Crate Series #33", 33),
            ("Mann Co. Supply Crate Series #38", 38),
            ("Mann Co. Supply Crate Series #41", 41),
            ("Mann Co. Supply Crate Series #45", 45),
            ("Mann Co. Supply Crate Series #55", 55),
            ("Mann Co. Supply Crate Series #59", 59),
            ("Mann Co. Supply Crate Series #77", 77),
        ],
    ),
    (
        5068,
        &[
            ("Salvaged Mann Co. Supply Crate Series #30", 30),
            ("Salvaged Mann Co. Supply Crate Series #40", 40),
            ("Salvaged Mann Co. Supply Crate Series #50", 50),
        ],
    ),
];

/// Series number for a crate listed by exact name.
pub fn crate_series(defindex: u32, name: &str) -> Option<u32> {
    CRATE_SERIES
        .iter()
        .find(|(crate_defindex, _)| *crate_defindex == defindex)?
        .1
        .iter()
        .find(|(crate_name, _)| *crate_name == name)
        .map(|(_, series)| *series)
}
