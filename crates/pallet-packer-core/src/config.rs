use crate::model::PalletSpec;
use crate::special::SpecialLayout;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Upper bound on `candidate_supply`; keeps a single request's work bounded.
pub const MAX_CANDIDATE_SUPPLY: u32 = 100_000;

/// Mixed-orientation heuristic families.
/// Key notes:
///   - `family` selects the packer used for the mixed-orientation candidate
///   - `Auto` runs a small portfolio and keeps the highest placement count
///   - `time_budget_ms` and `parallel` affect Auto portfolio evaluation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmFamily {
    /// Skyline data structure (BL/MW; fast). Optional waste-map recovery.
    Skyline,
    /// MaxRects free-list (best quality on identical boxes).
    MaxRects,
    /// Guillotine splitting (choice + split rule).
    Guillotine,
    /// Try a small portfolio of candidates and keep the one that places the most cartons.
    Auto,
}

impl FromStr for AlgorithmFamily {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skyline" => Ok(Self::Skyline),
            "maxrects" => Ok(Self::MaxRects),
            "guillotine" => Ok(Self::Guillotine),
            "auto" => Ok(Self::Auto),
            _ => Err(()),
        }
    }
}

/// MaxRects placement heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaxRectsHeuristic {
    BestAreaFit,
    BestShortSideFit,
    BestLongSideFit,
    BottomLeft,
    ContactPoint,
}

impl MaxRectsHeuristic {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::BestAreaFit => "baf",
            Self::BestShortSideFit => "bssf",
            Self::BestLongSideFit => "blsf",
            Self::BottomLeft => "bl",
            Self::ContactPoint => "cp",
        }
    }
}

impl FromStr for MaxRectsHeuristic {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baf" | "bestareafit" => Ok(Self::BestAreaFit),
            "bssf" | "bestshortsidefit" => Ok(Self::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(Self::BestLongSideFit),
            "bl" | "bottomleft" => Ok(Self::BottomLeft),
            "cp" | "contactpoint" => Ok(Self::ContactPoint),
            _ => Err(()),
        }
    }
}

/// Skyline placement heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SkylineHeuristic {
    BottomLeft,
    MinWaste,
}

impl SkylineHeuristic {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::BottomLeft => "bl",
            Self::MinWaste => "minwaste",
        }
    }
}

impl FromStr for SkylineHeuristic {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bl" | "bottomleft" => Ok(Self::BottomLeft),
            "minwaste" | "mw" => Ok(Self::MinWaste),
            _ => Err(()),
        }
    }
}

/// Guillotine free-rect choice heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuillotineChoice {
    BestAreaFit,
    BestShortSideFit,
    BestLongSideFit,
    WorstAreaFit,
    WorstShortSideFit,
    WorstLongSideFit,
}

impl GuillotineChoice {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::BestAreaFit => "baf",
            Self::BestShortSideFit => "bssf",
            Self::BestLongSideFit => "blsf",
            Self::WorstAreaFit => "waf",
            Self::WorstShortSideFit => "wssf",
            Self::WorstLongSideFit => "wlsf",
        }
    }
}

impl FromStr for GuillotineChoice {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "baf" | "bestareafit" => Ok(Self::BestAreaFit),
            "bssf" | "bestshortsidefit" => Ok(Self::BestShortSideFit),
            "blsf" | "bestlongsidefit" => Ok(Self::BestLongSideFit),
            "waf" | "worstareafit" => Ok(Self::WorstAreaFit),
            "wssf" | "worstshortsidefit" => Ok(Self::WorstShortSideFit),
            "wlsf" | "worstlongsidefit" => Ok(Self::WorstLongSideFit),
            _ => Err(()),
        }
    }
}

/// Guillotine split axis heuristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuillotineSplit {
    SplitShorterLeftoverAxis,
    SplitLongerLeftoverAxis,
    SplitMinimizeArea,
    SplitMaximizeArea,
    SplitShorterAxis,
    SplitLongerAxis,
}

impl GuillotineSplit {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::SplitShorterLeftoverAxis => "slas",
            Self::SplitLongerLeftoverAxis => "llas",
            Self::SplitMinimizeArea => "minas",
            Self::SplitMaximizeArea => "maxas",
            Self::SplitShorterAxis => "sas",
            Self::SplitLongerAxis => "las",
        }
    }
}

impl FromStr for GuillotineSplit {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slas" | "splitshorterleftoveraxis" => Ok(Self::SplitShorterLeftoverAxis),
            "llas" | "splitlongerleftoveraxis" => Ok(Self::SplitLongerLeftoverAxis),
            "minas" | "splitminimizearea" => Ok(Self::SplitMinimizeArea),
            "maxas" | "splitmaximizearea" => Ok(Self::SplitMaximizeArea),
            "sas" | "splitshorteraxis" => Ok(Self::SplitShorterAxis),
            "las" | "splitlongeraxis" => Ok(Self::SplitLongerAxis),
            _ => Err(()),
        }
    }
}

/// Auto presets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AutoMode {
    Fast,
    Quality,
}

impl FromStr for AutoMode {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "quality" => Ok(Self::Quality),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackerConfig {
    /// Pallet footprint and base block.
    #[serde(default)]
    pub pallet: PalletSpec,
    /// Let the mixed heuristic turn candidates 90° when beneficial.
    #[serde(default = "default_allow_rotation")]
    pub allow_rotation: bool,
    /// Candidates supplied to the mixed heuristic, per orientation.
    #[serde(default = "default_candidate_supply")]
    pub candidate_supply: u32,

    // algorithm selection
    #[serde(default = "default_family")]
    pub family: AlgorithmFamily,
    #[serde(default = "default_mr_heuristic")]
    pub mr_heuristic: MaxRectsHeuristic,
    #[serde(default = "default_skyline_heuristic")]
    pub skyline_heuristic: SkylineHeuristic,
    /// Use waste map in Skyline to recover gaps
    #[serde(default)]
    pub use_waste_map: bool,
    #[serde(default = "default_g_choice")]
    pub g_choice: GuillotineChoice,
    #[serde(default = "default_g_split")]
    pub g_split: GuillotineSplit,
    #[serde(default = "default_auto_mode")]
    pub auto_mode: AutoMode,

    // portfolio/parallel controls
    /// Optional time budget for auto portfolio (milliseconds). None or 0 disables.
    #[serde(default)]
    pub time_budget_ms: Option<u64>,
    /// Enable parallel candidate evaluation when feature "parallel" is on.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    // special layouts
    /// Consult the built-in hand-tuned layouts.
    #[serde(default = "default_builtin_special")]
    pub builtin_special_layouts: bool,
    /// Extra hand-tuned layouts; checked before the built-in table.
    #[serde(default)]
    pub special_layouts: Vec<SpecialLayout>,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            pallet: PalletSpec::default(),
            allow_rotation: default_allow_rotation(),
            candidate_supply: default_candidate_supply(),
            family: default_family(),
            mr_heuristic: default_mr_heuristic(),
            skyline_heuristic: default_skyline_heuristic(),
            use_waste_map: false,
            g_choice: default_g_choice(),
            g_split: default_g_split(),
            auto_mode: default_auto_mode(),
            time_budget_ms: None,
            parallel: default_parallel(),
            builtin_special_layouts: default_builtin_special(),
            special_layouts: Vec::new(),
        }
    }
}

impl PackerConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Pallet dimensions are zero, or the footprint area exceeds `u32::MAX`
    /// - The candidate supply is zero or above [`MAX_CANDIDATE_SUPPLY`]
    /// - A configured special layout is malformed for its pallet or carton
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::PalletError;

        // per-layer counts are u32
        if self.pallet.length == 0 || self.pallet.width == 0 || self.pallet.area() > u32::MAX as u64 {
            return Err(PalletError::InvalidDimensions {
                length: self.pallet.length,
                width: self.pallet.width,
            });
        }

        if self.candidate_supply == 0 {
            return Err(PalletError::InvalidConfig(
                "candidate_supply must be >= 1".into(),
            ));
        }
        if self.candidate_supply > MAX_CANDIDATE_SUPPLY {
            return Err(PalletError::InvalidConfig(format!(
                "candidate_supply ({}) exceeds the limit of {}",
                self.candidate_supply, MAX_CANDIDATE_SUPPLY
            )));
        }

        for layout in &self.special_layouts {
            layout.validate()?;
        }

        Ok(())
    }
}

fn default_allow_rotation() -> bool {
    true
}
fn default_candidate_supply() -> u32 {
    1000
}
fn default_family() -> AlgorithmFamily {
    AlgorithmFamily::Auto
}
fn default_mr_heuristic() -> MaxRectsHeuristic {
    MaxRectsHeuristic::BestShortSideFit
}
fn default_skyline_heuristic() -> SkylineHeuristic {
    SkylineHeuristic::BottomLeft
}
fn default_g_choice() -> GuillotineChoice {
    GuillotineChoice::BestAreaFit
}
fn default_g_split() -> GuillotineSplit {
    GuillotineSplit::SplitShorterLeftoverAxis
}
fn default_auto_mode() -> AutoMode {
    AutoMode::Quality
}
fn default_parallel() -> bool {
    false
}
fn default_builtin_special() -> bool {
    true
}

/// Builder for `PackerConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct PackerConfigBuilder {
    cfg: PackerConfig,
}

impl PackerConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: PackerConfig::default(),
        }
    }
    pub fn with_pallet(mut self, length: u32, width: u32) -> Self {
        self.cfg.pallet.length = length;
        self.cfg.pallet.width = width;
        self
    }
    pub fn base_height(mut self, v: u32) -> Self {
        self.cfg.pallet.base_height = v;
        self
    }
    pub fn allow_rotation(mut self, v: bool) -> Self {
        self.cfg.allow_rotation = v;
        self
    }
    pub fn candidate_supply(mut self, v: u32) -> Self {
        self.cfg.candidate_supply = v;
        self
    }
    pub fn family(mut self, v: AlgorithmFamily) -> Self {
        self.cfg.family = v;
        self
    }
    pub fn mr_heuristic(mut self, v: MaxRectsHeuristic) -> Self {
        self.cfg.mr_heuristic = v;
        self
    }
    pub fn skyline_heuristic(mut self, v: SkylineHeuristic) -> Self {
        self.cfg.skyline_heuristic = v;
        self
    }
    pub fn use_waste_map(mut self, v: bool) -> Self {
        self.cfg.use_waste_map = v;
        self
    }
    pub fn g_choice(mut self, v: GuillotineChoice) -> Self {
        self.cfg.g_choice = v;
        self
    }
    pub fn g_split(mut self, v: GuillotineSplit) -> Self {
        self.cfg.g_split = v;
        self
    }
    pub fn auto_mode(mut self, v: AutoMode) -> Self {
        self.cfg.auto_mode = v;
        self
    }
    pub fn time_budget_ms(mut self, v: Option<u64>) -> Self {
        self.cfg.time_budget_ms = v;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn builtin_special_layouts(mut self, v: bool) -> Self {
        self.cfg.builtin_special_layouts = v;
        self
    }
    pub fn special_layout(mut self, v: SpecialLayout) -> Self {
        self.cfg.special_layouts.push(v);
        self
    }
    pub fn build(self) -> PackerConfig {
        self.cfg
    }
}

impl PackerConfig {
    /// Create a fluent builder for `PackerConfig`.
    pub fn builder() -> PackerConfigBuilder {
        PackerConfigBuilder::new()
    }
}
