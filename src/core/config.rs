//! Match configuration with documented constants
//!
//! Every tunable of the conquest rules lives here. Sections deserialize from
//! TOML with per-field defaults, so a config file only has to name what it
//! changes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::core::error::ConfigError;
use crate::core::types::{FactionId, Millis};
use crate::generals::{Tier, TierTable};

/// Army movement tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchTuning {
    /// Travel time of every unit, independent of distance
    pub travel_duration_ms: Millis,
    /// Delay after the last unit lands before the general is released
    pub release_buffer_ms: Millis,
    /// Spawn spacing between consecutive units of one order
    pub unit_stagger_ms: Millis,
    /// Opposing groups closer than this cancel each other (0 disables)
    pub capture_distance: f64,
    /// Maximum lateral lane offset of a unit (map units)
    pub lane_width: f64,
    /// Maximum mid-path bow of a unit's lane (map units)
    pub lane_bow: f64,
}

impl Default for DispatchTuning {
    fn default() -> Self {
        Self {
            travel_duration_ms: 2400,
            release_buffer_ms: 300,
            unit_stagger_ms: 30,
            capture_distance: 1.5,
            lane_width: 0.6,
            lane_bow: 0.8,
        }
    }
}

/// General hiring tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HiringTuning {
    pub hire_cost: f64,
    /// Probability that a paid hire produces a general
    pub success_chance: f64,
    /// Fraction of the cost returned when the hire falls through
    pub refund_fraction: f64,
    /// Share of draw mass per tier over the remaining pool
    pub tier_weights: TierTable<f64>,
    pub troop_caps: TierTable<u32>,
}

impl Default for HiringTuning {
    fn default() -> Self {
        Self {
            hire_cost: 300.0,
            success_chance: 0.65,
            refund_fraction: 0.5,
            tier_weights: TierTable { s: 6.0, a: 20.0, b: 34.0, c: 40.0 },
            troop_caps: TierTable { s: 300, a: 240, b: 180, c: 120 },
        }
    }
}

/// Passive income and market prices
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    pub tick_period_ms: Millis,
    /// Economy spent per unit of grain bought
    pub grain_price: f64,
    /// Economy spent per troop raised at the capital
    pub garrison_price: f64,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            tick_period_ms: 200,
            grain_price: 1.0,
            garrison_price: 4.0,
        }
    }
}

/// Neutral province defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NeutralTuning {
    pub default_garrison: f64,
    /// Garrison a neutral province regenerates toward
    pub default_target: f64,
    /// Troops regained per second while below target
    pub recover_rate: f64,
}

impl Default for NeutralTuning {
    fn default() -> Self {
        Self {
            default_garrison: 12.0,
            default_target: 20.0,
            recover_rate: 0.4,
        }
    }
}

/// Heuristic constants for the autonomous opponents
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    /// Run the autonomous opponents at all
    pub enabled: bool,
    pub tick_period_ms: Millis,

    // === ECONOMIC ACTION ===
    /// Grain stock below which the faction considers buying
    pub grain_low_threshold: u32,
    pub grain_buy_chance: f64,
    pub grain_buy_amount: u32,
    pub garrison_convert_chance: f64,
    /// Economy kept in reserve before converting into troops
    pub garrison_convert_reserve: f64,
    /// Economy spent per conversion
    pub garrison_convert_budget: f64,

    // === HIRING ===
    pub hire_chance: f64,
    /// Roster size above which hiring needs the override roll
    pub roster_soft_cap: usize,
    pub roster_override_chance: f64,

    // === ASSIGNMENT ===
    pub assign_chance: f64,
    /// Fraction of the station garrison a general is raised toward
    pub assign_fraction: f64,

    // === ATTACK ===
    pub attack_chance: f64,
    /// Station garrison a general needs before attacking from it
    pub attack_min_station: f64,
    /// Minimum score of the chosen attack
    pub attack_floor: f64,
    pub human_target_bonus: f64,
    pub neutral_target_bonus: f64,
    /// Half-width of the uniform score jitter
    pub jitter: f64,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_period_ms: 4600,
            grain_low_threshold: 120,
            grain_buy_chance: 0.6,
            grain_buy_amount: 100,
            garrison_convert_chance: 0.4,
            garrison_convert_reserve: 320.0,
            garrison_convert_budget: 120.0,
            hire_chance: 0.5,
            roster_soft_cap: 4,
            roster_override_chance: 0.08,
            assign_chance: 0.7,
            assign_fraction: 0.38,
            attack_chance: 0.55,
            attack_min_station: 65.0,
            attack_floor: 45.0,
            human_target_bonus: 25.0,
            neutral_target_bonus: 10.0,
            jitter: 8.0,
        }
    }
}

/// Procedural map used when no boundary dataset is supplied
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub cols: u32,
    pub rows: u32,
    pub cell: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self { cols: 9, rows: 6, cell: 10.0 }
    }
}

/// One hireable name in a faction's pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameEntry {
    pub name: String,
    pub tier: Tier,
}

/// Static description of one faction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionConfig {
    pub name: String,
    pub color: String,
    /// Province code of the capital; must be listed in `territory`
    pub capital: String,
    pub territory: Vec<String>,
    #[serde(default = "default_starting_garrison")]
    pub starting_garrison: f64,
    #[serde(default = "default_economy_multiplier")]
    pub economy_multiplier: f64,
    #[serde(default = "default_starting_economy")]
    pub starting_economy: f64,
    #[serde(default = "default_starting_grain")]
    pub starting_grain: u32,
    #[serde(default)]
    pub generals: Vec<NameEntry>,
}

fn default_starting_garrison() -> f64 {
    90.0
}

fn default_economy_multiplier() -> f64 {
    0.02
}

fn default_starting_economy() -> f64 {
    400.0
}

fn default_starting_grain() -> u32 {
    300
}

/// Per-province override applied after the territory table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvinceOverride {
    pub code: String,
    /// Faction name; omitted keeps the table's owner
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub garrison: Option<f64>,
    #[serde(default)]
    pub neutral_target: Option<f64>,
}

/// Complete match configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub seed: u64,
    /// Name of the human-controlled faction; `None` runs all factions as AI
    pub player: Option<String>,
    pub map: MapConfig,
    pub dispatch: DispatchTuning,
    pub hiring: HiringTuning,
    pub economy: EconomyTuning,
    pub neutral: NeutralTuning,
    pub ai: AiTuning,
    pub factions: Vec<FactionConfig>,
    pub province_overrides: Vec<ProvinceOverride>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            player: Some("Qin".to_string()),
            map: MapConfig::default(),
            dispatch: DispatchTuning::default(),
            hiring: HiringTuning::default(),
            economy: EconomyTuning::default(),
            neutral: NeutralTuning::default(),
            ai: AiTuning::default(),
            factions: warring_states(),
            province_overrides: Vec::new(),
        }
    }
}

impl MatchConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Resolve the player faction name to its id
    pub fn player_faction(&self) -> Option<FactionId> {
        let name = self.player.as_deref()?;
        self.faction_by_name(name)
    }

    pub fn faction_by_name(&self, name: &str) -> Option<FactionId> {
        self.factions
            .iter()
            .position(|f| f.name == name)
            .map(|i| FactionId(i as u8))
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.factions.is_empty() {
            return invalid("at least one faction is required".into());
        }
        if self.factions.len() > u8::MAX as usize {
            return invalid(format!("too many factions ({})", self.factions.len()));
        }
        if let Some(player) = &self.player {
            if self.faction_by_name(player).is_none() {
                return invalid(format!("player faction {player} is not defined"));
            }
        }

        for (label, p) in [
            ("hiring.success_chance", self.hiring.success_chance),
            ("hiring.refund_fraction", self.hiring.refund_fraction),
            ("ai.grain_buy_chance", self.ai.grain_buy_chance),
            ("ai.garrison_convert_chance", self.ai.garrison_convert_chance),
            ("ai.hire_chance", self.ai.hire_chance),
            ("ai.roster_override_chance", self.ai.roster_override_chance),
            ("ai.assign_chance", self.ai.assign_chance),
            ("ai.assign_fraction", self.ai.assign_fraction),
            ("ai.attack_chance", self.ai.attack_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{label} ({p}) must be within [0, 1]"));
            }
        }

        if self.economy.tick_period_ms == 0 || self.ai.tick_period_ms == 0 {
            return invalid("tick periods must be positive".into());
        }
        if self.dispatch.travel_duration_ms == 0 {
            return invalid("dispatch.travel_duration_ms must be positive".into());
        }
        if self.dispatch.capture_distance < 0.0 {
            return invalid("dispatch.capture_distance must not be negative".into());
        }

        let weights = &self.hiring.tier_weights;
        if Tier::ALL.iter().any(|&t| weights.get(t) < 0.0) {
            return invalid("hiring.tier_weights must not be negative".into());
        }
        if Tier::ALL.iter().all(|&t| weights.get(t) == 0.0) {
            return invalid("hiring.tier_weights must not all be zero".into());
        }
        if self.economy.grain_price <= 0.0 || self.economy.garrison_price <= 0.0 {
            return invalid("market prices must be positive".into());
        }

        let mut claimed: HashMap<&str, &str> = HashMap::new();
        for faction in &self.factions {
            if !faction.territory.contains(&faction.capital) {
                return invalid(format!(
                    "capital {} of {} is not in its territory",
                    faction.capital, faction.name
                ));
            }
            for code in &faction.territory {
                if let Some(first) = claimed.insert(code.as_str(), faction.name.as_str()) {
                    return Err(ConfigError::DoubleClaim {
                        code: code.clone(),
                        first: first.to_string(),
                        second: faction.name.clone(),
                    });
                }
            }
        }

        for o in &self.province_overrides {
            if let Some(owner) = &o.owner {
                if self.faction_by_name(owner).is_none() {
                    return invalid(format!("override of {} names unknown faction {owner}", o.code));
                }
            }
        }

        Ok(())
    }
}

fn pool(entries: &[(&str, Tier)]) -> Vec<NameEntry> {
    entries
        .iter()
        .map(|&(name, tier)| NameEntry { name: name.to_string(), tier })
        .collect()
}

fn faction(name: &str, color: &str, capital: &str, territory: &[&str], generals: Vec<NameEntry>) -> FactionConfig {
    FactionConfig {
        name: name.to_string(),
        color: color.to_string(),
        capital: capital.to_string(),
        territory: territory.iter().map(|c| c.to_string()).collect(),
        starting_garrison: default_starting_garrison(),
        economy_multiplier: default_economy_multiplier(),
        starting_economy: default_starting_economy(),
        starting_grain: default_starting_grain(),
        generals,
    }
}

/// The seven states laid out over the default 9x6 grid map
fn warring_states() -> Vec<FactionConfig> {
    use Tier::{A, B, C, S};

    vec![
        faction(
            "Qin",
            "#1f1f1f",
            "0301",
            &["0201", "0300", "0301", "0400"],
            pool(&[
                ("Bai Qi", S),
                ("Wang Jian", S),
                ("Meng Tian", A),
                ("Wang Ben", A),
                ("Meng Ao", B),
                ("Huan Yi", B),
                ("Li Xin", C),
                ("Yang Duanhe", C),
            ]),
        ),
        faction(
            "Chu",
            "#8b1a1a",
            "0505",
            &["0405", "0504", "0505", "0506"],
            pool(&[
                ("Xiang Yan", S),
                ("Jing She", A),
                ("Zhuang Qiao", A),
                ("Huang Xie", B),
                ("Tang Mei", B),
                ("Jing Que", C),
                ("Qu Gai", C),
            ]),
        ),
        faction(
            "Qi",
            "#2e6f9e",
            "0408",
            &["0308", "0407", "0408"],
            pool(&[
                ("Sun Bin", S),
                ("Tian Dan", S),
                ("Tian Ji", A),
                ("Kuang Zhang", A),
                ("Chu Zi", B),
                ("Tian Jia", C),
                ("Shou Zi", C),
            ]),
        ),
        faction(
            "Yan",
            "#4a7a3a",
            "0008",
            &["0007", "0008", "0108"],
            pool(&[
                ("Yue Yi", S),
                ("Ju Xin", A),
                ("Qin Kai", B),
                ("Jie Ni", B),
                ("Li Fu", C),
                ("Song Yi", C),
            ]),
        ),
        faction(
            "Zhao",
            "#c47f17",
            "0005",
            &["0004", "0005", "0104"],
            pool(&[
                ("Li Mu", S),
                ("Lian Po", S),
                ("Zhao She", A),
                ("Sima Shang", B),
                ("Pang Nuan", B),
                ("Hu Zhe", C),
                ("Zhao Kuo", C),
            ]),
        ),
        faction(
            "Wei",
            "#6b3fa0",
            "0204",
            &["0203", "0204", "0303"],
            pool(&[
                ("Wu Qi", S),
                ("Pang Juan", A),
                ("Xinling Jun", A),
                ("Ximen Bao", B),
                ("Jin Bi", B),
                ("Gongsun Xi", C),
            ]),
        ),
        faction(
            "Han",
            "#2f8f8f",
            "0403",
            &["0402", "0403", "0502"],
            pool(&[
                ("Bao Yuan", A),
                ("Shen Buhai", A),
                ("Zhang Ping", B),
                ("Han Nian", B),
                ("Ji Hu", C),
                ("Han Ju", C),
            ]),
        ),
    ]
}
