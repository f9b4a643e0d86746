use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How entry prices are spread between the lower and upper bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    /// Constant arithmetic step between levels
    #[default]
    Linear,
    /// Constant ratio between levels
    Geometric,
}

impl std::fmt::Display for Spacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Spacing::Linear => write!(f, "linear"),
            Spacing::Geometric => write!(f, "geometric"),
        }
    }
}

impl std::str::FromStr for Spacing {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" | "arithmetic" => Ok(Spacing::Linear),
            "geometric" => Ok(Spacing::Geometric),
            other => Err(format!("unknown spacing mode: {}", other)),
        }
    }
}

/// How the capital allocation is split across levels
///
/// Serialized as `"equal"` or `{"weights": [..]}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Every level gets `total / levels`
    #[default]
    Equal,
    /// One positive weight per level, normalized to sum to 1
    Weights(Vec<Decimal>),
}

/// Parameters for a grid of buy entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    pub symbol: String,
    pub lower_price: Decimal,
    pub upper_price: Decimal,
    pub levels: u32,
    pub total_usdc: Decimal,
    #[serde(default)]
    pub spacing: Spacing,
    #[serde(default)]
    pub weighting: Weighting,
}

impl GridParams {
    /// Equal-weight linear grid
    pub fn new(
        symbol: impl Into<String>,
        lower_price: Decimal,
        upper_price: Decimal,
        levels: u32,
        total_usdc: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            lower_price,
            upper_price,
            levels,
            total_usdc,
            spacing: Spacing::default(),
            weighting: Weighting::default(),
        }
    }

    pub fn with_spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_weights(mut self, weights: Vec<Decimal>) -> Self {
        self.weighting = Weighting::Weights(weights);
        self
    }
}

/// One level of a grid plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedLevel {
    /// Zero-based index, ascending with price
    pub level: u32,
    pub entry_price: Decimal,
    pub qty: Decimal,
    pub spent_usdc: Decimal,
}

/// Ordered output of the grid planner
///
/// Transient: consumed once by the ledger, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridPlan {
    pub symbol: String,
    pub levels: Vec<PlannedLevel>,
}

impl GridPlan {
    /// Sum of every level's spend
    pub fn total_spend(&self) -> Decimal {
        self.levels.iter().map(|l| l.spent_usdc).sum()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
