//! Static dashboard figures
//!
//! Data behind the dashboard's stat tiles and charts. Nothing here is
//! computed from a document.

use serde::Serialize;
use shared_types::ComplianceScores;

/// Scores at or above this are shown as compliant
pub const COMPLIANT_THRESHOLD: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreStatus {
    Compliant,
    NeedsReview,
}

impl ScoreStatus {
    pub fn for_score(score: u8) -> Self {
        if score >= COMPLIANT_THRESHOLD {
            ScoreStatus::Compliant
        } else {
            ScoreStatus::NeedsReview
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreStatus::Compliant => "COMPLIANT",
            ScoreStatus::NeedsReview => "NEEDS REVIEW",
        }
    }
}

/// Badge status for each compliance score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComplianceBadges {
    pub lma_standard: ScoreStatus,
    pub regulatory_compliance: ScoreStatus,
}

impl From<&ComplianceScores> for ComplianceBadges {
    fn from(scores: &ComplianceScores) -> Self {
        Self {
            lma_standard: ScoreStatus::for_score(scores.lma_standard),
            regulatory_compliance: ScoreStatus::for_score(scores.regulatory_compliance),
        }
    }
}

/// A headline stat tile, e.g. "$2.3M Cost Savings"
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeadlineStat {
    pub label: &'static str,
    pub value: f64,
    pub prefix: &'static str,
    pub suffix: &'static str,
    pub decimals: u8,
}

impl HeadlineStat {
    pub fn display(&self) -> String {
        format!(
            "{}{:.*}{}",
            self.prefix,
            usize::from(self.decimals),
            self.value,
            self.suffix
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub name: &'static str,
    pub value: f64,
}

pub const HEADLINE_STATS: &[HeadlineStat] = &[
    HeadlineStat {
        label: "Time Saved",
        value: 82.0,
        prefix: "",
        suffix: "%",
        decimals: 0,
    },
    HeadlineStat {
        label: "Documents Analyzed",
        value: 1247.0,
        prefix: "",
        suffix: "",
        decimals: 0,
    },
    HeadlineStat {
        label: "Risk Flags",
        value: 2891.0,
        prefix: "",
        suffix: "",
        decimals: 0,
    },
    HeadlineStat {
        label: "Cost Savings",
        value: 2.3,
        prefix: "$",
        suffix: "M",
        decimals: 1,
    },
];

/// Share of covenants per risk bucket across the portfolio, in percent
pub const RISK_DISTRIBUTION: &[ChartPoint] = &[
    ChartPoint {
        name: "Low Risk",
        value: 45.0,
    },
    ChartPoint {
        name: "Medium Risk",
        value: 35.0,
    },
    ChartPoint {
        name: "High Risk",
        value: 20.0,
    },
];

/// Leverage multiple of this deal against the market
pub const LEVERAGE_COMPARISON: &[ChartPoint] = &[
    ChartPoint {
        name: "Your Deal",
        value: 5.5,
    },
    ChartPoint {
        name: "Market Avg",
        value: 4.0,
    },
    ChartPoint {
        name: "Peer Group",
        value: 4.3,
    },
];

pub const LEVERAGE_TREND: &[ChartPoint] = &[
    ChartPoint {
        name: "Jan",
        value: 4.2,
    },
    ChartPoint {
        name: "Feb",
        value: 4.5,
    },
    ChartPoint {
        name: "Mar",
        value: 4.8,
    },
    ChartPoint {
        name: "Apr",
        value: 5.1,
    },
    ChartPoint {
        name: "May",
        value: 5.3,
    },
    ChartPoint {
        name: "Jun",
        value: 5.5,
    },
];

/// Everything the dashboard charts need, in one payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardInsights {
    pub headline_stats: &'static [HeadlineStat],
    pub risk_distribution: &'static [ChartPoint],
    pub leverage_comparison: &'static [ChartPoint],
    pub leverage_trend: &'static [ChartPoint],
}

pub fn dashboard_insights() -> DashboardInsights {
    DashboardInsights {
        headline_stats: HEADLINE_STATS,
        risk_distribution: RISK_DISTRIBUTION,
        leverage_comparison: LEVERAGE_COMPARISON,
        leverage_trend: LEVERAGE_TREND,
    }
}
