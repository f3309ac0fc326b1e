//! ROI calculator
//!
//! Compares manual lawyer review against automated analysis. All money is in
//! integer cents.

use serde::{Deserialize, Serialize};

/// Calculator inputs. Defaults are the figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiInputs {
    pub lawyers: u32,
    pub hours_per_lawyer: u32,
    pub hourly_rate_cents: u64,
    pub manual_turnaround: String,
    pub api_cost_cents: u64,
    pub automated_turnaround: String,
    pub documents_per_year: u32,
    pub productivity_gain_percent: u8,
}

impl Default for RoiInputs {
    fn default() -> Self {
        Self {
            lawyers: 2,
            hours_per_lawyer: 8,
            hourly_rate_cents: 50_000,
            manual_turnaround: "2 days".to_string(),
            api_cost_cents: 10,
            automated_turnaround: "30 seconds".to_string(),
            documents_per_year: 120,
            productivity_gain_percent: 82,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualReview {
    pub lawyers: u32,
    pub hours_per_lawyer: u32,
    pub hourly_rate_cents: u64,
    pub total_cents: u64,
    pub turnaround: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutomatedReview {
    pub api_cost_cents: u64,
    pub total_cents: u64,
    pub turnaround: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnualImpact {
    pub documents_per_year: u32,
    pub total_savings_cents: i64,
    pub hours_saved: u64,
    pub productivity_gain_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoiReport {
    pub manual: ManualReview,
    pub automated: AutomatedReview,
    /// Negative when automation costs more than manual review
    pub savings_per_document_cents: i64,
    /// Savings as a share of manual cost, in basis points (truncated)
    pub cost_reduction_bps: i64,
    pub annual: AnnualImpact,
}

impl RoiInputs {
    pub fn manual_hours_per_document(&self) -> u64 {
        u64::from(self.lawyers) * u64::from(self.hours_per_lawyer)
    }

    pub fn report(&self) -> RoiReport {
        let hours = self.manual_hours_per_document();
        let manual_total = hours.saturating_mul(self.hourly_rate_cents);
        let savings = clamp_i64(i128::from(manual_total) - i128::from(self.api_cost_cents));
        let cost_reduction_bps = if manual_total == 0 {
            0
        } else {
            clamp_i64(i128::from(savings) * 10_000 / i128::from(manual_total))
        };
        let docs = self.documents_per_year;

        RoiReport {
            manual: ManualReview {
                lawyers: self.lawyers,
                hours_per_lawyer: self.hours_per_lawyer,
                hourly_rate_cents: self.hourly_rate_cents,
                total_cents: manual_total,
                turnaround: self.manual_turnaround.clone(),
            },
            automated: AutomatedReview {
                api_cost_cents: self.api_cost_cents,
                total_cents: self.api_cost_cents,
                turnaround: self.automated_turnaround.clone(),
            },
            savings_per_document_cents: savings,
            cost_reduction_bps,
            annual: AnnualImpact {
                documents_per_year: docs,
                total_savings_cents: clamp_i64(i128::from(savings) * i128::from(docs)),
                hours_saved: hours.saturating_mul(u64::from(docs)),
                productivity_gain_percent: self.productivity_gain_percent,
            },
        }
    }
}

fn clamp_i64(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Format cents as dollars: `799990` -> `"$7,999.90"`, whole amounts drop
/// the cents: `800000` -> `"$8,000"`
pub fn format_usd(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let dollars = group_thousands(abs / 100);
    match abs % 100 {
        0 => format!("{}${}", sign, dollars),
        rem => format!("{}${}.{:02}", sign, dollars, rem),
    }
}

/// Format basis points as a percentage: `9999` -> `"99.99%"`
pub fn format_bps(bps: i64) -> String {
    let sign = if bps < 0 { "-" } else { "" };
    let abs = bps.unsigned_abs();
    format!("{}{}.{:02}%", sign, abs / 100, abs % 100)
}

pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
