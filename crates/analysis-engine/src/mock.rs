//! The fixed analysis record every pipeline run yields
//!
//! Uploaded content is never inspected, so every document "extracts" to the
//! same Apex Manufacturing credit agreement.

use shared_types::{
    AnalysisResult, ComplianceScores, Covenant, CovenantStatus, RiskFinding, RiskSeverity,
};

pub const SAMPLE_BORROWER: &str = "Apex Manufacturing Ltd.";

/// Build the canned extraction result
pub fn sample_analysis() -> AnalysisResult {
    AnalysisResult {
        borrower: SAMPLE_BORROWER.to_string(),
        loan_amount: "$500,000,000".to_string(),
        interest_rate: "SOFR + 325 bps".to_string(),
        maturity: "December 15, 2029".to_string(),
        leverage: "5.5x EBITDA".to_string(),
        covenants: vec![
            covenant("Leverage Ratio", "5.5x", CovenantStatus::HighRisk, "4.0x market avg"),
            covenant(
                "Interest Coverage",
                "3.0x",
                CovenantStatus::MediumRisk,
                "3.5x market avg",
            ),
            covenant("Minimum Liquidity", "$25M", CovenantStatus::LowRisk, "$20M market avg"),
        ],
        risks: vec![
            risk(
                RiskSeverity::High,
                "Leverage covenant exceeds market standard by 37.5%",
            ),
            risk(
                RiskSeverity::Medium,
                "Missing LMA standard guarantor provisions in Section 9",
            ),
            risk(
                RiskSeverity::Low,
                "Prepayment terms favor borrower more than typical",
            ),
        ],
        compliance: ComplianceScores {
            lma_standard: 78,
            regulatory_compliance: 92,
        },
    }
}

fn covenant(name: &str, value: &str, status: CovenantStatus, benchmark: &str) -> Covenant {
    Covenant {
        name: name.to_string(),
        value: value.to_string(),
        status,
        benchmark: benchmark.to_string(),
    }
}

fn risk(severity: RiskSeverity, finding: &str) -> RiskFinding {
    RiskFinding {
        severity,
        finding: finding.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_analysis_is_fully_populated() {
        let result = sample_analysis();
        assert_eq!(result.borrower, SAMPLE_BORROWER);
        assert_eq!(result.covenants.len(), 3);
        assert_eq!(result.risks.len(), 3);
        assert!(result.compliance.lma_standard <= 100);
        assert!(result.compliance.regulatory_compliance <= 100);
    }

    #[test]
    fn test_covenants_ordered_by_descending_risk() {
        let statuses: Vec<_> = sample_analysis()
            .covenants
            .iter()
            .map(|c| c.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                CovenantStatus::HighRisk,
                CovenantStatus::MediumRisk,
                CovenantStatus::LowRisk
            ]
        );
    }
}
