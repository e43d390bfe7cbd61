//! Threat-weighted security budget allocation.

use serde::{Deserialize, Serialize};

/// Prevented loss assumed when the threat feed reports no impact.
pub const DEFAULT_PREVENTED_LOSS: f64 = 8_500_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threat {
    pub threat_id: String,
    #[serde(rename = "type")]
    pub threat_type: String,
    pub severity: String,
    pub cost_impact: f64,
    pub source: String,
    pub affected_assets: Vec<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThreatLandscape {
    pub credential_threats: bool,
    pub ransomware: bool,
    pub web_threats: bool,
    pub total_impact: f64,
}

impl ThreatLandscape {
    pub fn from_threats(threats: &[Threat]) -> Self {
        Self {
            credential_threats: threats.iter().any(|t| t.threat_type.contains("credential")),
            ransomware: threats.iter().any(|t| t.threat_type == "ransomware"),
            web_threats: threats
                .iter()
                .any(|t| t.affected_assets.iter().any(|asset| asset == "web")),
            total_impact: threats.iter().map(|t| t.cost_impact).sum(),
        }
    }

    fn prevented_loss(&self) -> f64 {
        if self.total_impact > 0.0 {
            self.total_impact
        } else {
            DEFAULT_PREVENTED_LOSS
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    Mfa,
    Waf,
    Patching,
    BackupRecovery,
    ZeroTrust,
}

impl Control {
    pub fn label(self) -> &'static str {
        match self {
            Control::Mfa => "MFA",
            Control::Waf => "WAF",
            Control::Patching => "Patching",
            Control::BackupRecovery => "Backup & Recovery",
            Control::ZeroTrust => "Zero Trust",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub control: Control,
    pub amount: f64,
    pub justification: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetPlan {
    pub budget: f64,
    pub allocations: Vec<Allocation>,
    pub total: f64,
    pub roi: f64,
    pub risk_reduction: f64,
    pub cost_avoidance: f64,
}

impl BudgetPlan {
    pub fn amount(&self, control: Control) -> f64 {
        self.allocations
            .iter()
            .find(|a| a.control == control)
            .map_or(0.0, |a| a.amount)
    }
}

pub fn optimize_budget(budget: f64, landscape: &ThreatLandscape) -> BudgetPlan {
    let budget = budget.max(0.0);
    let share = |fraction: f64, cap: f64| (budget * fraction).min(cap);

    let mut allocations = vec![
        Allocation {
            control: Control::Mfa,
            amount: share(if landscape.credential_threats { 0.45 } else { 0.25 }, 150_000.0),
            justification: if landscape.credential_threats {
                "Increased due to credential stuffing attacks"
            } else {
                "Standard protection"
            },
        },
        Allocation {
            control: Control::Waf,
            amount: share(if landscape.web_threats { 0.35 } else { 0.20 }, 120_000.0),
            justification: if landscape.web_threats {
                "Boosted for web application threats"
            } else {
                "Basic web protection"
            },
        },
        Allocation {
            control: Control::Patching,
            amount: share(0.15, 50_000.0),
            justification: "Critical for vulnerability management",
        },
        Allocation {
            control: Control::BackupRecovery,
            amount: share(if landscape.ransomware { 0.25 } else { 0.15 }, 80_000.0),
            justification: if landscape.ransomware {
                "Enhanced due to ransomware threats"
            } else {
                "Standard backup"
            },
        },
        Allocation {
            control: Control::ZeroTrust,
            amount: share(0.20, 100_000.0),
            justification: "Future-proofing security architecture",
        },
    ];

    let allocated: f64 = allocations.iter().map(|a| a.amount).sum();
    if allocated > budget {
        scale_to_budget(&mut allocations, budget / allocated, budget.floor());
    }

    let total: f64 = allocations.iter().map(|a| a.amount).sum();
    let prevented_loss = landscape.prevented_loss();
    let roi = if total > 0.0 {
        (prevented_loss - total) / total
    } else {
        0.0
    };

    BudgetPlan {
        budget,
        allocations,
        total,
        roi,
        risk_reduction: (total / 300_000.0 * 0.7 + 0.15).min(0.85),
        cost_avoidance: prevented_loss * 0.8,
    }
}

/// Scales every allocation and rounds to whole units without exceeding
/// `target`: floors first, then hands the leftover units to the largest
/// remainders.
fn scale_to_budget(allocations: &mut [Allocation], scale: f64, target: f64) {
    let scaled: Vec<f64> = allocations.iter().map(|a| a.amount * scale).collect();
    for (allocation, amount) in allocations.iter_mut().zip(&scaled) {
        allocation.amount = amount.floor();
    }

    let floored: f64 = allocations.iter().map(|a| a.amount).sum();
    let leftover = (target - floored).max(0.0).round() as usize;

    let mut by_remainder: Vec<usize> = (0..scaled.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let rem = |i: usize| scaled[i] - scaled[i].floor();
        rem(b).total_cmp(&rem(a))
    });
    for &index in by_remainder.iter().take(leftover) {
        allocations[index].amount += 1.0;
    }
}

/// Demo threat feed used when no live threat data is available.
pub fn demo_threats() -> Vec<Threat> {
    let threat = |id: &str, kind: &str, severity: &str, impact: f64, source: &str, assets: &[&str], confidence: f64| Threat {
        threat_id: id.to_string(),
        threat_type: kind.to_string(),
        severity: severity.to_string(),
        cost_impact: impact,
        source: source.to_string(),
        affected_assets: assets.iter().map(|a| a.to_string()).collect(),
        confidence,
    };

    vec![
        threat("T001", "credential_stuffing", "critical", 3_200_000.0, "Darkweb intelligence", &["user_accounts", "admin_portals"], 0.95),
        threat("T002", "ransomware", "high", 2_800_000.0, "Threat hunting", &["file_servers", "databases"], 0.87),
        threat("T003", "supply_chain", "high", 1_500_000.0, "Third-party monitoring", &["dependencies", "vendor_access"], 0.78),
        threat("T004", "data_exfiltration", "medium", 950_000.0, "DLP alerts", &["customer_data", "intellectual_property"], 0.82),
        threat("T005", "insider_threat", "medium", 750_000.0, "Behavioral analytics", &["sensitive_documents", "financial_data"], 0.73),
    ]
}
