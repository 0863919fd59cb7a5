//! Compliance risk scanning over query text and retrieved context.
//!
//! Pure scoring: a fixed indicator table is matched against the input,
//! weights are summed and capped, and the score maps onto a level
//! through fixed thresholds. No storage or network access, so the same
//! input always produces the same assessment.

pub mod indicators;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::rag::store::ScoredChunk;
use indicators::{IndicatorSpec, BUILTIN_INDICATORS};

/// Score at or above which an assessment is HIGH.
pub const HIGH_THRESHOLD: u8 = 70;
/// Score at or above which an assessment is MEDIUM.
pub const MEDIUM_THRESHOLD: u8 = 40;
/// Scores cap here regardless of how many indicators match.
pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        if score >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if score >= MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub risk_flags: Vec<String>,
}

struct CompiledIndicator {
    label: String,
    matcher: Regex,
    weight: u8,
}

pub struct RiskAnalyzer {
    indicators: Vec<CompiledIndicator>,
}

impl RiskAnalyzer {
    /// Compile an indicator table. Patterns match case-insensitively on
    /// word boundaries, so "cash" does not fire on "cashier".
    pub fn new(table: &[IndicatorSpec]) -> Result<Self, ApiError> {
        let mut indicators = Vec::with_capacity(table.len());
        for spec in table {
            let matcher = Regex::new(&format!(r"(?i)\b(?:{})\b", spec.pattern)).map_err(|e| {
                ApiError::Internal(format!(
                    "invalid risk indicator pattern for '{}': {}",
                    spec.label, e
                ))
            })?;
            indicators.push(CompiledIndicator {
                label: spec.label.to_string(),
                matcher,
                weight: spec.weight,
            });
        }
        Ok(Self { indicators })
    }

    /// The default analyzer over the builtin table.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_INDICATORS).expect("builtin risk indicator table compiles")
    }

    /// Score the query plus its retrieved context.
    ///
    /// Each indicator contributes its weight at most once, no matter how
    /// often or where it matches. Flags come out in table order.
    pub fn analyze(&self, query: &str, retrieved: &[ScoredChunk]) -> RiskAssessment {
        let mut haystack = String::with_capacity(
            query.len() + retrieved.iter().map(|c| c.record.content.len() + 1).sum::<usize>(),
        );
        haystack.push_str(query);
        for chunk in retrieved {
            haystack.push('\n');
            haystack.push_str(&chunk.record.content);
        }

        let mut score: u32 = 0;
        let mut flags = Vec::new();
        for indicator in &self.indicators {
            if indicator.matcher.is_match(&haystack) {
                score += indicator.weight as u32;
                flags.push(indicator.label.clone());
            }
        }

        let risk_score = score.min(MAX_SCORE as u32) as u8;
        RiskAssessment {
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            risk_flags: flags,
        }
    }
}
