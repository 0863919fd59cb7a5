//! Builtin compliance risk indicator table.
//!
//! Static policy data: each row is a human-readable flag label, a
//! case-insensitive whole-word/phrase pattern, and a point weight.
//! Table order is the order flags are reported in.

/// One indicator row before regex compilation.
pub struct IndicatorSpec {
    pub label: &'static str,
    pub pattern: &'static str,
    pub weight: u8,
}

pub const HIGH_RISK_WEIGHT: u8 = 15;
pub const MEDIUM_RISK_WEIGHT: u8 = 8;
pub const JURISDICTION_WEIGHT: u8 = 10;

pub const BUILTIN_INDICATORS: &[IndicatorSpec] = &[
    // Primary AML/CFT indicators
    IndicatorSpec {
        label: "Sanctions reference",
        pattern: "sanctions?|sanctioned",
        weight: HIGH_RISK_WEIGHT,
    },
    IndicatorSpec {
        label: "Terrorism financing",
        pattern: "terrorism|terrorists?|terror financing",
        weight: HIGH_RISK_WEIGHT,
    },
    IndicatorSpec {
        label: "Fraud",
        pattern: "fraud|fraudulent",
        weight: HIGH_RISK_WEIGHT,
    },
    IndicatorSpec {
        label: "Money laundering",
        pattern: "money laundering|laundering",
        weight: HIGH_RISK_WEIGHT,
    },
    IndicatorSpec {
        label: "Shell company",
        pattern: "shell compan(?:y|ies)|shell corporations?",
        weight: HIGH_RISK_WEIGHT,
    },
    IndicatorSpec {
        label: "Offshore structure",
        pattern: "offshore",
        weight: HIGH_RISK_WEIGHT,
    },
    IndicatorSpec {
        label: "Politically exposed person",
        pattern: "peps?|politically exposed",
        weight: HIGH_RISK_WEIGHT,
    },
    IndicatorSpec {
        label: "Blacklist or watchlist",
        pattern: "blacklist(?:ed)?|watchlist(?:ed)?",
        weight: HIGH_RISK_WEIGHT,
    },
    // Secondary typology indicators
    IndicatorSpec {
        label: "Cash intensity",
        pattern: "cash",
        weight: MEDIUM_RISK_WEIGHT,
    },
    IndicatorSpec {
        label: "Virtual assets",
        pattern: "cryptocurrenc(?:y|ies)|bitcoin|virtual assets?",
        weight: MEDIUM_RISK_WEIGHT,
    },
    IndicatorSpec {
        label: "Anonymity",
        pattern: "anonymous|anonymity",
        weight: MEDIUM_RISK_WEIGHT,
    },
    IndicatorSpec {
        label: "Bearer instruments",
        pattern: "bearer (?:shares?|bonds?|instruments?)",
        weight: MEDIUM_RISK_WEIGHT,
    },
    IndicatorSpec {
        label: "Structuring or smurfing",
        pattern: "structuring|smurfing",
        weight: MEDIUM_RISK_WEIGHT,
    },
    IndicatorSpec {
        label: "Layering or placement",
        pattern: "layering|placement",
        weight: MEDIUM_RISK_WEIGHT,
    },
    // Sanctioned / high-risk jurisdictions
    IndicatorSpec {
        label: "High-risk jurisdiction: Afghanistan",
        pattern: "afghanistan",
        weight: JURISDICTION_WEIGHT,
    },
    IndicatorSpec {
        label: "High-risk jurisdiction: Iran",
        pattern: "iran",
        weight: JURISDICTION_WEIGHT,
    },
    IndicatorSpec {
        label: "High-risk jurisdiction: North Korea",
        pattern: "north korea",
        weight: JURISDICTION_WEIGHT,
    },
    IndicatorSpec {
        label: "High-risk jurisdiction: Syria",
        pattern: "syria",
        weight: JURISDICTION_WEIGHT,
    },
    IndicatorSpec {
        label: "High-risk jurisdiction: Yemen",
        pattern: "yemen",
        weight: JURISDICTION_WEIGHT,
    },
    IndicatorSpec {
        label: "High-risk jurisdiction: Myanmar",
        pattern: "myanmar",
        weight: JURISDICTION_WEIGHT,
    },
    IndicatorSpec {
        label: "High-risk jurisdiction: Cuba",
        pattern: "cuba",
        weight: JURISDICTION_WEIGHT,
    },
    IndicatorSpec {
        label: "High-risk jurisdiction: Sudan",
        pattern: "sudan",
        weight: JURISDICTION_WEIGHT,
    },
    IndicatorSpec {
        label: "High-risk jurisdiction: Venezuela",
        pattern: "venezuela",
        weight: JURISDICTION_WEIGHT,
    },
];
