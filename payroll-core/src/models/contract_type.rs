use serde::{Deserialize, Serialize};

/// Contract categories recognised by the Italian football contribution
/// tables. Each category carries its own INPS/FFC/INAIL/solidarity rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractType {
    Professional,
    Apprenticeship,
    Amateur,
    Youth,
}

impl ContractType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Professional => "PROFESSIONAL",
            Self::Apprenticeship => "APPRENTICESHIP",
            Self::Amateur => "AMATEUR",
            Self::Youth => "YOUTH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROFESSIONAL" => Some(Self::Professional),
            "APPRENTICESHIP" => Some(Self::Apprenticeship),
            "AMATEUR" => Some(Self::Amateur),
            "YOUTH" => Some(Self::Youth),
            _ => None,
        }
    }

    /// All contract types, in the order they appear in the rate tables.
    pub fn all() -> [Self; 4] {
        [
            Self::Professional,
            Self::Apprenticeship,
            Self::Amateur,
            Self::Youth,
        ]
    }
}
