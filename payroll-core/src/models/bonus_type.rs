use serde::{Deserialize, Serialize};

/// Contract bonus categories, each with its own flat withholding rate
/// per year (see `BonusTaxRate`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusType {
    Signing,
    ImageRights,
    Loyalty,
    Accommodation,
    CarAllowance,
    Transfer,
}

impl BonusType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signing => "SIGNING",
            Self::ImageRights => "IMAGE_RIGHTS",
            Self::Loyalty => "LOYALTY",
            Self::Accommodation => "ACCOMMODATION",
            Self::CarAllowance => "CAR_ALLOWANCE",
            Self::Transfer => "TRANSFER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SIGNING" => Some(Self::Signing),
            "IMAGE_RIGHTS" => Some(Self::ImageRights),
            "LOYALTY" => Some(Self::Loyalty),
            "ACCOMMODATION" => Some(Self::Accommodation),
            "CAR_ALLOWANCE" => Some(Self::CarAllowance),
            "TRANSFER" => Some(Self::Transfer),
            _ => None,
        }
    }

    pub fn all() -> [Self; 6] {
        [
            Self::Signing,
            Self::ImageRights,
            Self::Loyalty,
            Self::Accommodation,
            Self::CarAllowance,
            Self::Transfer,
        ]
    }
}
