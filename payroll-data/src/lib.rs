pub mod loaders;

pub use loaders::{
    BonusTaxRateLoader, BonusTaxRateRecord, ContributionRateLoader, ContributionRateRecord,
    IrpefBracketLoader, IrpefBracketRecord, LoaderError,
};
