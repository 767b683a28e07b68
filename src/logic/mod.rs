pub mod calculations;
pub mod category;
pub mod coefficients;
pub mod context;
pub mod effectiveness;
pub mod selection;
pub mod soil;
pub mod use_case;

pub use coefficients::CoefficientTable;
pub use context::RuleContext;
pub use effectiveness::{Effectiveness, EffectivenessResult, UnknownReason};
pub use selection::ParcelOption;
pub use soil::map_registry_soil;
pub use use_case::UseCase;
