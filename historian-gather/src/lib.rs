mod gatherer;
mod settings;

pub use gatherer::Gatherer;
pub use settings::{HistorizingNodeSettings, HistorizingUpdateStrategy, ValueReader};
