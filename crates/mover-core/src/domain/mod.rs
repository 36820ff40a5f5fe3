//! 도메인 타입.

pub mod analysis;
pub mod market;
pub mod universe;

pub use analysis::{
    ChangeRecord, Cohort, CohortKind, CohortStats, RankedTable, RankedTableKind, SkipReason,
    SymbolOutcome,
};
pub use market::{Candle, Instrument, KlineInterval, TickerEntry};
pub use universe::{parse_exclusion_list, Lookback, UniverseSelection, Watchlist, MAX_LOOKBACK_HOURS};
