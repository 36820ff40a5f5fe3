//! 코호트 집계.
//!
//! 심볼별 변동률을 코호트로 묶어 통계와 순위 테이블을 만들고,
//! 요청했지만 결과가 없는 심볼을 ignored로 분리합니다.
//!
//! 스케줄러 결과는 순서가 보장되지 않으므로, 모든 코호트는 먼저 유니버스 순서로
//! 재정렬한 뒤 안정 정렬로 순위를 매깁니다. 같은 변동률은 유니버스 순서를 따릅니다.

use std::collections::{HashMap, HashSet};

use mover_core::{
    ChangeRecord, Cohort, CohortKind, CohortStats, RankedTable, RankedTableKind, Watchlist,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::change::round_percent;

/// 순위 테이블 크기. 코호트가 이보다 크면 상승/하락 두 테이블로 나눕니다.
pub const TABLE_SIZE: usize = 10;

// =============================================================================
// 통계
// =============================================================================

/// 산술 평균 (빈 입력은 0).
pub fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

/// 중앙값 (짝수 개는 가운데 두 값의 평균, 빈 입력은 0).
pub fn median(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let mut sorted = values.to_vec();
    sorted.sort();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / Decimal::TWO
    } else {
        sorted[mid]
    }
}

/// 코호트 통계. 평균과 중앙값은 소수 둘째 자리로 반올림합니다.
pub fn cohort_stats(records: &[ChangeRecord]) -> CohortStats {
    let values: Vec<Decimal> = records.iter().map(|r| r.change_percent).collect();

    CohortStats {
        mean: round_percent(mean(&values)),
        median: round_percent(median(&values)),
        gainer_count: values.iter().filter(|v| **v > Decimal::ZERO).count(),
        loser_count: values.iter().filter(|v| **v < Decimal::ZERO).count(),
    }
}

// =============================================================================
// 순위
// =============================================================================

/// 순위 테이블 생성.
///
/// 10개 이하면 전체 내림차순 1개, 초과하면 상위 10개(내림차순)와
/// 하위 10개(오름차순, 가장 큰 하락부터) 2개.
pub fn rank(records: &[ChangeRecord]) -> Vec<RankedTable> {
    let mut descending = records.to_vec();
    descending.sort_by(|a, b| b.change_percent.cmp(&a.change_percent));

    if records.len() <= TABLE_SIZE {
        return vec![RankedTable {
            kind: RankedTableKind::Performance,
            rows: descending,
        }];
    }

    let mut ascending = records.to_vec();
    ascending.sort_by(|a, b| a.change_percent.cmp(&b.change_percent));

    vec![
        RankedTable {
            kind: RankedTableKind::Gainers,
            rows: descending.into_iter().take(TABLE_SIZE).collect(),
        },
        RankedTable {
            kind: RankedTableKind::Losers,
            rows: ascending.into_iter().take(TABLE_SIZE).collect(),
        },
    ]
}

/// 레코드를 유니버스 순서로 재정렬하고, 결과가 없는 심볼을 분리합니다.
fn partition_by_universe(
    universe: &[String],
    records: &[ChangeRecord],
) -> (Vec<ChangeRecord>, Vec<String>) {
    let by_symbol: HashMap<&str, &ChangeRecord> =
        records.iter().map(|r| (r.symbol.as_str(), r)).collect();
    let mut seen = HashSet::new();

    let mut priced = Vec::new();
    let mut ignored = Vec::new();
    for symbol in universe {
        if !seen.insert(symbol.as_str()) {
            continue;
        }
        match by_symbol.get(symbol.as_str()) {
            Some(record) => priced.push((*record).clone()),
            None => ignored.push(symbol.clone()),
        }
    }
    (priced, ignored)
}

// =============================================================================
// 코호트 구성
// =============================================================================

/// 시장 코호트 입력.
#[derive(Debug, Clone, Copy)]
pub struct MarketCohortInput<'a> {
    /// 분석 요청 심볼 (제외 필터 적용 후 주요 종목 추가)
    pub requested: &'a [String],
    /// 제외 심볼 루트
    pub excluded_roots: &'a [String],
    /// 주요 종목 심볼
    pub majors: &'a [String],
    /// 결제 통화 (루트 계산용)
    pub quote_coin: &'a str,
    /// 타임프레임 라벨
    pub timeframe: &'a str,
}

fn symbol_root<'a>(symbol: &'a str, quote_coin: &str) -> &'a str {
    symbol.strip_suffix(quote_coin).unwrap_or(symbol)
}

/// 전체 시장 코호트.
///
/// 제외 루트에 해당하는 레코드(강제로 포함된 주요 종목)는 분석됨으로 취급되어
/// ignored에 들어가지 않지만, 통계와 순위 테이블에서는 빠집니다.
pub fn build_market_cohort(input: &MarketCohortInput<'_>, records: &[ChangeRecord]) -> Cohort {
    let (priced, ignored_symbols) = partition_by_universe(input.requested, records);

    let excluded: HashSet<&str> = input.excluded_roots.iter().map(String::as_str).collect();
    let members: Vec<ChangeRecord> = priced
        .iter()
        .filter(|r| !excluded.contains(symbol_root(&r.symbol, input.quote_coin)))
        .cloned()
        .collect();

    let major_movers: Vec<ChangeRecord> = input
        .majors
        .iter()
        .filter_map(|m| priced.iter().find(|r| &r.symbol == m).cloned())
        .collect();

    debug!(
        requested = input.requested.len(),
        priced = priced.len(),
        members = members.len(),
        ignored = ignored_symbols.len(),
        "시장 코호트 집계"
    );

    Cohort {
        kind: CohortKind::Market,
        label: CohortKind::Market.label().to_string(),
        timeframe: input.timeframe.to_string(),
        tables: rank(&members),
        stats: cohort_stats(&members),
        members,
        ignored_symbols,
        major_movers,
    }
}

fn build_side_cohort(
    kind: CohortKind,
    keys: &[String],
    records: &[ChangeRecord],
    timeframe: &str,
) -> Cohort {
    let (members, ignored_symbols) = partition_by_universe(keys, records);

    Cohort {
        kind,
        label: kind.label().to_string(),
        timeframe: timeframe.to_string(),
        tables: rank(&members),
        stats: cohort_stats(&members),
        members,
        ignored_symbols,
        major_movers: Vec::new(),
    }
}

/// 관심종목 코호트 (항상 long, short 순서로 2개).
///
/// 한쪽 목록이 없으면 빈 코호트가 됩니다.
/// 같은 심볼이 long과 short 양쪽에 있으면 두 코호트 모두에 나타납니다.
pub fn build_watchlist_cohorts(
    watchlist: &Watchlist,
    records: &[ChangeRecord],
    timeframe: &str,
) -> Vec<Cohort> {
    vec![
        build_side_cohort(
            CohortKind::LongWatchlist,
            watchlist.long_symbols(),
            records,
            timeframe,
        ),
        build_side_cohort(
            CohortKind::ShortWatchlist,
            watchlist.short_symbols(),
            records,
            timeframe,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn rec(symbol: &str, change: Decimal) -> ChangeRecord {
        ChangeRecord::new(symbol, change)
    }

    fn symbols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn row_symbols(table: &RankedTable) -> Vec<&str> {
        table.rows.iter().map(|r| r.symbol.as_str()).collect()
    }

    #[test]
    fn median_values() {
        assert_eq!(median(&[dec!(1), dec!(2), dec!(3)]), dec!(2));
        assert_eq!(median(&[dec!(4), dec!(1), dec!(3), dec!(2)]), dec!(2.5));
        assert_eq!(median(&[]), Decimal::ZERO);
    }

    #[test]
    fn mean_values() {
        assert_eq!(mean(&[dec!(1), dec!(2), dec!(6)]), dec!(3));
        assert_eq!(mean(&[]), Decimal::ZERO);
    }

    #[test]
    fn stats_counts_ignore_zero() {
        let records = vec![
            rec("A", dec!(2.5)),
            rec("B", dec!(0)),
            rec("C", dec!(-1.25)),
            rec("D", dec!(4)),
        ];
        let stats = cohort_stats(&records);
        assert_eq!(stats.gainer_count, 2);
        assert_eq!(stats.loser_count, 1);
        assert_eq!(stats.mean, dec!(1.31));
        assert_eq!(stats.median, dec!(1.25));

        assert_eq!(cohort_stats(&[]), CohortStats::default());
    }

    #[test]
    fn small_cohort_single_table_with_stable_ties() {
        let records = vec![rec("A", dec!(1)), rec("B", dec!(3)), rec("C", dec!(1))];
        let tables = rank(&records);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].kind, RankedTableKind::Performance);
        assert_eq!(row_symbols(&tables[0]), vec!["B", "A", "C"]);
    }

    #[test]
    fn large_cohort_split_into_gainers_and_losers() {
        let records: Vec<_> = (0..15)
            .map(|i| rec(&format!("S{i}"), Decimal::from(i) - dec!(7)))
            .collect();
        let tables = rank(&records);
        assert_eq!(tables.len(), 2);

        let gainers = &tables[0];
        assert_eq!(gainers.kind, RankedTableKind::Gainers);
        assert_eq!(gainers.rows.len(), TABLE_SIZE);
        assert_eq!(gainers.rows[0].symbol, "S14");

        let losers = &tables[1];
        assert_eq!(losers.kind, RankedTableKind::Losers);
        assert_eq!(losers.rows.len(), TABLE_SIZE);
        assert_eq!(losers.rows[0].symbol, "S0");
        assert_eq!(losers.rows[0].change_percent, dec!(-7));
    }

    #[test]
    fn market_cohort_excludes_majors_from_stats() {
        let requested = symbols(&["AUSDT", "BUSDT", "CUSDT", "BTCUSDT", "ETHUSDT"]);
        let excluded = symbols(&["BTC", "ETH", "SOL"]);
        let majors = symbols(&["BTCUSDT", "ETHUSDT", "SOLUSDT"]);
        let input = MarketCohortInput {
            requested: &requested,
            excluded_roots: &excluded,
            majors: &majors,
            quote_coin: "USDT",
            timeframe: "4 Hours",
        };

        // 스케줄러 결과는 순서가 섞여 있음
        let records = vec![
            rec("ETHUSDT", dec!(-1)),
            rec("CUSDT", dec!(5)),
            rec("BTCUSDT", dec!(2)),
            rec("AUSDT", dec!(3)),
        ];
        let cohort = build_market_cohort(&input, &records);

        let member_symbols: Vec<_> = cohort.members.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(member_symbols, vec!["AUSDT", "CUSDT"]);
        assert_eq!(cohort.ignored_symbols, vec!["BUSDT"]);
        assert_eq!(cohort.stats.mean, dec!(4));
        assert_eq!(cohort.stats.gainer_count, 2);

        let majors: Vec<_> = cohort.major_movers.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(majors, vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(row_symbols(&cohort.tables[0]), vec!["CUSDT", "AUSDT"]);
        assert_eq!(cohort.timeframe, "4 Hours");
    }

    #[test]
    fn watchlist_cohorts_share_records() {
        let watchlist = Watchlist::new(
            Some(symbols(&["AUSDT", "BUSDT"])),
            Some(symbols(&["BUSDT", "CUSDT"])),
        )
        .unwrap();
        let records = vec![rec("BUSDT", dec!(-2)), rec("AUSDT", dec!(1))];

        let cohorts = build_watchlist_cohorts(&watchlist, &records, "1 Day");
        assert_eq!(cohorts.len(), 2);

        let long = &cohorts[0];
        assert_eq!(long.kind, CohortKind::LongWatchlist);
        assert_eq!(long.members.len(), 2);
        assert!(long.ignored_symbols.is_empty());
        assert!(long.major_movers.is_empty());

        let short = &cohorts[1];
        assert_eq!(short.kind, CohortKind::ShortWatchlist);
        assert_eq!(short.members, vec![rec("BUSDT", dec!(-2))]);
        assert_eq!(short.ignored_symbols, vec!["CUSDT"]);
    }

    #[test]
    fn watchlist_missing_side_yields_empty_cohort() {
        let watchlist = Watchlist::new(None, Some(symbols(&["XUSDT"]))).unwrap();
        let cohorts = build_watchlist_cohorts(&watchlist, &[], "30 Minutes");
        assert_eq!(cohorts.len(), 2);

        let long = &cohorts[0];
        assert_eq!(long.kind, CohortKind::LongWatchlist);
        assert!(long.members.is_empty());
        assert!(long.ignored_symbols.is_empty());
        assert_eq!(long.stats, CohortStats::default());
        assert_eq!(long.tables.len(), 1);
        assert!(long.tables[0].rows.is_empty());

        assert_eq!(cohorts[1].kind, CohortKind::ShortWatchlist);
        assert_eq!(cohorts[1].ignored_symbols, vec!["XUSDT"]);
    }
}
