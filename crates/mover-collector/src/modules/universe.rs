//! 분석 대상 심볼 선택.

use std::collections::HashSet;

use mover_core::{Instrument, UniverseSelection};

/// 심볼 루트 (예: BTCUSDT → BTC).
fn symbol_root<'a>(symbol: &'a str, quote_coin: &str) -> &'a str {
    symbol.strip_suffix(quote_coin).unwrap_or(symbol)
}

/// 전체 시장 유니버스.
///
/// 카탈로그에서 제외 루트에 해당하는 심볼을 빼고,
/// 빠져 있는 주요 종목을 뒤에 추가합니다.
pub fn select_market_symbols(
    instruments: &[Instrument],
    excluded_roots: &[String],
    majors: &[String],
    quote_coin: &str,
) -> Vec<String> {
    let excluded: HashSet<&str> = excluded_roots.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    let mut symbols: Vec<String> = instruments
        .iter()
        .map(|i| i.symbol.as_str())
        .filter(|s| !excluded.contains(symbol_root(s, quote_coin)))
        .filter(|s| seen.insert(*s))
        .map(str::to_string)
        .collect();

    for major in majors {
        if !symbols.contains(major) {
            symbols.push(major.clone());
        }
    }
    symbols
}

/// 선택 방식에 따른 조회 유니버스.
pub fn resolve_universe(
    selection: &UniverseSelection,
    instruments: &[Instrument],
    majors: &[String],
    quote_coin: &str,
) -> Vec<String> {
    match selection {
        UniverseSelection::Market { excluded_roots } => {
            select_market_symbols(instruments, excluded_roots, majors, quote_coin)
        }
        UniverseSelection::Watchlist(watchlist) => watchlist.union_symbols(),
    }
}

#[cfg(test)]
mod tests {
    use mover_core::Watchlist;
    use rust_decimal::Decimal;

    use super::*;

    fn instruments(symbols: &[&str]) -> Vec<Instrument> {
        symbols
            .iter()
            .map(|s| Instrument {
                symbol: s.to_string(),
                launch_time: 0,
                tick_size: Decimal::new(1, 2),
            })
            .collect()
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn market_excludes_roots_and_appends_majors() {
        let catalog = instruments(&["BTCUSDT", "AUSDT", "USDCUSDT", "ETHUSDT", "BUSDT"]);
        let symbols = select_market_symbols(
            &catalog,
            &strings(&["BTC", "ETH", "USDC", "SOL"]),
            &strings(&["BTCUSDT", "ETHUSDT", "SOLUSDT"]),
            "USDT",
        );
        assert_eq!(symbols, vec!["AUSDT", "BUSDT", "BTCUSDT", "ETHUSDT", "SOLUSDT"]);
    }

    #[test]
    fn majors_not_duplicated_when_not_excluded() {
        let catalog = instruments(&["BTCUSDT", "AUSDT"]);
        let symbols = select_market_symbols(&catalog, &[], &strings(&["BTCUSDT"]), "USDT");
        assert_eq!(symbols, vec!["BTCUSDT", "AUSDT"]);
    }

    #[test]
    fn watchlist_uses_union() {
        let watchlist = Watchlist::new(
            Some(strings(&["AUSDT", "BUSDT"])),
            Some(strings(&["BUSDT", "CUSDT"])),
        )
        .unwrap();
        let symbols = resolve_universe(
            &UniverseSelection::Watchlist(watchlist),
            &instruments(&["ZUSDT"]),
            &strings(&["BTCUSDT"]),
            "USDT",
        );
        assert_eq!(symbols, vec!["AUSDT", "BUSDT", "CUSDT"]);
    }
}
