//! 분석 결과 출력 (텍스트 / JSON).

use std::fmt::Write as _;

use clap::ValueEnum;
use mover_core::{ChangeRecord, Cohort, Instrument};
use rust_decimal::Decimal;

use crate::modules::{AnalysisReport, ChartSeries};
use crate::Result;

/// 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// 사람이 읽는 표
    #[default]
    Text,
    /// JSON
    Json,
}

/// 부호가 붙은 퍼센트 (예: `+5.34%`, `-0.40%`).
fn signed_percent(value: Decimal) -> String {
    let sign = if value > Decimal::ZERO { "+" } else { "" };
    format!("{sign}{value:.2}%")
}

fn display_symbol<'a>(symbol: &'a str, quote_coin: &str) -> &'a str {
    symbol.strip_suffix(quote_coin).unwrap_or(symbol)
}

fn write_rows(out: &mut String, rows: &[ChangeRecord]) {
    for (idx, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {:<16} {:>10}",
            idx + 1,
            row.symbol,
            signed_percent(row.change_percent)
        );
    }
}

fn write_cohort(out: &mut String, cohort: &Cohort, quote_coin: &str) {
    let _ = writeln!(out, "=== {} ===", cohort.label);
    let _ = writeln!(
        out,
        "Timeframe: {} | Symbols: {}",
        cohort.timeframe,
        cohort.members.len()
    );
    let _ = writeln!(
        out,
        "Average: {}  Median: {}  Gainers: {}  Losers: {}",
        signed_percent(cohort.stats.mean),
        signed_percent(cohort.stats.median),
        cohort.stats.gainer_count,
        cohort.stats.loser_count
    );

    if !cohort.major_movers.is_empty() {
        let majors: Vec<String> = cohort
            .major_movers
            .iter()
            .map(|m| {
                format!(
                    "{} {}",
                    display_symbol(&m.symbol, quote_coin),
                    signed_percent(m.change_percent)
                )
            })
            .collect();
        let _ = writeln!(out, "Majors: {}", majors.join("  "));
    }

    for table in &cohort.tables {
        let _ = writeln!(out, "--- {} ---", table.kind.title());
        write_rows(out, &table.rows);
    }

    if !cohort.ignored_symbols.is_empty() {
        let _ = writeln!(
            out,
            "Ignored ({}): {}",
            cohort.ignored_symbols.len(),
            cohort.ignored_symbols.join(", ")
        );
    }
}

/// 분석 결과 출력 문자열.
pub fn render_report(
    report: &AnalysisReport,
    format: OutputFormat,
    quote_coin: &str,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => {
            let mut out = String::new();
            for (idx, cohort) in report.cohorts.iter().enumerate() {
                if idx > 0 {
                    out.push('\n');
                }
                write_cohort(&mut out, cohort, quote_coin);
            }
            Ok(out)
        }
    }
}

/// 차트 시계열 출력 문자열.
pub fn render_chart(series: &ChartSeries, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(series)?),
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(
                out,
                "{} ({}, {} candles)",
                series.symbol,
                series.interval,
                series.candles.len()
            );
            for candle in &series.candles {
                let time = chrono::DateTime::from_timestamp(candle.time, 0)
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| candle.time.to_string());
                let _ = writeln!(
                    out,
                    "{time}  O {}  H {}  L {}  C {}",
                    candle.open, candle.high, candle.low, candle.close
                );
            }
            Ok(out)
        }
    }
}

/// 종목 카탈로그 출력 문자열.
pub fn render_instruments(instruments: &[Instrument], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(instruments)?),
        OutputFormat::Text => {
            let mut out = String::new();
            let _ = writeln!(out, "{} tradable instruments", instruments.len());
            for instrument in instruments {
                let _ = writeln!(
                    out,
                    "  {:<16} tick {} (precision {})",
                    instrument.symbol,
                    instrument.tick_size.normalize(),
                    instrument.price_precision()
                );
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use mover_core::{CohortKind, CohortStats, Lookback, RankedTable, RankedTableKind};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::stats::RunStats;

    fn report() -> AnalysisReport {
        let rows = vec![
            ChangeRecord::new("AUSDT", dec!(5.34)),
            ChangeRecord::new("BUSDT", dec!(-0.4)),
        ];
        AnalysisReport {
            timeframe: "4 Hours".to_string(),
            lookback: Lookback::from_hours(4.0).unwrap(),
            cohorts: vec![Cohort {
                kind: CohortKind::Market,
                label: CohortKind::Market.label().to_string(),
                timeframe: "4 Hours".to_string(),
                members: rows.clone(),
                ignored_symbols: vec!["CUSDT".to_string()],
                tables: vec![RankedTable {
                    kind: RankedTableKind::Performance,
                    rows,
                }],
                stats: CohortStats {
                    mean: dec!(2.47),
                    median: dec!(2.47),
                    gainer_count: 1,
                    loser_count: 1,
                },
                major_movers: vec![ChangeRecord::new("BTCUSDT", dec!(1.2))],
            }],
            stats: RunStats::new(3),
        }
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(signed_percent(dec!(5.34)), "+5.34%");
        assert_eq!(signed_percent(dec!(-0.4)), "-0.40%");
        assert_eq!(signed_percent(Decimal::ZERO), "0.00%");
    }

    #[test]
    fn text_report_lists_tables_and_ignored() {
        let text = render_report(&report(), OutputFormat::Text, "USDT").unwrap();
        assert!(text.contains("=== Full Market Analysis ==="));
        assert!(text.contains("Majors: BTC +1.20%"));
        assert!(text.contains("--- Performance ---"));
        assert!(text.contains("AUSDT"));
        assert!(text.contains("Ignored (1): CUSDT"));
    }

    #[test]
    fn json_report_is_parseable() {
        let json = render_report(&report(), OutputFormat::Json, "USDT").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["timeframe"], "4 Hours");
        assert_eq!(value["cohorts"][0]["kind"], "market");
        assert_eq!(value["cohorts"][0]["ignored_symbols"][0], "CUSDT");
        assert_eq!(value["stats"]["requested"], 3);
    }
}
