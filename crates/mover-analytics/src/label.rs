//! 타임프레임 표시 문자열.

/// 조회 기간(시간) → 표시 라벨.
///
/// - 1시간 미만: `"30 Minutes"`
/// - 24의 배수: `"1 Day"`, `"7 Days"`
/// - 그 외: `"4 Hours"`, `"1.5 Hours"` (소수 둘째 자리까지, 뒤쪽 0 제거)
pub fn timeframe_label(hours: f64) -> String {
    if hours < 1.0 {
        return format!("{} Minutes", (hours * 60.0).round() as i64);
    }
    if hours >= 24.0 && hours % 24.0 == 0.0 {
        let days = (hours / 24.0) as i64;
        let unit = if days == 1 { "Day" } else { "Days" };
        return format!("{days} {unit}");
    }

    let formatted = format!("{hours:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} Hours")
}
