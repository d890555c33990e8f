//! Preset strategy templates.
//!
//! A fixed catalog of buy/sell script pairs that strategy authors can use as
//! is or adapt.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresetTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub buy_script: &'static str,
    pub sell_script: &'static str,
}

pub const PRESETS: &[PresetTemplate] = &[
    PresetTemplate {
        key: "rsi_reversal",
        name: "RSI Oversold/Overbought",
        description: "Buy when RSI(14) drops below 30, sell when it rises above 70",
        buy_script: "rsi(14) < 30",
        sell_script: "rsi(14) > 70",
    },
    PresetTemplate {
        key: "macd_cross",
        name: "MACD Signal Cross",
        description: "Buy when the MACD line crosses above its signal line, sell on the reverse",
        buy_script: "cross_above(macd(), macd_signal())",
        sell_script: "cross_below(macd(), macd_signal())",
    },
    PresetTemplate {
        key: "dual_ma_cross",
        name: "Dual Moving Average Cross",
        description: "Buy when SMA(5) crosses above SMA(20), sell when it crosses below",
        buy_script: "sma(5) > sma(20) and sma(5)[1] <= sma(20)[1]",
        sell_script: "sma(5) < sma(20) and sma(5)[1] >= sma(20)[1]",
    },
    PresetTemplate {
        key: "ema_cross",
        name: "EMA 12/26 Cross",
        description: "Buy when EMA(12) crosses above EMA(26), sell when it crosses below",
        buy_script: "cross_above(ema(12), ema(26))",
        sell_script: "cross_below(ema(12), ema(26))",
    },
    PresetTemplate {
        key: "bollinger_touch",
        name: "Bollinger Band Touch",
        description: "Buy at or below the lower band, sell at or above the upper band",
        buy_script: "close <= boll_lower(20, 2)",
        sell_script: "close >= boll_upper(20, 2)",
    },
    PresetTemplate {
        key: "kdj_reversal",
        name: "KDJ Oversold/Overbought",
        description: "Buy when K and D are both below 20, sell when both are above 80",
        buy_script: "kdj_k() < 20 and kdj_d() < 20",
        sell_script: "kdj_k() > 80 and kdj_d() > 80",
    },
    PresetTemplate {
        key: "williams_r_reversal",
        name: "Williams %R Reversal",
        description: "Buy below -80, sell above -20",
        buy_script: "williams_r(14) < -80",
        sell_script: "williams_r(14) > -20",
    },
    PresetTemplate {
        key: "momentum",
        name: "Daily Momentum",
        description: "Buy on a gain above 3% while above SMA(20), sell on a drop below -3%",
        buy_script: "change_percent > 3 and close > sma(20)",
        sell_script: "change_percent < -3",
    },
];

pub fn find(key: &str) -> Option<&'static PresetTemplate> {
    PRESETS.iter().find(|p| p.key == key)
}
