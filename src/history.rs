use serde::Serialize;

use crate::indicators::{Indicator, IndicatorSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoricDataPoint {
    pub turn: u32,
    pub indicators: IndicatorSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn arrow(self) -> &'static str {
        match self {
            Trend::Up => "▲",
            Trend::Down => "▼",
            Trend::Flat => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub turn: u32,
    pub value: i32,
}

/// One indicator across every recorded turn, for charting.
pub fn series(history: &[HistoricDataPoint], indicator: Indicator) -> Vec<SeriesPoint> {
    history
        .iter()
        .map(|point| SeriesPoint {
            turn: point.turn,
            value: point.indicators.get(indicator),
        })
        .collect()
}

/// Direction of the latest change; flat with fewer than two points.
pub fn trend(history: &[HistoricDataPoint], indicator: Indicator) -> Trend {
    match history {
        [.., previous, current] => {
            let (before, now) = (
                previous.indicators.get(indicator),
                current.indicators.get(indicator),
            );
            if now > before {
                Trend::Up
            } else if now < before {
                Trend::Down
            } else {
                Trend::Flat
            }
        }
        _ => Trend::Flat,
    }
}

/// `history[i].turn == i` for every entry.
pub fn is_contiguous(history: &[HistoricDataPoint]) -> bool {
    history
        .iter()
        .enumerate()
        .all(|(index, point)| point.turn as usize == index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::BASELINE;

    fn point(turn: u32, energy: i32) -> HistoricDataPoint {
        HistoricDataPoint {
            turn,
            indicators: IndicatorSnapshot {
                energy_balance: energy,
                ..BASELINE
            },
        }
    }

    #[test]
    fn trend_needs_two_points() {
        assert_eq!(trend(&[point(0, 0)], Indicator::EnergyBalance), Trend::Flat);
        assert_eq!(
            trend(&[point(0, 0), point(1, -1)], Indicator::EnergyBalance),
            Trend::Down
        );
        assert_eq!(
            trend(&[point(0, 0), point(1, -1), point(2, 14)], Indicator::EnergyBalance),
            Trend::Up
        );
    }

    #[test]
    fn series_follows_turns() {
        let history = [point(0, 0), point(1, 15), point(2, 14)];
        let values: Vec<i32> = series(&history, Indicator::EnergyBalance)
            .into_iter()
            .map(|p| p.value)
            .collect();
        assert_eq!(values, vec![0, 15, 14]);
        assert!(is_contiguous(&history));
        assert!(!is_contiguous(&history[1..]));
    }
}
