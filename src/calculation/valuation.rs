use crate::{calculation::summary::SummaryStats, config};

/// 九宮格的列為淨利率、欄為本益比，皆依 min、avg、max 排列
const LEVELS: [&str; 3] = ["Min", "Avg", "Max"];

/// 以近 12 個月營收推估的股價九宮格
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ValuationGrid {
    /// `cells[profit][pe]`
    pub cells: [[f64; 3]; 3],
}

/// 推估股價
///
/// 近 12 月營收 × 營收單位 × 淨利率(%) ÷ 股數 × 本益比
pub fn predict_price(
    revenue_sum: f64,
    profit_margin: f64,
    pe: f64,
    profile: &config::Valuation,
) -> f64 {
    revenue_sum * profile.revenue_scale * (profit_margin / 100.0) / profile.share_count * pe
}

impl ValuationGrid {
    /// 營收總和與兩組統計值都有數值，且股數不為 0 時才能計算
    pub fn compute(
        revenue_sum: Option<f64>,
        profit: Option<&SummaryStats>,
        pe: Option<&SummaryStats>,
        profile: &config::Valuation,
    ) -> Option<Self> {
        let revenue_sum = revenue_sum?;
        let profit = profit?;
        let pe = pe?;

        if profile.share_count == 0.0 {
            return None;
        }

        let mut cells = [[0.0; 3]; 3];
        for (i, p) in profit.as_array().into_iter().enumerate() {
            for (j, e) in pe.as_array().into_iter().enumerate() {
                cells[i][j] = predict_price(revenue_sum, p, e, profile);
            }
        }

        Some(ValuationGrid { cells })
    }

    /// 以 "Min Profit * Min PE" 的格式依序列出九格
    pub fn labeled(&self) -> Vec<(String, f64)> {
        let mut result = Vec::with_capacity(9);
        for (i, profit) in LEVELS.iter().enumerate() {
            for (j, pe) in LEVELS.iter().enumerate() {
                result.push((format!("{} Profit * {} PE", profit, pe), self.cells[i][j]));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(share_count: f64) -> config::Valuation {
        config::Valuation {
            revenue_scale: 10.0,
            share_count,
        }
    }

    fn stats(min: f64, avg: f64, max: f64) -> SummaryStats {
        SummaryStats { min, avg, max }
    }

    #[test]
    fn test_compute() {
        let profit = stats(5.0, 8.0, 10.0);
        let pe = stats(10.0, 15.0, 20.0);

        let grid =
            ValuationGrid::compute(Some(1_200_000.0), Some(&profit), Some(&pe), &profile(1000.0))
                .unwrap();

        assert_eq!(format!("{:.2}", grid.cells[0][0]), "6000.00");
        assert_eq!(format!("{:.2}", grid.cells[2][2]), "24000.00");
        assert_eq!(format!("{:.2}", grid.cells[1][1]), "14400.00");

        let labeled = grid.labeled();
        assert_eq!(labeled.len(), 9);
        assert_eq!(labeled[0].0, "Min Profit * Min PE");
        assert_eq!(labeled[1].0, "Min Profit * Avg PE");
        assert_eq!(labeled[8].0, "Max Profit * Max PE");
    }

    #[test]
    fn test_compute_requires_every_input() {
        let s = stats(1.0, 2.0, 3.0);

        assert!(ValuationGrid::compute(None, Some(&s), Some(&s), &profile(1000.0)).is_none());
        assert!(ValuationGrid::compute(Some(1.0), None, Some(&s), &profile(1000.0)).is_none());
        assert!(ValuationGrid::compute(Some(1.0), Some(&s), None, &profile(1000.0)).is_none());
        assert!(ValuationGrid::compute(Some(1.0), Some(&s), Some(&s), &profile(0.0)).is_none());
    }
}
