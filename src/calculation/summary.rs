use crate::declare::MetricTable;

/// 一組數值的最小值、平均值與最大值
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SummaryStats {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl SummaryStats {
    /// 只計算有數值的資料，全部缺值時回傳 None
    pub fn compute<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for v in values.into_iter().filter(|v| v.is_finite()) {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }

        if count == 0 {
            return None;
        }

        Some(SummaryStats {
            min,
            avg: sum / count as f64,
            max,
        })
    }

    pub fn from_table(table: &MetricTable) -> Option<Self> {
        Self::compute(table.values())
    }

    /// 依 min、avg、max 的順序
    pub fn as_array(&self) -> [f64; 3] {
        [self.min, self.avg, self.max]
    }
}
