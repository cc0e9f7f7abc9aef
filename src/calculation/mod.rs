/// 最小值、平均值、最大值
pub mod summary;
/// 以營收、淨利率與本益比估算股價
pub mod valuation;
