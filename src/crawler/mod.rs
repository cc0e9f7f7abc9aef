/// 抓取與解析過程中的錯誤
pub mod error;
/// 股市資訊網
pub mod goodinfo;
/// 網頁表格解析
pub mod table;
