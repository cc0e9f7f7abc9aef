/// 桌面版 Chrome 的版本
const CHROME_VERSIONS: [&str; 20] = [
    "133.0.6943.50", "133.0.6943.88", "132.0.6834.83", "132.0.6834.110", "131.0.6778.85",
    "131.0.6778.108", "130.0.6723.92", "130.0.6723.117", "129.0.6668.70", "129.0.6668.89",
    "128.0.6613.120", "128.0.6613.138", "127.0.6533.88", "127.0.6533.119", "126.0.6478.126",
    "126.0.6478.182", "125.0.6422.141", "125.0.6422.176", "124.0.6367.201", "124.0.6367.243",
];

const DESKTOP_OS: [&str; 10] = [
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; Win64; x64",
    "Windows NT 10.0; WOW64",
    "Macintosh; Intel Mac OS X 10_15_7",
    "Macintosh; Intel Mac OS X 13_6_5",
    "Macintosh; Intel Mac OS X 14_7_1",
    "X11; Linux x86_64",
    "X11; Ubuntu; Linux x86_64",
    "X11; Fedora; Linux x86_64",
];

/// 隨機產生一組桌面版 Chrome 的 User-Agent
pub fn gen_random_ua() -> String {
    let version = CHROME_VERSIONS[rand::random_range(0..CHROME_VERSIONS.len())];
    let os = DESKTOP_OS[rand::random_range(0..DESKTOP_OS.len())];

    format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} Safari/537.36",
        os, version
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_random_ua() {
        for _ in 0..20 {
            let ua = gen_random_ua();
            assert!(ua.starts_with("Mozilla/5.0 ("));
            assert!(ua.contains("Chrome/"));
        }
    }
}
