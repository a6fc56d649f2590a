//! Static list of tracked ETFs and their detail-page URLs.

use crate::domain::Instrument;

const DETAIL_BASE_URL: &str = "https://www.jisilu.cn/data/etf/detail";

/// `(code, display name)` in collection order.
const ETFS: &[(&str, &str)] = &[
    ("516970", "基建50ETF"),
    ("159745", "建材ETF"),
    ("515210", "钢铁ETF"),
    ("515220", "煤炭ETF"),
    ("516150", "稀土ETF"),
    ("159870", "化工ETF"),
    ("560280", "工程机械ETF"),
    ("512880", "证券ETF"),
    ("512800", "银行ETF"),
    ("159611", "电力ETF"),
    ("159755", "电池ETF"),
    ("159992", "创新药ETF"),
    ("159996", "家电ETF"),
    ("515170", "食品饮料ETF"),
    ("516110", "汽车ETF"),
    ("159995", "芯片ETF"),
    ("515880", "通信ETF"),
    ("159819", "人工智能ETF"),
    ("562500", "机器人ETF"),
    ("515230", "软件ETF"),
    ("516010", "游戏ETF"),
    ("510300", "沪深300ETF"),
    ("159949", "创业板50ETF"),
    ("588000", "科创50ETF"),
];

/// All tracked instruments, in registry order.
pub fn instruments() -> Vec<Instrument> {
    ETFS.iter()
        .map(|&(id, name)| Instrument::new(id, name))
        .collect()
}

/// Registry instruments restricted to `ids`, keeping registry order.
///
/// Unknown ids are returned separately so the caller can report them.
pub fn select(ids: &[String]) -> (Vec<Instrument>, Vec<String>) {
    let all = instruments();
    let unknown = ids
        .iter()
        .filter(|id| !all.iter().any(|i| &i.id == *id))
        .cloned()
        .collect();
    let selected = all
        .into_iter()
        .filter(|i| ids.iter().any(|id| id == &i.id))
        .collect();
    (selected, unknown)
}

/// Detail page for an instrument id.
pub fn detail_url(id: &str) -> String {
    format!("{DETAIL_BASE_URL}/{id}")
}
