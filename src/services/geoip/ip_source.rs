//! IP 来源文本解析
//!
//! 用户登录时记录的 IP 来源有两种常见形式：
//! - 竖线分隔：`中国|广东省|深圳市|电信`、`中国|0|广东省|深圳市|电信`
//! - 空格分隔：`广东省深圳市 电信`、`北京市 联通`
//!
//! 解析结果为省级地区名，无法识别时返回 `None`。

/// 省级行政区后缀，按出现位置最早者截断
const PROVINCE_SUFFIXES: [&str; 4] = ["特别行政区", "自治区", "省", "市"];

/// 这些标记表示来源不是公网地址
const PRIVATE_MARKERS: [&str; 3] = ["内网", "局域网", "本机"];

/// 从 IP 来源文本中提取省级地区名
pub fn parse_ip_source(source: &str) -> Option<String> {
    let source = source.trim();
    if source.is_empty() || PRIVATE_MARKERS.iter().any(|m| source.contains(m)) {
        return None;
    }

    if source.contains('|') {
        parse_pipe_separated(source)
    } else {
        let first = source.split_whitespace().next()?;
        Some(province_prefix(first).to_string())
    }
}

fn parse_pipe_separated(source: &str) -> Option<String> {
    // "0" 是占位符，表示该级未知
    let fields: Vec<&str> = source
        .split('|')
        .map(str::trim)
        .filter(|f| !f.is_empty() && *f != "0")
        .collect();

    match fields.as_slice() {
        [] => None,
        [country] => Some((*country).to_string()),
        [_, region, ..] => Some(province_prefix(region).to_string()),
    }
}

/// "广东省深圳市" → "广东省"；没有行政区后缀时原样返回
fn province_prefix(text: &str) -> &str {
    PROVINCE_SUFFIXES
        .iter()
        .filter_map(|suffix| text.find(suffix).map(|idx| idx + suffix.len()))
        .min()
        .map_or(text, |end| &text[..end])
}
