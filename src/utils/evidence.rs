//! 证据文本处理：空白折叠 + 有界截断 + 命中窗口提取
//! 证据会存入检测记录并原样展示，统一在此处收敛长度与格式

/// 空白折叠 + 按字符数截断
/// 连续空白折叠为单个空格，首尾空白去除，超长截断
pub fn compact_snippet(s: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(s.len().min(max_chars * 4));
    let mut count = 0usize;
    let mut last_was_ws = true; // 开头空白直接吞掉
    for ch in s.chars() {
        if count >= max_chars {
            break;
        }
        if ch.is_whitespace() {
            if !last_was_ws {
                out.push(' ');
                count += 1;
                last_was_ws = true;
            }
        } else {
            out.push(ch);
            count += 1;
            last_was_ws = false;
        }
    }
    out.truncate(out.trim_end().len());
    out
}

/// 以命中区间为中心取固定半径文本窗口（字符边界安全）
pub fn context_window(haystack: &str, start: usize, end: usize, radius: usize) -> &str {
    let mut lo = start.saturating_sub(radius);
    while lo > 0 && !haystack.is_char_boundary(lo) {
        lo -= 1;
    }
    let mut hi = (end + radius).min(haystack.len());
    while hi < haystack.len() && !haystack.is_char_boundary(hi) {
        hi += 1;
    }
    &haystack[lo..hi]
}
