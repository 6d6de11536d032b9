//! 页面过滤：非HTML资源URL直接跳过内容分析
//! 图片/样式/脚本/字体等资源不含可检测的页面结构，宿主可用此过滤避免无谓匹配

use once_cell::sync::Lazy;
use regex::Regex;

// 路径扩展名黑名单（忽略大小写）
static NON_HTML_EXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(png|jpe?g|gif|svg|webp|ico|css|js|json|xml|pdf|zip|mp[34]|wav|woff2?|[te]ot)$")
        .unwrap()
});

/// URL是否值得做内容分析（按路径扩展名判断，query/fragment剔除后）
pub fn should_analyze_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    !NON_HTML_EXT.is_match(path)
}
