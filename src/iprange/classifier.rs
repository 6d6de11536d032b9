//! CIDR分类器：判断IP落在哪些供应商的IP段内
//! 匹配算法为文本级解析 + 位级掩码比较：
//! - 地址族判定：含`.`且不含`:`为IPv4，否则按IPv6处理，族不同永不匹配
//! - IPv4：双方打包为u32，构造prefix个前导1的掩码后比较
//! - IPv6：`::`压缩确定性展开为8组16位（16字节），先比较prefix/8个整字节，
//!   再用部分掩码比较剩余prefix%8位
//! - 任何畸形输入（地址/前缀非法）一律视为不匹配，永不panic

use log::debug;

use crate::iprange::model::{IpRangeTable, ProviderRanges};

/// 单个供应商的命中结果，证据为字面 `"hostname ip"` 文本
#[derive(Debug, Clone)]
pub struct ProviderMatch<'a> {
    pub provider: &'a ProviderRanges,
    pub evidence: String,
}

/// CIDR分类器（无状态）
pub struct CidrClassifier;

impl CidrClassifier {
    /// 对每个供应商逐段测试IP，命中任一段即记该供应商（段级短路）
    pub fn classify<'a>(
        hostname: &str,
        ip: &str,
        table: &'a IpRangeTable,
    ) -> Vec<ProviderMatch<'a>> {
        let ip = ip.trim();
        if ip.is_empty() {
            return Vec::new();
        }
        let mut matches = Vec::new();
        for provider in table.providers() {
            if provider.cidrs.iter().any(|cidr| cidr_contains(ip, cidr)) {
                debug!("[IP]匹配成功 | 供应商: {} | {} {}", provider.key, hostname, ip);
                matches.push(ProviderMatch {
                    provider,
                    evidence: format!("{} {}", hostname, ip),
                });
            }
        }
        matches
    }
}

/// 判断地址族：IPv4形态 = 含点且不含冒号
#[inline]
fn is_ipv4_shape(s: &str) -> bool {
    s.contains('.') && !s.contains(':')
}

/// IP是否落在CIDR段内；畸形CIDR/地址一律不匹配
pub fn cidr_contains(ip: &str, cidr: &str) -> bool {
    let Some((net, prefix)) = cidr.trim().split_once('/') else {
        return false;
    };
    let Ok(prefix) = prefix.trim().parse::<u32>() else {
        return false;
    };
    let net = net.trim();
    let ip = ip.trim();

    // 族不同永不匹配
    if is_ipv4_shape(ip) != is_ipv4_shape(net) {
        return false;
    }

    if is_ipv4_shape(ip) {
        if prefix > 32 {
            return false;
        }
        match (pack_ipv4(ip), pack_ipv4(net)) {
            (Some(addr), Some(net_addr)) => {
                let mask = if prefix == 0 {
                    0
                } else {
                    u32::MAX << (32 - prefix)
                };
                (addr & mask) == (net_addr & mask)
            }
            _ => false,
        }
    } else {
        if prefix > 128 {
            return false;
        }
        match (expand_ipv6(ip), expand_ipv6(net)) {
            (Some(addr), Some(net_addr)) => {
                let full_bytes = (prefix / 8) as usize;
                if addr[..full_bytes] != net_addr[..full_bytes] {
                    return false;
                }
                let rem_bits = prefix % 8;
                if rem_bits == 0 {
                    return true;
                }
                let mask = 0xffu8 << (8 - rem_bits);
                (addr[full_bytes] & mask) == (net_addr[full_bytes] & mask)
            }
            _ => false,
        }
    }
}

/// IPv4文本打包为u32；非法返回None
pub(crate) fn pack_ipv4(s: &str) -> Option<u32> {
    let mut packed: u32 = 0;
    let mut count = 0usize;
    for part in s.split('.') {
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let octet: u32 = part.parse().ok()?;
        if octet > 255 || count >= 4 {
            return None;
        }
        packed = (packed << 8) | octet;
        count += 1;
    }
    (count == 4).then_some(packed)
}

/// IPv6文本展开为16字节；`::`压缩确定性展开，非法返回None
pub(crate) fn expand_ipv6(s: &str) -> Option<[u8; 16]> {
    let compressed = s.contains("::");
    let (head, tail) = match s.find("::") {
        Some(i) => (&s[..i], &s[i + 2..]),
        None => (s, ""),
    };

    // 组解析：1~4位十六进制；空段（多重`::`等）直接判非法
    fn parse_groups(part: &str) -> Option<Vec<u16>> {
        if part.is_empty() {
            return Some(Vec::new());
        }
        part.split(':')
            .map(|g| {
                if g.is_empty() || g.len() > 4 {
                    return None;
                }
                u16::from_str_radix(g, 16).ok()
            })
            .collect()
    }

    let head_groups = parse_groups(head)?;
    let tail_groups = parse_groups(tail)?;
    let total = head_groups.len() + tail_groups.len();
    if (compressed && total > 8) || (!compressed && total != 8) {
        return None;
    }

    let mut groups = [0u16; 8];
    for (i, g) in head_groups.iter().enumerate() {
        groups[i] = *g;
    }
    let offset = 8 - tail_groups.len();
    for (i, g) in tail_groups.iter().enumerate() {
        groups[offset + i] = *g;
    }

    let mut bytes = [0u8; 16];
    for (i, g) in groups.iter().enumerate() {
        bytes[2 * i] = (g >> 8) as u8;
        bytes[2 * i + 1] = (g & 0xff) as u8;
    }
    Some(bytes)
}
