//! 供应商IP段归一化加载
//! 上游载荷形态固定的小集合：前缀清单 / 嵌套地址块 / 扁平CIDR数组 / cidrs包装
//! 识别失败或载荷畸形 → 该供应商得到空段表（warn日志），从不否决整表加载

use log::{info, warn};
use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::iprange::classifier::{expand_ipv6, pack_ipv4};
use crate::iprange::model::{IpRangeTable, ProviderRanges, RawProviderPayload};

/// 归一化全部供应商载荷为IP段表
pub fn load_ip_ranges(payloads: &[RawProviderPayload]) -> IpRangeTable {
    let providers = payloads
        .iter()
        .map(|payload| {
            let cidrs = normalize_provider(&payload.key, &payload.data);
            ProviderRanges {
                key: payload.key.clone(),
                profile: payload.profile.clone(),
                cidrs,
            }
        })
        .collect::<Vec<_>>();

    info!(
        "IP段表加载完成: {} 个供应商, 共 {} 条CIDR",
        providers.len(),
        providers.iter().map(|p| p.cidrs.len()).sum::<usize>()
    );
    IpRangeTable::new(providers)
}

/// 按已知形态提取CIDR字符串并归一化，去重保序
fn normalize_provider(key: &str, data: &Value) -> Vec<String> {
    let raw = extract_cidr_strings(data);
    if raw.is_empty() {
        warn!("供应商[{}]载荷形态未识别或为空，使用空段表", key);
        return Vec::new();
    }

    let mut seen = FxHashSet::default();
    let mut cidrs = Vec::new();
    for entry in raw {
        match normalize_cidr(&entry) {
            Some(cidr) => {
                if seen.insert(cidr.clone()) {
                    cidrs.push(cidr);
                }
            }
            None => warn!("供应商[{}]丢弃畸形CIDR条目: {}", key, entry),
        }
    }
    cidrs
}

/// 从已知载荷形态中提取CIDR字符串列表
/// 形态1：前缀清单 {"prefixes": [{"ip_prefix": ..}], "ipv6_prefixes": [{"ipv6_prefix": ..}]}
/// 形态2：嵌套地址块 {"values": [{"properties": {"addressPrefixes": [..]}}]}
/// 形态3：cidrs包装 {"cidrs": [..]}
/// 形态4：扁平数组 [".."]
fn extract_cidr_strings(data: &Value) -> Vec<String> {
    match data {
        Value::Array(items) => items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        Value::Object(map) => {
            let mut out = Vec::new();
            if let Some(prefixes) = map.get("prefixes").and_then(Value::as_array) {
                out.extend(
                    prefixes
                        .iter()
                        .filter_map(|p| p.get("ip_prefix"))
                        .filter_map(Value::as_str)
                        .map(String::from),
                );
            }
            if let Some(prefixes) = map.get("ipv6_prefixes").and_then(Value::as_array) {
                out.extend(
                    prefixes
                        .iter()
                        .filter_map(|p| p.get("ipv6_prefix"))
                        .filter_map(Value::as_str)
                        .map(String::from),
                );
            }
            if let Some(values) = map.get("values").and_then(Value::as_array) {
                for block in values {
                    if let Some(prefixes) = block
                        .get("properties")
                        .and_then(|p| p.get("addressPrefixes"))
                        .and_then(Value::as_array)
                    {
                        out.extend(prefixes.iter().filter_map(Value::as_str).map(String::from));
                    }
                }
            }
            if let Some(cidrs) = map.get("cidrs").and_then(Value::as_array) {
                out.extend(cidrs.iter().filter_map(Value::as_str).map(String::from));
            }
            out
        }
        _ => Vec::new(),
    }
}

/// 归一化单条CIDR：trim后必须是 `address/prefix`，地址与前缀需在本族内合法
fn normalize_cidr(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let (addr, prefix) = trimmed.split_once('/')?;
    let prefix: u32 = prefix.trim().parse().ok()?;
    let addr = addr.trim();

    let valid = if addr.contains('.') && !addr.contains(':') {
        prefix <= 32 && pack_ipv4(addr).is_some()
    } else {
        prefix <= 128 && expand_ipv6(addr).is_some()
    };
    valid.then(|| format!("{}/{}", addr, prefix))
}
