//! 按主体聚合的检测存储
//! 主体（subject，例如一个标签页）内按URL分桶，桶内按通道存槽；
//! 通道槽语义为“整体覆写”：同一(主体, URL, 通道)的再次写入替换而非追加，
//! 因此三通道结果以任意顺序到达，最终合并视图一致（顺序无关）。
//! 主体导航切换时把当前桶表快照进有界最近缓存（容量5），
//! 回到近期URL可直接恢复检测结果而无需重新匹配。

use std::collections::VecDeque;

use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::detection::record::{Channel, DetectionRecord, MERGED_EVIDENCE_CAP};

/// 主体标识：宿主侧的不透明句柄（如标签页id）
pub type SubjectId = u64;

/// 最近缓存容量：每主体最多保留5个已离开URL的桶表快照
pub const RECENT_CACHE_CAP: usize = 5;

/// 单URL检测桶：三个通道槽彼此独立
/// `None` = 该通道尚未对此URL做过分析（与“分析过但无命中”区分，供展示提示）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlBucket {
    pub url: String,
    pub header: Option<Vec<DetectionRecord>>,
    pub content: Option<Vec<DetectionRecord>>,
    pub ip: Option<Vec<DetectionRecord>>,
}

impl UrlBucket {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    fn slot_mut(&mut self, channel: Channel) -> &mut Option<Vec<DetectionRecord>> {
        match channel {
            Channel::Header => &mut self.header,
            Channel::Content => &mut self.content,
            Channel::Ip => &mut self.ip,
        }
    }

    pub fn slot(&self, channel: Channel) -> Option<&[DetectionRecord]> {
        match channel {
            Channel::Header => self.header.as_deref(),
            Channel::Content => self.content.as_deref(),
            Channel::Ip => self.ip.as_deref(),
        }
    }
}

/// 单URL的通道计数概览（展示层URL列表用；None渲染为 "?"）
#[derive(Debug, Clone, PartialEq)]
pub struct UrlChannelCounts {
    pub url: String,
    pub header: Option<usize>,
    pub content: Option<usize>,
    pub ip: Option<usize>,
}

/// 最近缓存条目：离开某URL时的完整桶表快照
#[derive(Debug, Clone)]
struct RecentEntry {
    url: String,
    buckets: Vec<UrlBucket>,
}

/// 主体会话：当前URL + 插桶顺序保留的桶表 + 有界最近缓存
/// 生命周期：首个检测事件懒创建；导航起点清桶（先查缓存）；显式关闭销毁
#[derive(Debug, Clone, Default)]
struct SubjectSession {
    current_url: Option<String>,
    // Vec保持首次分析顺序，合并输出的首遇序依赖它
    buckets: Vec<UrlBucket>,
    recent: VecDeque<RecentEntry>,
}

impl SubjectSession {
    fn bucket_mut(&mut self, url: &str) -> &mut UrlBucket {
        let idx = match self.buckets.iter().position(|b| b.url == url) {
            Some(idx) => idx,
            None => {
                self.buckets.push(UrlBucket::new(url));
                self.buckets.len() - 1
            }
        };
        &mut self.buckets[idx]
    }

    /// 当前桶表快照入最近缓存：头插、同URL替换、超容量淘汰最旧
    fn stash_current(&mut self, old_url: String) {
        let snapshot = std::mem::take(&mut self.buckets);
        self.recent.retain(|e| e.url != old_url);
        self.recent.push_front(RecentEntry {
            url: old_url,
            buckets: snapshot,
        });
        while self.recent.len() > RECENT_CACHE_CAP {
            let evicted = self.recent.pop_back();
            if let Some(e) = evicted {
                debug!("最近缓存淘汰最旧条目: {}", e.url);
            }
        }
    }

    /// 命中最近缓存则取回快照恢复，否则空桶表起步
    fn restore_or_clear(&mut self, new_url: &str) {
        let hit = self
            .recent
            .iter()
            .position(|e| e.url == new_url)
            .and_then(|idx| self.recent.remove(idx));
        if let Some(entry) = hit {
            debug!("最近缓存命中，恢复URL检测结果: {}", new_url);
            self.buckets = entry.buckets;
        } else {
            self.buckets = Vec::new();
        }
    }
}

/// 检测聚合存储
/// 独占持有全部主体会话；查询返回快照副本，不外泄内部可变引用。
/// 每主体的操作由宿主事件循环串行调用，内部不加锁；
/// 多线程宿主需自行为每个主体提供独占访问边界。
#[derive(Debug, Default)]
pub struct DetectionStore {
    subjects: FxHashMap<SubjectId, SubjectSession>,
}

impl DetectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 幂等写入：整体替换该(主体, URL, 通道)的记录列表
    /// 未知主体/URL懒创建；空证据记录（不应出现）在此兜底过滤
    pub fn record_detections(
        &mut self,
        subject: SubjectId,
        url: &str,
        channel: Channel,
        mut records: Vec<DetectionRecord>,
    ) {
        records.retain(|r| !r.matched_texts.is_empty());
        debug!(
            "记录检测结果 | 主体: {} | 通道: {} | URL: {} | {} 条",
            subject,
            channel,
            url,
            records.len()
        );
        let session = self.subjects.entry(subject).or_default();
        *session.bucket_mut(url).slot_mut(channel) = Some(records);
    }

    /// 导航起点：当前URL变化时快照旧桶表入最近缓存，再恢复/清空新URL桶表
    pub fn on_navigation_start(&mut self, subject: SubjectId, new_url: &str) {
        let session = self.subjects.entry(subject).or_default();
        if session.current_url.as_deref() == Some(new_url) {
            return;
        }
        // 首次导航无旧URL可作缓存键，不做快照
        if let Some(old) = session.current_url.take() {
            session.stash_current(old);
        }
        session.restore_or_clear(new_url);
        session.current_url = Some(new_url.to_string());
    }

    /// 主体当前URL（宿主展示用）
    pub fn current_url(&self, subject: SubjectId) -> Option<&str> {
        self.subjects
            .get(&subject)
            .and_then(|s| s.current_url.as_deref())
    }

    /// 跨URL跨通道合并去重的技术列表（快照副本）
    /// 按签名key合并：首遇记录为种子，后续记录并入证据（并集去重，上限10），
    /// 不同通道并入通道列表；输出顺序即首遇顺序
    pub fn merged_technologies(&self, subject: SubjectId) -> Vec<DetectionRecord> {
        let Some(session) = self.subjects.get(&subject) else {
            return Vec::new();
        };

        let mut merged: Vec<DetectionRecord> = Vec::new();
        let mut index: FxHashMap<String, usize> = FxHashMap::default();

        for bucket in &session.buckets {
            for channel in Channel::ALL {
                let Some(records) = bucket.slot(channel) else {
                    continue;
                };
                for record in records {
                    match index.get(&record.key) {
                        None => {
                            index.insert(record.key.clone(), merged.len());
                            merged.push(record.clone());
                        }
                        Some(&idx) => {
                            let seed = &mut merged[idx];
                            for text in &record.matched_texts {
                                if seed.matched_texts.len() >= MERGED_EVIDENCE_CAP {
                                    break;
                                }
                                if !seed.matched_texts.contains(text) {
                                    seed.matched_texts.push(text.clone());
                                }
                            }
                            for ch in &record.channels {
                                if !seed.channels.contains(ch) {
                                    seed.channels.push(*ch);
                                }
                            }
                        }
                    }
                }
            }
        }
        merged
    }

    /// 每URL的通道记录数概览（None = 该通道尚未分析）
    pub fn url_overview(&self, subject: SubjectId) -> Vec<UrlChannelCounts> {
        let Some(session) = self.subjects.get(&subject) else {
            return Vec::new();
        };
        session
            .buckets
            .iter()
            .map(|b| UrlChannelCounts {
                url: b.url.clone(),
                header: b.header.as_ref().map(Vec::len),
                content: b.content.as_ref().map(Vec::len),
                ip: b.ip.as_ref().map(Vec::len),
            })
            .collect()
    }

    /// 销毁主体会话（含最近缓存）
    pub fn remove_subject(&mut self, subject: SubjectId) {
        if self.subjects.remove(&subject).is_some() {
            debug!("主体会话已销毁: {}", subject);
        }
    }

    /// 显式生命周期终点：清空全部主体会话
    pub fn shutdown(&mut self) {
        let count = self.subjects.len();
        self.subjects.clear();
        info!("检测存储关闭，清理 {} 个主体会话", count);
    }

    #[cfg(test)]
    fn recent_urls(&self, subject: SubjectId) -> Vec<String> {
        self.subjects
            .get(&subject)
            .map(|s| s.recent.iter().map(|e| e.url.clone()).collect())
            .unwrap_or_default()
    }
}
