//! 关节状态更新与更新源
//!
//! 更新源是外部协作者：它异步发布 `JointStateUpdate`，`StateMonitor` 在
//! `start()` 时订阅一次。本模块同时提供进程内的 `ChannelUpdateSource` 实现，
//! 基于 crossbeam channel 扇出到所有订阅者。

use crate::error::MonitorError;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{trace, warn};

/// 单个关节状态更新事件
///
/// 一个事件内的所有变量作为整体原子合并。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JointStateUpdate {
    /// 采样时间戳（微秒）
    pub timestamp_us: u64,
    /// 来源序列号（同一时间戳下，序列号大者胜出）
    #[serde(default)]
    pub sequence: u64,
    /// 变量名 → 值
    pub values: BTreeMap<String, f64>,
}

impl JointStateUpdate {
    pub fn new(timestamp_us: u64, sequence: u64) -> Self {
        JointStateUpdate {
            timestamp_us,
            sequence,
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, variable: impl Into<String>, value: f64) -> Self {
        self.values.insert(variable.into(), value);
        self
    }

    /// 由 (变量名, 值) 序列构造
    pub fn from_pairs<I, S>(timestamp_us: u64, sequence: u64, values: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        JointStateUpdate {
            timestamp_us,
            sequence,
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 更新源 Trait
///
/// `subscribe` 返回一个接收端；发送端关闭视为更新源结束。
pub trait UpdateSource: Send + Sync {
    fn subscribe(&self) -> Result<Receiver<JointStateUpdate>, MonitorError>;
}

/// 订阅者通道容量
const SUBSCRIBER_CAPACITY: usize = 1024;

#[derive(Default)]
struct Subscribers {
    senders: Vec<Sender<JointStateUpdate>>,
    closed: bool,
}

/// 进程内更新源
///
/// 通过 [`ChannelUpdateSource::publisher`] 获取发布端。
#[derive(Clone, Default)]
pub struct ChannelUpdateSource {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl ChannelUpdateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取发布端（可克隆，可跨线程）
    pub fn publisher(&self) -> UpdatePublisher {
        UpdatePublisher {
            subscribers: self.subscribers.clone(),
        }
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().senders.len()
    }
}

impl UpdateSource for ChannelUpdateSource {
    fn subscribe(&self) -> Result<Receiver<JointStateUpdate>, MonitorError> {
        let mut subs = self.subscribers.lock();
        if subs.closed {
            return Err(MonitorError::SourceClosed);
        }
        let (tx, rx) = crossbeam_channel::bounded(SUBSCRIBER_CAPACITY);
        subs.senders.push(tx);
        Ok(rx)
    }
}

/// 更新发布端
#[derive(Clone)]
pub struct UpdatePublisher {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl UpdatePublisher {
    /// 发布更新到所有订阅者
    ///
    /// 没有订阅者时为空操作。订阅者队列满时阻塞等待（不丢弃状态更新）；
    /// 已断开的订阅者会被移除。返回成功投递的订阅者数量。
    pub fn publish(&self, update: JointStateUpdate) -> usize {
        let senders: Vec<Sender<JointStateUpdate>> = self.subscribers.lock().senders.clone();
        let mut delivered = 0;
        let mut dead = Vec::new();

        for tx in &senders {
            let result = match tx.try_send(update.clone()) {
                Err(TrySendError::Full(update)) => {
                    warn!("Subscriber queue full, blocking publisher");
                    tx.send(update).map_err(|_| ())
                },
                Err(TrySendError::Disconnected(_)) => Err(()),
                Ok(()) => Ok(()),
            };
            match result {
                Ok(()) => delivered += 1,
                Err(()) => dead.push(tx.clone()),
            }
        }

        if !dead.is_empty() {
            let mut subs = self.subscribers.lock();
            subs.senders
                .retain(|tx| !dead.iter().any(|d| d.same_channel(tx)));
            trace!("Removed {} disconnected subscriber(s)", dead.len());
        }

        delivered
    }

    /// 关闭更新源：断开所有订阅者，之后的订阅请求返回 `SourceClosed`
    pub fn close(&self) {
        let mut subs = self.subscribers.lock();
        subs.closed = true;
        subs.senders.clear();
    }
}
