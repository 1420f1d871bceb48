//! 文本过滤器模块
//!
//! 判断单个文本节点的内容是否值得翻译。元素层面的过滤（跳过的标签、
//! `translate="no"` 祖先）由收集器负责，这里只看文本本身。

use std::sync::OnceLock;

use regex::Regex;

use crate::translation::config::constants;

/// 文本被拒绝的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// 去除空白后为空或短于最小长度
    TooShort,
    /// 纯数字（含常见分隔符）
    Numeric,
    /// URL、邮箱、@用户名、#话题或裸域名
    UrlLike,
    /// 不含任何字母
    NoLetters,
}

/// 文本过滤器
pub struct TextFilter {
    min_text_length: usize,
    regex_cache: RegexCache,
}

/// 正则表达式缓存
#[derive(Default)]
struct RegexCache {
    numeric_regex: OnceLock<Regex>,
    url_regex: OnceLock<Regex>,
}

impl RegexCache {
    fn numeric(&self) -> &Regex {
        self.numeric_regex.get_or_init(|| {
            Regex::new(r"^[\d\s.,:;+\-–/%()#]*\d[\d\s.,:;+\-–/%()#]*$")
                .expect("numeric pattern is valid")
        })
    }

    fn url(&self) -> &Regex {
        self.url_regex.get_or_init(|| {
            Regex::new(concat!(
                r"^(",
                r"[a-zA-Z][a-zA-Z0-9+.\-]*://\S+",
                r"|[wW]{3}\.\S+",
                r"|mailto:\S+",
                r"|[\w.%+\-]+@[\w.\-]+\.[a-zA-Z]{2,}",
                r"|@[\w.\-]+",
                r"|#[\w\-]+",
                r"|[\w\-]+(\.[\w\-]+)*\.[a-zA-Z]{2,}(/\S*)?",
                r")$"
            ))
            .expect("url pattern is valid")
        })
    }
}

impl Default for TextFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextFilter {
    /// 创建新的文本过滤器
    pub fn new() -> Self {
        Self::with_min_length(constants::MIN_TEXT_LENGTH)
    }

    /// 使用指定的最小长度创建过滤器
    pub fn with_min_length(min_text_length: usize) -> Self {
        Self {
            min_text_length,
            regex_cache: RegexCache::default(),
        }
    }

    /// 判断文本是否需要翻译
    pub fn should_translate(&self, text: &str) -> bool {
        self.reject_reason(text).is_none()
    }

    /// 返回拒绝原因，可翻译时返回 None
    pub fn reject_reason(&self, text: &str) -> Option<RejectReason> {
        let trimmed = text.trim();

        if trimmed.chars().count() < self.min_text_length {
            return Some(RejectReason::TooShort);
        }

        if self.is_numeric(trimmed) {
            return Some(RejectReason::Numeric);
        }

        if self.is_url_like(trimmed) {
            return Some(RejectReason::UrlLike);
        }

        if !trimmed.chars().any(|c| c.is_alphabetic()) {
            return Some(RejectReason::NoLetters);
        }

        None
    }

    /// 检查是否为纯数字文本
    pub fn is_numeric(&self, text: &str) -> bool {
        self.regex_cache.numeric().is_match(text.trim())
    }

    /// 检查是否像 URL 或账号标识
    ///
    /// 含空白的文本一律视为自然语言
    pub fn is_url_like(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return false;
        }
        self.regex_cache.url().is_match(trimmed)
    }
}
