//! 远端翻译客户端
//!
//! `TranslationBackend` 抽象出一次远端调用，`MyMemoryBackend` 是基于 reqwest 的实现。
//! 响应解析和译文规范化是独立的函数，任何后端都可以复用。

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use serde_json::Value;
use url::Url;

use crate::translation::error::{TranslationError, TranslationResult};

/// 可能包裹整段译文的引号对（开, 闭）
const WRAPPING_QUOTES: &[(char, char)] = &[
    ('"', '"'),
    ('\'', '\''),
    ('“', '”'),
    ('„', '“'),
    ('„', '”'),
    ('«', '»'),
    ('»', '«'),
    ('‘', '’'),
];

/// 远端翻译后端
///
/// 返回的是未经规范化的译文，调用方负责去除引号和空白。
#[async_trait(?Send)]
pub trait TranslationBackend {
    /// 翻译单段文本
    async fn fetch(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<String>;

    /// 后端名称，用于日志
    fn name(&self) -> &str;
}

/// MyMemory 翻译服务
pub struct MyMemoryBackend {
    client: reqwest::Client,
    api_url: Url,
}

impl MyMemoryBackend {
    /// 创建后端，`api_url` 必须是合法的绝对 URL
    pub fn new(api_url: &str) -> TranslationResult<Self> {
        let api_url = Url::parse(api_url)?;
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, api_url })
    }

    /// 构造请求 URL：`?q=<text>&langpair=<source>|<target>`
    pub fn request_url(&self, text: &str, source_lang: &str, target_lang: &str) -> Url {
        let mut url = self.api_url.clone();
        url.query_pairs_mut()
            .append_pair("q", text)
            .append_pair("langpair", &format!("{}|{}", source_lang, target_lang));
        url
    }
}

#[async_trait(?Send)]
impl TranslationBackend for MyMemoryBackend {
    async fn fetch(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<String> {
        let url = self.request_url(text, source_lang, target_lang);
        tracing::debug!("请求翻译: {} → {} ({} 字符)", source_lang, target_lang, text.chars().count());

        let response = self
            .client
            .get(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        parse_response(&body)
    }

    fn name(&self) -> &str {
        "mymemory"
    }
}

/// 解析 MyMemory 响应体，返回 `responseData.translatedText`
///
/// `responseStatus` 可能是数字也可能是数字字符串
pub fn parse_response(body: &str) -> TranslationResult<String> {
    let value: Value = serde_json::from_str(body)?;

    let status = match value.get("responseStatus") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match status {
        Some(200) => {}
        Some(other) => {
            return Err(TranslationError::MalformedResponse(format!(
                "responseStatus 为 {}",
                other
            )))
        }
        None => {
            return Err(TranslationError::MalformedResponse(
                "缺少 responseStatus".to_string(),
            ))
        }
    }

    value
        .get("responseData")
        .and_then(|data| data.get("translatedText"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            TranslationError::MalformedResponse("缺少 responseData.translatedText".to_string())
        })
}

/// 规范化译文：去除首尾空白和包裹整段文本的引号，结果为空时视为格式错误
///
/// 只有首尾字符构成一对引号、且中间不再出现这两个字符时才去除，
/// 所以 `Cliquez sur "Enregistrer"` 和 `'s-Hertogenbosch` 保持不变。
pub fn normalize_translation(raw: &str) -> TranslationResult<String> {
    let mut normalized = raw.trim();
    while let Some(inner) = strip_wrapping_pair(normalized) {
        normalized = inner.trim();
    }

    if normalized.is_empty() {
        return Err(TranslationError::MalformedResponse("译文为空".to_string()));
    }

    Ok(normalized.to_string())
}

fn strip_wrapping_pair(text: &str) -> Option<&str> {
    let mut chars = text.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;

    if !WRAPPING_QUOTES.contains(&(first, last)) {
        return None;
    }

    let inner = &text[first.len_utf8()..text.len() - last.len_utf8()];
    if inner.contains(first) || inner.contains(last) {
        return None;
    }

    Some(inner)
}
