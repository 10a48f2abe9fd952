//! 翻译服务接口
//!
//! 翻译链只依赖 [`TranslationBackend`] 这个特性；真实环境使用
//! [`HttpTranslationBackend`]，测试使用确定性的替身实现。
//!
//! ## 协议
//!
//! 请求体为 `{"source": ..., "target": ..., "q": ...}` 的 JSON，
//! 响应中必须有字符串字段 `translatedText`。

use serde::{Deserialize, Serialize};

use crate::translation::error::{TranslationError, TranslationResult};

/// 单跳翻译服务
///
/// 实现方只负责一次 `source → target` 的请求，不做重试和缓存。
#[allow(async_fn_in_trait)]
pub trait TranslationBackend {
    async fn translate(&self, source: &str, target: &str, text: &str) -> TranslationResult<String>;
}

impl<B: TranslationBackend + ?Sized> TranslationBackend for &B {
    async fn translate(&self, source: &str, target: &str, text: &str) -> TranslationResult<String> {
        (**self).translate(source, target, text).await
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    source: &'a str,
    target: &'a str,
    q: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

/// 基于 HTTP POST 的翻译服务
#[derive(Debug, Clone)]
pub struct HttpTranslationBackend {
    client: reqwest::Client,
    api_url: String,
}

impl HttpTranslationBackend {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl TranslationBackend for HttpTranslationBackend {
    async fn translate(&self, source: &str, target: &str, text: &str) -> TranslationResult<String> {
        let request = TranslateRequest {
            source,
            target,
            q: text,
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: TranslateResponse = response.json().await?;

        body.translated_text.ok_or_else(|| {
            TranslationError::TranslationServiceError("响应缺少 translatedText 字段".to_string())
        })
    }
}
