//! Web search: fetch a results page and have the worker model summarise it.

use super::{Worker, WorkerKind};
use crate::error::WorkerError;
use async_trait::async_trait;
use llm_client::{LlmClient, LlmRequest};
use sources::web::{build_search_url, strip_markup, truncate_chars};
use sources::HttpFetch;
use std::sync::Arc;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You summarise web search results about video games. \
Using only the page text you are given, answer the request with the most relevant \
recent facts (news, reviews, release information, prices). Say so plainly when the \
page text does not answer the request. Answer in the language of the request.";

pub struct WebSearchWorker {
    fetcher: Arc<dyn HttpFetch>,
    llm: Arc<dyn LlmClient>,
    model: Option<String>,
    endpoint: String,
    max_chars: usize,
}

impl WebSearchWorker {
    pub fn new(fetcher: Arc<dyn HttpFetch>, llm: Arc<dyn LlmClient>, endpoint: impl Into<String>) -> Self {
        Self {
            fetcher,
            llm,
            model: None,
            endpoint: endpoint.into(),
            max_chars: 4000,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Page text budget handed to the model
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }
}

#[async_trait]
impl Worker for WebSearchWorker {
    fn kind(&self) -> WorkerKind {
        WorkerKind::WebSearch
    }

    async fn execute(&self, task: &str) -> Result<String, WorkerError> {
        let url = build_search_url(&self.endpoint, task)?;
        let page = self.fetcher.get(&url).await?;

        let text = strip_markup(&page);
        let excerpt = truncate_chars(&text, self.max_chars);
        debug!(url = %url, page_chars = text.chars().count(), "Fetched search results");

        let user = format!(
            "Request: {}\n\nSearch results page text:\n{}",
            task, excerpt
        );
        let mut request = LlmRequest::new(SYSTEM_PROMPT, user);
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }
        Ok(self.llm.complete(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_client::LlmClientError;
    use parking_lot::Mutex;
    use sources::FetchError;

    struct FakeFetcher {
        page: Result<String, u16>,
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpFetch for FakeFetcher {
        async fn get(&self, url: &str) -> Result<String, FetchError> {
            self.urls.lock().push(url.to_string());
            match &self.page {
                Ok(page) => Ok(page.clone()),
                Err(status) => Err(FetchError::Status {
                    url: url.to_string(),
                    status: *status,
                }),
            }
        }
    }

    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn complete(&self, request: LlmRequest) -> Result<String, LlmClientError> {
            Ok(request.user)
        }
    }

    fn fetcher(page: Result<String, u16>) -> Arc<FakeFetcher> {
        Arc::new(FakeFetcher {
            page,
            urls: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_fetch_strip_and_truncate() {
        let fake = fetcher(Ok("<html><body><p>Elden Ring DLC announced</p><p>more text here</p></body></html>".to_string()));
        let worker = WebSearchWorker::new(fake.clone(), Arc::new(EchoLlm), "https://search.test/html/")
            .with_max_chars(25);

        let output = worker.execute("elden ring news").await.unwrap();
        assert!(output.contains("Elden Ring DLC announced"));
        assert!(!output.contains("<p>"));
        assert!(!output.contains("more text here"));

        let urls = fake.urls.lock();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("https://search.test/html/?q=elden"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_worker_error() {
        let worker = WebSearchWorker::new(fetcher(Err(503)), Arc::new(EchoLlm), "https://search.test/");
        let result = worker.execute("anything").await;
        assert!(matches!(
            result,
            Err(WorkerError::Fetch(FetchError::Status { status: 503, .. }))
        ));
    }

    #[tokio::test]
    async fn test_bad_endpoint_is_worker_error() {
        let worker = WebSearchWorker::new(fetcher(Ok(String::new())), Arc::new(EchoLlm), "not a url");
        assert!(matches!(
            worker.execute("x").await,
            Err(WorkerError::Fetch(FetchError::InvalidUrl(_)))
        ));
    }
}
