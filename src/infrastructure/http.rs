use crate::domain::form::FormData;
use crate::domain::ports::{PaymentGateway, ResponseBody, SubmissionResponse};
use crate::domain::status::StatusResponse;
use crate::error::{CheckoutError, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue, LOCATION};
use reqwest::redirect::Policy;
use url::Url;

pub const CSRF_HEADER: &str = "X-CSRFToken";

/// The payment server reached over HTTP.
///
/// Redirects are never followed. A submission answered with a `3xx` and a
/// `Location` header is reported as redirected to that target, even when it
/// points back at the form itself.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(base_url: Url) -> Result<Self> {
        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()?;
        Ok(Self::with_client(http, base_url))
    }

    /// `http` must be built with [`Policy::none`], otherwise redirects are
    /// consumed before they can be reported.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn status_url(&self, transaction_id: &str) -> Result<Url> {
        let mut url = self.base_url.join("/payments/api/status/")?;
        url.path_segments_mut()
            .map_err(|_| CheckoutError::Config(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(transaction_id)
            .push("");
        Ok(url)
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn submit(&self, action: &str, form: &FormData) -> Result<SubmissionResponse> {
        let url = self.base_url.join(action)?;

        let mut request = self.http.post(url).form(form);
        if let Some(token) = form.csrf_token() {
            request = request.header(CSRF_HEADER, token);
        }

        let response = request.send().await?;
        if response.status().is_redirection()
            && let Some(location) = response.headers().get(LOCATION)
        {
            let location = location
                .to_str()
                .map_err(|e| CheckoutError::Validation(format!("bad redirect location: {e}")))?;
            let target = response.url().join(location)?;
            tracing::debug!(%target, "submission redirected");
            return Ok(SubmissionResponse::Redirected(target));
        }

        let status = response.status().as_u16();
        let text = response.text().await?;
        Ok(SubmissionResponse::Body(ResponseBody { status, text }))
    }

    async fn fetch_status(&self, transaction_id: &str, token: &str) -> Result<StatusResponse> {
        let url = self.status_url(transaction_id)?;

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(CheckoutError::UnexpectedStatus { status, body });
        }

        Ok(response.json::<StatusResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_url() {
        let gateway = HttpGateway::new(Url::parse("https://pay.example.com/app/").unwrap()).unwrap();
        assert_eq!(
            gateway.status_url("TX-1").unwrap().as_str(),
            "https://pay.example.com/payments/api/status/TX-1/"
        );
        assert_eq!(
            gateway.status_url("a/b").unwrap().as_str(),
            "https://pay.example.com/payments/api/status/a%2Fb/"
        );
    }
}
