use crate::VoucherError;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Either the issued code or the reason none was issued.
pub type VoucherResult = Result<String, VoucherError>;

/// Remote voucher issuance.
///
/// One call is one attempt; retrying is the caller's decision.
#[allow(async_fn_in_trait)]
pub trait VoucherService {
    async fn issue_voucher(&self, duration_seconds: u64) -> VoucherResult;
}

/// `GET <endpoint>?seconds=<n>` returning `{"voucherCode": "..."}`.
#[derive(Debug, Clone)]
pub struct HttpVoucherClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpVoucherClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, VoucherError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl VoucherService for HttpVoucherClient {
    async fn issue_voucher(&self, duration_seconds: u64) -> VoucherResult {
        log::debug!("requesting voucher for {}s from {}", duration_seconds, self.endpoint);

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("seconds", duration_seconds)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VoucherError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_voucher_response(&body)
    }
}

#[derive(Deserialize)]
struct VoucherBody {
    #[serde(rename = "voucherCode")]
    voucher_code: Option<Value>,
}

/// Extract the voucher code from a response body.
///
/// Numeric codes are accepted and rendered as decimal. An empty string, a
/// `null`, or an absent field is `MissingCode`. Codes containing control
/// characters are rejected because they would break line framing on the
/// serial link.
pub fn parse_voucher_response(body: &str) -> VoucherResult {
    let parsed: VoucherBody = serde_json::from_str(body)?;

    let code = match parsed.voucher_code {
        Some(Value::String(code)) => code,
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Null) | None => return Err(VoucherError::MissingCode),
        Some(other) => {
            return Err(VoucherError::Decode(format!("voucherCode is not a string: {other}")));
        }
    };

    if code.is_empty() {
        return Err(VoucherError::MissingCode);
    }
    if code.chars().any(char::is_control) {
        return Err(VoucherError::Decode(format!("voucherCode contains control characters: {code:?}")));
    }

    Ok(code)
}
