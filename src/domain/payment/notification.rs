//! Signed notification body posted by the gateway to the notify URL.

use serde_json::Value;

use crate::domain::foundation::OutTradeNo;

use super::callback::{CallbackRejection, SUCCESS};

/// The fields of a verified notification that decide whether it completes an
/// order. Only parse a body after its signature has verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayNotification {
    pub out_trade_no: String,
    pub status: String,
}

impl GatewayNotification {
    /// Reads `outTradeNo` and `status` from a JSON notification, looking in
    /// `data` first and then at the top level. Form-encoded bodies are read
    /// the same way from their fields.
    pub fn parse(body: &[u8]) -> Result<Self, CallbackRejection> {
        let first = body.iter().find(|b| !b.is_ascii_whitespace());
        if first == Some(&b'{') {
            Self::from_json(body)
        } else {
            Self::from_form(body)
        }
    }

    fn from_json(body: &[u8]) -> Result<Self, CallbackRejection> {
        let json: Value = serde_json::from_slice(body)
            .map_err(|e| CallbackRejection::MalformedNotification(e.to_string()))?;

        let field = |name: &str| {
            json.get("data")
                .and_then(|data| data.get(name))
                .or_else(|| json.get(name))
                .and_then(Value::as_str)
                .map(str::to_owned)
        };

        Self::from_fields(field("outTradeNo"), field("status"))
    }

    fn from_form(body: &[u8]) -> Result<Self, CallbackRejection> {
        let mut out_trade_no = None;
        let mut status = None;
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "outTradeNo" => out_trade_no = Some(value.into_owned()),
                "status" => status = Some(value.into_owned()),
                _ => {}
            }
        }
        Self::from_fields(out_trade_no, status)
    }

    fn from_fields(
        out_trade_no: Option<String>,
        status: Option<String>,
    ) -> Result<Self, CallbackRejection> {
        let out_trade_no = out_trade_no
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| CallbackRejection::MalformedNotification("outTradeNo missing".into()))?;
        let status = status
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| CallbackRejection::MalformedNotification("status missing".into()))?;

        Ok(Self {
            out_trade_no,
            status,
        })
    }

    /// Rejects any status other than `SUCCESS`.
    pub fn require_success(&self) -> Result<(), CallbackRejection> {
        if self.status.trim() == SUCCESS {
            Ok(())
        } else {
            Err(CallbackRejection::StatusNotSuccess(self.status.clone()))
        }
    }

    /// Rejects a notification for a different attempt than `expected`.
    pub fn require_trade_number(&self, expected: &OutTradeNo) -> Result<(), CallbackRejection> {
        if self.out_trade_no.trim() == expected.as_str() {
            Ok(())
        } else {
            Err(CallbackRejection::TradeNumberMismatch)
        }
    }
}
