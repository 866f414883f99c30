use thiserror::Error;

/// Binance error codes that mean the key, signature or permissions were rejected.
const AUTH_ERROR_CODES: [i64; 3] = [-2014, -2015, -1022];

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The exchange answered with a non-2xx status.
    #[error("status {status}{}: {message}", code_suffix(.code))]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

fn code_suffix(code: &Option<i64>) -> String {
    match code {
        Some(code) => format!(" (code {code})"),
        None => String::new(),
    }
}

impl ExchangeError {
    /// HTTP status of the failed call, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ExchangeError::Http(e) => e.status().map(|s| s.as_u16()),
            ExchangeError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth_error(&self) -> bool {
        if self.status() == Some(401) {
            return true;
        }
        matches!(
            self,
            ExchangeError::Api { code: Some(code), .. } if AUTH_ERROR_CODES.contains(code)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status_code_and_message() {
        let err = ExchangeError::Api {
            status: 400,
            code: Some(-1121),
            message: "Invalid symbol.".to_string(),
        };
        assert_eq!(err.to_string(), "status 400 (code -1121): Invalid symbol.");

        let err = ExchangeError::Api {
            status: 502,
            code: None,
            message: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "status 502: Bad Gateway");
    }

    #[test]
    fn auth_errors_are_recognized() {
        let unauthorized = ExchangeError::Api {
            status: 401,
            code: Some(-2015),
            message: "Invalid API-key, IP, or permissions for action.".to_string(),
        };
        assert!(unauthorized.is_auth_error());

        let bad_signature = ExchangeError::Api {
            status: 400,
            code: Some(-1022),
            message: "Signature for this request is not valid.".to_string(),
        };
        assert!(bad_signature.is_auth_error());

        let rate_limited = ExchangeError::Api {
            status: 429,
            code: Some(-1003),
            message: "Too many requests".to_string(),
        };
        assert!(!rate_limited.is_auth_error());
        assert!(!ExchangeError::Other("boom".to_string()).is_auth_error());
    }
}
