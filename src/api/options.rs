//! Per-call request options.

use std::fmt;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use url::form_urlencoded;

/// Scalar query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write_number(f, *n),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Write `n` the way a browser stringifies a number: exponent form outside
/// `[1e-6, 1e21)` with an explicit `+` on positive exponents, `Infinity`
/// for infinities and `0` for negative zero.
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_infinite() {
        return f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" });
    }
    if n == 0.0 {
        return f.write_str("0");
    }
    let magnitude = n.abs();
    if !n.is_nan() && !(1e-6..1e21).contains(&magnitude) {
        let exp = format!("{n:e}");
        return match exp.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                write!(f, "{mantissa}e+{exponent}")
            }
            _ => f.write_str(&exp),
        };
    }
    write!(f, "{n}")
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        // Widen through the shortest decimal form so 0.1f32 stays 0.1.
        let widened = value.to_string().parse().unwrap_or_else(|_| f64::from(value));
        Self::Float(widened)
    }
}

macro_rules! int_param {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

int_param!(i8, i16, i32, i64, u8, u16, u32);

// Values outside `i64` keep their exact digits as a string.
macro_rules! wide_int_param {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    i64::try_from(value).map_or_else(|_| Self::Str(value.to_string()), Self::Int)
                }
            }
        )*
    };
}

wide_int_param!(isize, u64, usize, i128, u128);

/// Ordered query parameters. `None` values are skipped when encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(Vec<(String, Option<ParamValue>)>);

impl QueryParams {
    /// Empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a present parameter.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.push((key.into(), Some(value.into())));
        self
    }

    /// Add a parameter that may be absent.
    #[must_use]
    pub fn with_opt<V: Into<ParamValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.0.push((key.into(), value.map(Into::into)));
        self
    }

    /// True when no parameters were added, present or absent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `application/x-www-form-urlencoded` string of the present values,
    /// in insertion order.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.0 {
            if let Some(value) = value {
                serializer.append_pair(key, &value.to_string());
            }
        }
        serializer.finish()
    }
}

/// Request options for [`ApiClient::api`](super::ApiClient::api).
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub(crate) params: QueryParams,
    pub(crate) method: Method,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Option<String>,
    pub(crate) timeout: Option<Duration>,
}

impl FetchOptions {
    /// `GET` with no params, headers or body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// HTTP method, `GET` by default.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Query parameters appended to the URL.
    #[must_use]
    pub fn params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    /// Set a header, replacing any default of the same name.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Merge `headers` in, replacing existing values of the same name.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Raw request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `data` as the JSON request body.
    pub fn json<B: Serialize + ?Sized>(self, data: &B) -> Result<Self, serde_json::Error> {
        Ok(self.body(serde_json::to_string(data)?))
    }

    /// Abort the request if it has not completed within `timeout`.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_skips_absent_values() {
        let params = QueryParams::new()
            .with("page", 2)
            .with_opt("search", None::<&str>)
            .with("active", true)
            .with_opt("sort", Some("name"));

        assert_eq!(params.to_query_string(), "page=2&active=true&sort=name");
    }

    #[test]
    fn test_query_string_encodes_values() {
        let params = QueryParams::new()
            .with("q", "a b&c=d")
            .with("ratio", 0.5)
            .with("tag", "é");

        assert_eq!(
            params.to_query_string(),
            "q=a+b%26c%3Dd&ratio=0.5&tag=%C3%A9"
        );
    }

    #[test]
    fn test_query_string_keeps_insertion_order() {
        let params = QueryParams::new().with("z", 1).with("a", 2).with("m", 3);
        assert_eq!(params.to_query_string(), "z=1&a=2&m=3");
    }

    #[test]
    fn test_only_absent_values_yield_empty_string() {
        let params = QueryParams::new().with_opt("x", None::<i32>);
        assert!(!params.is_empty());
        assert_eq!(params.to_query_string(), "");
    }

    #[test]
    fn test_param_value_display() {
        assert_eq!(ParamValue::from(3.0).to_string(), "3");
        assert_eq!(ParamValue::from(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(ParamValue::from(false).to_string(), "false");
        assert_eq!(ParamValue::from(-7i64).to_string(), "-7");
    }

    #[test]
    fn test_float_display_uses_exponent_at_extremes() {
        assert_eq!(ParamValue::from(123.5).to_string(), "123.5");
        assert_eq!(ParamValue::from(0.000_001).to_string(), "0.000001");
        assert_eq!(ParamValue::from(1e-7).to_string(), "1e-7");
        assert_eq!(ParamValue::from(-2.5e-8).to_string(), "-2.5e-8");
        assert_eq!(ParamValue::from(1e21).to_string(), "1e+21");
        assert_eq!(ParamValue::from(1.5e300).to_string(), "1.5e+300");
        assert_eq!(ParamValue::from(1e20).to_string(), "100000000000000000000");
        assert_eq!(ParamValue::from(-0.0).to_string(), "0");
        assert_eq!(ParamValue::from(f64::NAN).to_string(), "NaN");
        assert_eq!(ParamValue::from(f64::NEG_INFINITY).to_string(), "-Infinity");
    }

    #[test]
    fn test_wide_numeric_params() {
        let page: usize = 3;
        let params = QueryParams::new()
            .with("page", page)
            .with("offset", -4isize)
            .with("id", u64::MAX)
            .with("ratio", 0.1f32);

        assert_eq!(
            params.to_query_string(),
            "page=3&offset=-4&id=18446744073709551615&ratio=0.1"
        );
        assert_eq!(ParamValue::from(7u64), ParamValue::Int(7));
        assert_eq!(ParamValue::from(u64::MAX), ParamValue::Str(u64::MAX.to_string()));
    }

    #[test]
    fn test_fetch_options_builder() {
        let options = FetchOptions::new()
            .method(Method::POST)
            .json(&serde_json::json!({"name": "x"}))
            .expect("serializable");

        assert_eq!(options.method, Method::POST);
        assert_eq!(options.body.as_deref(), Some(r#"{"name":"x"}"#));
        assert!(options.timeout.is_none());
    }
}
