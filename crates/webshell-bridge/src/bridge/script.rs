//! Scripts evaluated in the WebView to deliver deferred results.

use serde_json::Value;

/// Receives the result of a `getLocation` that waited for a prompt.
pub const LOCATION_RESULT: &str = "handleLocationResult";
/// Receives the result of a `sendSMS` that waited for a prompt.
pub const SMS_RESULT: &str = "handleSmsResult";

/// `window.<function>(<arg>)` with `arg` encoded as a JS literal.
pub fn callback(function: &str, arg: &Value) -> String {
    format!("window.{function}({})", js_literal(arg))
}

/// `window.handleLocationResult("<json>")`: pages parse the location payload
/// themselves, so it travels as JSON text inside a string literal.
pub fn location_result(payload: &Value) -> String {
    callback(LOCATION_RESULT, &Value::String(payload.to_string()))
}

/// JSON text, with the two line terminators JSON allows but JS strings do not
/// escaped.
fn js_literal(value: &Value) -> String {
    value
        .to_string()
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn encodes_argument_as_json() {
        let script = callback(SMS_RESULT, &json!(true));
        assert_eq!(script, "window.handleSmsResult(true)");
    }

    #[test]
    fn location_payload_is_passed_as_json_text() {
        let script = location_result(&json!({"latitude": 1.5, "longitude": -2.0}));
        assert_eq!(
            script,
            r#"window.handleLocationResult("{\"latitude\":1.5,\"longitude\":-2.0}")"#
        );

        let error = location_result(&json!({"error": "it's \"off\""}));
        assert_eq!(
            error,
            r#"window.handleLocationResult("{\"error\":\"it's \\\"off\\\"\"}")"#
        );
    }

    #[test]
    fn quotes_cannot_break_out() {
        let script = callback(SMS_RESULT, &json!("\"); alert(1); //"));
        assert_eq!(script, r#"window.handleSmsResult("\"); alert(1); //")"#);
    }

    #[test]
    fn escapes_js_line_terminators() {
        let script = callback(SMS_RESULT, &json!("a\u{2028}b"));
        assert_eq!(script, r#"window.handleSmsResult("a\u2028b")"#);
    }
}
