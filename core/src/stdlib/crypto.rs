//! Crypto Package
//!
//! Functions: uuid (v4), base64Encode, base64Decode. Decoding malformed
//! input falls back to the empty string rather than raising.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use uuid::Uuid;

use crate::functions::{ArgKind, Category, FunctionRegistry, SafeFunction};
use crate::values::Value;

fn crypto_uuid(_args: &[Value]) -> Result<Value, String> {
    Ok(Value::str(Uuid::new_v4().to_string()))
}

fn crypto_base64_encode(args: &[Value]) -> Result<Value, String> {
    let text = args[0].to_string();
    Ok(Value::str(STANDARD.encode(text.as_bytes())))
}

fn crypto_base64_decode(args: &[Value]) -> Result<Value, String> {
    let text = args[0].as_str().unwrap();
    let decoded = STANDARD
        .decode(text.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_default();
    Ok(Value::str(decoded))
}

pub fn install(registry: &mut FunctionRegistry) {
    // registered under both bare and qualified names so `uuid()` and
    // `Crypto.uuid()` both resolve without a receiver
    for name in ["uuid", "Crypto.uuid"] {
        registry.register(
            SafeFunction::new(name, Category::Crypto, 0, crypto_uuid)
                .with_max(0)
                .with_description("Random UUID v4"),
        );
    }
    for name in ["base64Encode", "Crypto.base64Encode"] {
        registry.register(
            SafeFunction::new(name, Category::Crypto, 1, crypto_base64_encode)
                .with_max(1)
                .with_description("Standard base64 of the string form of the argument"),
        );
    }
    for name in ["base64Decode", "Crypto.base64Decode"] {
        registry.register(
            SafeFunction::new(name, Category::Crypto, 1, crypto_base64_decode)
                .with_max(1)
                .with_checks(&[ArgKind::Str])
                .with_description("Decode base64; empty string on malformed input"),
        );
    }
}
