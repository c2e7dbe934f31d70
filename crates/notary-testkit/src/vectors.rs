//! Golden test vectors for cross-implementation verification.
//!
//! Tokens were produced by the JavaScript implementation deployed against
//! live ledgers. Every implementation must reproduce them byte for byte.

use notary_core::{CanonicalEncoder, ContentAddresser, Token};
use serde_json::Value;

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Short identifier.
    pub name: &'static str,
    /// What the vector exercises.
    pub description: &'static str,
    /// Input value as JSON text, keys in arbitrary order.
    pub input: &'static str,
    /// Expected canonical text, where pinned.
    pub canonical: Option<&'static str>,
    /// Expected token (lowercase hex SHA-1).
    pub token: &'static str,
}

impl GoldenVector {
    /// Parse the input text.
    pub fn value(&self) -> Value {
        serde_json::from_str(self.input).expect("golden vector input is valid JSON")
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "unknown_keys_after_known",
            description: "Keys missing from the table follow every known key",
            input: r#"{"zeta":1,"alpha":"a","time":"2024-01-01T00:00:00.000Z","statement":"org.nerdster"}"#,
            canonical: None,
            token: "65d653c8abfc27a556b8137a78b2f61c8c776e44",
        },
        GoldenVector {
            name: "signature_last",
            description: "Signature moves to the end and is hashed",
            input: r#"{"signature":"c0ffee","previous":"0000000000000000000000000000000000000000","I":{"x":"k","kty":"OKP","crv":"Ed25519"},"rate":"subject-token","time":"2024-01-02T00:00:00.000Z","statement":"org.nerdster"}"#,
            canonical: Some(
                "{\n  \"statement\": \"org.nerdster\",\n  \"time\": \"2024-01-02T00:00:00.000Z\",\n  \"I\": {\n    \"crv\": \"Ed25519\",\n    \"kty\": \"OKP\",\n    \"x\": \"k\"\n  },\n  \"rate\": \"subject-token\",\n  \"previous\": \"0000000000000000000000000000000000000000\",\n  \"signature\": \"c0ffee\"\n}",
            ),
            token: "ee50933fb49b06951b57e14d579c7bd51276b54d",
        },
        GoldenVector {
            name: "nested_with",
            description: "Nested subject and with objects are ordered recursively",
            input: r#"{"statement":"org.nerdster","time":"2024-01-03T00:00:00.000Z","rate":{"title":"Dune","contentType":"book","author":"Frank Herbert"},"with":{"tags":["sf","classic"],"recommend":true,"stars":5},"comment":"re-read"}"#,
            canonical: None,
            token: "a8d1b4c9632a41066bef9a3a599af1a5d31096e5",
        },
        GoldenVector {
            name: "array_order_preserved",
            description: "Arrays keep their order; objects inside them are ordered",
            input: r#"{"list":[3,1,2],"nested":[{"b":1,"a":2},{"time":"x","statement":"y"}]}"#,
            canonical: None,
            token: "dd54780d997765a79d58f8e520d70dc1b03c4f4d",
        },
        GoldenVector {
            name: "numbers",
            description: "Numbers print as ECMAScript does",
            input: r#"{"stars":4.5,"tiny":1e-7,"small":0.000001,"huge":1e21,"neg":-0.25,"int":2,"big":123456789012345680000}"#,
            canonical: Some(
                "{\n  \"stars\": 4.5,\n  \"big\": 123456789012345680000,\n  \"huge\": 1e+21,\n  \"int\": 2,\n  \"neg\": -0.25,\n  \"small\": 0.000001,\n  \"tiny\": 1e-7\n}",
            ),
            token: "c2cbffe0a32577aa900507e87dc099f45fcd6631",
        },
        GoldenVector {
            name: "unicode_and_escapes",
            description: "Unknown keys compare by UTF-16 code unit; JSON escapes are minimal",
            input: r#"{"comment":"café ☕ \"quoted\" back\\slash\nnew\ttab \u0001 /","😀":"emoji key","ﬀ":"ligature key","e":"ascii"}"#,
            canonical: Some(
                "{\n  \"comment\": \"café ☕ \\\"quoted\\\" back\\\\slash\\nnew\\ttab \\u0001 /\",\n  \"e\": \"ascii\",\n  \"😀\": \"emoji key\",\n  \"ﬀ\": \"ligature key\"\n}",
            ),
            token: "c7fb397eee977f1fa97cd1af8e9cad68975b0431",
        },
        GoldenVector {
            name: "empty_containers",
            description: "Empty objects and arrays, null and false",
            input: r#"{"with":{},"tags":[],"x":null,"flag":false}"#,
            canonical: None,
            token: "e01a53cdbe55ae0df8a94df0222e4ef692d43811",
        },
        GoldenVector {
            name: "empty_signature_dropped",
            description: "An empty signature is not emitted",
            input: r#"{"rate":"s","signature":"","time":"2024-01-04T00:00:00.000Z"}"#,
            canonical: None,
            token: "aacde4e3562736b3212a374ec1219511b4886012",
        },
        GoldenVector {
            name: "relate_pair",
            description: "Relational statement with a paired subject",
            input: r#"{"statement":"org.nerdster","time":"2024-01-05T00:00:00.000Z","relate":"aaaa","with":{"otherSubject":{"url":"https://example.com","contentType":"article"}}}"#,
            canonical: None,
            token: "ab94ea54f32989b40ca8ab96c026a298a51dc004",
        },
    ]
}

/// Check every vector against an addresser.
///
/// Returns `(name, matches, computed token)` per vector.
pub fn verify_all_vectors(addresser: &ContentAddresser) -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let computed = addresser
                .token(&v.value())
                .map(Token::into_string)
                .unwrap_or_else(|e| format!("error: {}", e));
            (v.name.to_string(), computed == v.token, computed)
        })
        .collect()
}

/// Check the pinned canonical texts.
///
/// Returns `(name, matches, computed text)` for vectors that pin one.
pub fn verify_canonical_texts(encoder: &CanonicalEncoder) -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .filter_map(|v| {
            let expected = v.canonical?;
            let computed = encoder
                .canonical_text(&v.value())
                .unwrap_or_else(|e| format!("error: {}", e));
            Some((v.name.to_string(), computed == expected, computed))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, computed) in verify_all_vectors(&ContentAddresser::default()) {
            assert!(matches, "vector '{}' hashed to {}", name, computed);
        }
    }

    #[test]
    fn test_canonical_texts_match() {
        let results = verify_canonical_texts(&CanonicalEncoder::default());
        assert_eq!(results.len(), 3);
        for (name, matches, computed) in results {
            assert!(matches, "vector '{}' encoded as:\n{}", name, computed);
        }
    }

    #[test]
    fn test_vector_names_unique() {
        let vectors = all_vectors();
        let names: HashSet<_> = vectors.iter().map(|v| v.name).collect();
        assert_eq!(names.len(), vectors.len());
    }
}
