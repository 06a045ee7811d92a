use std::iter::FromIterator;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ISSUER: &str = "iss";
pub const SUBJECT: &str = "sub";
pub const AUDIENCE: &str = "aud";
pub const EXPIRATION: &str = "exp";
pub const NOT_BEFORE: &str = "nbf";
pub const ISSUED_AT: &str = "iat";
pub const JWT_ID: &str = "jti";

/// A set of JWT claims, or the attributes of a JWT header.
///
/// Values are arbitrary JSON. Registered claims such as `exp` or `aud` are
/// stored as given and never validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Claims(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// A string attribute. `None` if it is missing or not a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Set an attribute, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Set an attribute
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set the issuer
    pub fn with_issuer(self, issuer: impl Into<Value>) -> Self {
        self.with(ISSUER, issuer)
    }

    /// Set the subject
    pub fn with_subject(self, subject: impl Into<Value>) -> Self {
        self.with(SUBJECT, subject)
    }

    /// Set the audience
    pub fn with_audience(self, audience: impl Into<Value>) -> Self {
        self.with(AUDIENCE, audience)
    }

    /// Set the expiration time
    pub fn with_expiration(self, expires_at: impl Into<Value>) -> Self {
        self.with(EXPIRATION, expires_at)
    }

    /// Set the time the claims are not valid before
    pub fn with_not_before(self, not_before: impl Into<Value>) -> Self {
        self.with(NOT_BEFORE, not_before)
    }

    /// Set the creation time
    pub fn with_issued_at(self, issued_at: impl Into<Value>) -> Self {
        self.with(ISSUED_AT, issued_at)
    }

    /// Set the JWT identifier
    pub fn with_jwt_id(self, jwt_id: impl Into<Value>) -> Self {
        self.with(JWT_ID, jwt_id)
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Claims(map)
    }
}

impl From<Claims> for Value {
    fn from(claims: Claims) -> Self {
        Value::Object(claims.0)
    }
}

impl FromIterator<(String, Value)> for Claims {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Claims(Map::from_iter(iter))
    }
}

impl<'a> IntoIterator for &'a Claims {
    type Item = (&'a String, &'a Value);
    type IntoIter = serde_json::map::Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
