//! Shape of the Node.js `all.json` API documentation corpus.
//!
//! Every nested field is optional in the published document, so each one
//! defaults to empty, whether it is missing or `null`, instead of failing
//! deserialization. Nested `methods` lists keep their presence: an explicit
//! empty list is rendered differently from an absent one. Fields the corpus
//! carries but the formatter never reads (events, properties, signatures...)
//! are ignored.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserializes `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Root of the corpus: `{ "modules": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDocs {
    #[serde(default, deserialize_with = "null_as_default")]
    pub modules: Vec<ApiModule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiModule {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text_raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Canonical identifier used for lookups, case-sensitive as published.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub classes: Vec<ApiClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<ApiMethod>>,
    #[serde(default, rename = "modules", deserialize_with = "null_as_default")]
    pub submodules: Vec<ApiModule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClass {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text_raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<ApiMethod>>,
}

/// Leaf node: anything nested below a method is not modeled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMethod {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text_raw: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ApiModule {
    /// The module's own methods, empty when the corpus lists none.
    pub fn methods(&self) -> &[ApiMethod] {
        self.methods.as_deref().unwrap_or_default()
    }

    /// Modules that are pure prose sections carry neither classes nor methods.
    pub fn has_api_items(&self) -> bool {
        !self.classes.is_empty() || !self.methods().is_empty()
    }
}

/// Common view over the node kinds a documentation section lists.
pub trait DocNode {
    fn text_raw(&self) -> &str;

    fn desc(&self) -> Option<&str>;

    /// Methods nested one level below this node, `None` when the node has
    /// no `methods` list at all.
    fn nested_methods(&self) -> Option<&[ApiMethod]> {
        None
    }
}

impl DocNode for ApiModule {
    fn text_raw(&self) -> &str {
        &self.text_raw
    }

    fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    fn nested_methods(&self) -> Option<&[ApiMethod]> {
        self.methods.as_deref()
    }
}

impl DocNode for ApiClass {
    fn text_raw(&self) -> &str {
        &self.text_raw
    }

    fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    fn nested_methods(&self) -> Option<&[ApiMethod]> {
        self.methods.as_deref()
    }
}

impl DocNode for ApiMethod {
    fn text_raw(&self) -> &str {
        &self.text_raw
    }

    fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }
}
