//! Minimal XML-RPC request decoding: the method name and scalar parameters.

use roxmltree::Node;
use serde::Serialize;
use thiserror::Error;

use crate::domain::types::ItemId;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("malformed XML-RPC payload: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("root element is <{0}>, expected <methodCall>")]
    UnexpectedRoot(String),
    #[error("payload has no methodName")]
    MissingMethod,
    #[error("parameter {index} is missing")]
    MissingParam { index: usize },
    #[error("parameter {index} is not an item id: {value:?}")]
    InvalidId { index: usize, value: String },
}

/// A decoded call. Non-scalar parameters (structs, arrays) are kept as
/// `None` so positional lookups stay aligned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteCall {
    pub method: String,
    pub params: Vec<Option<String>>,
}

impl RemoteCall {
    pub fn new(method: impl Into<String>, params: Vec<Option<String>>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    pub fn item_id(&self, index: usize) -> Result<ItemId, PayloadError> {
        let value = self
            .params
            .get(index)
            .and_then(Option::as_deref)
            .ok_or(PayloadError::MissingParam { index })?;

        value.parse().map_err(|_| PayloadError::InvalidId {
            index,
            value: value.to_string(),
        })
    }
}

/// Methods that resolve their item before the session sees the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EarlyMethod {
    #[serde(rename = "metaWeblog.getPost")]
    MetaWeblogGetPost,
    #[serde(rename = "wp.getPage")]
    WpGetPage,
}

impl EarlyMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "metaWeblog.getPost" => Some(Self::MetaWeblogGetPost),
            "wp.getPage" => Some(Self::WpGetPage),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MetaWeblogGetPost => "metaWeblog.getPost",
            Self::WpGetPage => "wp.getPage",
        }
    }

    /// Position of the item id among the call parameters.
    pub fn id_position(self) -> usize {
        match self {
            Self::MetaWeblogGetPost => 0,
            Self::WpGetPage => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EarlyTarget {
    pub method: EarlyMethod,
    pub id: ItemId,
}

pub fn parse_call(raw: &str) -> Result<RemoteCall, PayloadError> {
    let doc = roxmltree::Document::parse(raw)?;
    let root = doc.root_element();
    if root.tag_name().name() != "methodCall" {
        return Err(PayloadError::UnexpectedRoot(
            root.tag_name().name().to_string(),
        ));
    }

    let method = child_element(root, "methodName")
        .and_then(|node| node.text())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(PayloadError::MissingMethod)?;

    let params = child_element(root, "params")
        .map(|params| {
            params
                .children()
                .filter(|node| node.has_tag_name("param"))
                .map(|param| child_element(param, "value").and_then(scalar_value))
                .collect()
        })
        .unwrap_or_default();

    Ok(RemoteCall::new(method, params))
}

/// Finds the early-resolving method and its target in a raw request body.
/// `Ok(None)` when the body is for some other method.
pub fn detect_early_target(raw: &str) -> Result<Option<EarlyTarget>, PayloadError> {
    if !raw.contains("metaWeblog.getPost") && !raw.contains("wp.getPage") {
        return Ok(None);
    }

    let call = parse_call(raw)?;
    let Some(method) = EarlyMethod::from_name(&call.method) else {
        return Ok(None);
    };
    let id = call.item_id(method.id_position())?;
    Ok(Some(EarlyTarget { method, id }))
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(name))
}

fn scalar_value(value: Node) -> Option<String> {
    let typed = value.children().find(|child| child.is_element());
    match typed {
        None => Some(value.text().unwrap_or_default().trim().to_string()),
        Some(node) => match node.tag_name().name() {
            "int" | "i4" | "i8" | "string" | "boolean" | "double" => {
                Some(node.text().unwrap_or_default().trim().to_string())
            }
            _ => None,
        },
    }
}
