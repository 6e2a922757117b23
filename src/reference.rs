//! Class reference links.
//!
//! Turns shorthand like `method Node._ready` into a link to the engine's
//! class reference:
//!
//! ```text
//! "Node"                       → class_node.html                          Node
//! "class Node"                 → class_node.html                          Node
//! "method Node.get_child"      → class_node.html#class-node-method-get-child   Node.get_child()
//! "method Node._ready"         → class_node.html#class-node-private-method-ready Node._ready()
//! "property Node2D.position"   → class_node2d.html#class-node2d-property-position Node2D.position
//! ```
//!
//! The kind word is optional and defaults to `class`. For class references
//! any `.Member` part is dropped; every other kind requires one. Unknown kind
//! words pass through into the anchor unchanged.

use crate::config::LinksConfig;
use maud::{Markup, html};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Malformed reference '{token}': {reason}")]
    MalformedReference { token: String, reason: &'static str },
}

/// What a reference points at. Names the anchor section in the class page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefKind {
    Class,
    Method,
    Property,
    Signal,
    Constant,
    Enum,
    Annotation,
    Constructor,
    Operator,
    Other(String),
}

impl RefKind {
    pub fn parse(word: &str) -> Self {
        match word {
            "class" => RefKind::Class,
            "method" => RefKind::Method,
            "property" => RefKind::Property,
            "signal" => RefKind::Signal,
            "constant" => RefKind::Constant,
            "enum" => RefKind::Enum,
            "annotation" => RefKind::Annotation,
            "constructor" => RefKind::Constructor,
            "operator" => RefKind::Operator,
            other => RefKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RefKind::Class => "class",
            RefKind::Method => "method",
            RefKind::Property => "property",
            RefKind::Signal => "signal",
            RefKind::Constant => "constant",
            RefKind::Enum => "enum",
            RefKind::Annotation => "annotation",
            RefKind::Constructor => "constructor",
            RefKind::Operator => "operator",
            RefKind::Other(word) => word,
        }
    }
}

/// A parsed reference token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: RefKind,
    pub class: String,
    /// Always `Some` unless `kind` is `Class`.
    pub member: Option<String>,
}

impl Reference {
    pub fn parse(token: &str) -> Result<Self, ReferenceError> {
        let malformed = |reason| ReferenceError::MalformedReference {
            token: token.to_string(),
            reason,
        };

        let words: Vec<&str> = token.split_whitespace().collect();
        let (kind, target) = match words.as_slice() {
            [] => return Err(malformed("empty reference")),
            [target] => (RefKind::Class, *target),
            [kind, target] => (RefKind::parse(kind), *target),
            _ => return Err(malformed("expected '<kind> <Class>.<Member>'")),
        };

        // The member ends at the next dot: `Node.a.b` names `a`.
        let (class, member) = match target.split_once('.') {
            Some((class, rest)) => (class, rest.split('.').next()),
            None => (target, None),
        };
        if class.is_empty() {
            return Err(malformed("missing class name"));
        }

        let member = match (&kind, member) {
            (RefKind::Class, _) => None,
            (_, Some(member)) if !member.is_empty() => Some(member.to_string()),
            _ => return Err(malformed("missing '.Member' after the class name")),
        };

        Ok(Self {
            kind,
            class: class.to_string(),
            member,
        })
    }

    /// `_`-prefixed methods are virtual/private and anchored separately.
    pub fn is_private_method(&self) -> bool {
        self.kind == RefKind::Method
            && self.member.as_deref().is_some_and(|m| m.starts_with('_'))
    }

    /// Anchor within the class page, `None` for class references.
    pub fn fragment(&self) -> Option<String> {
        let member = self.member.as_deref()?;
        let kind = if self.is_private_method() {
            "private-method"
        } else {
            self.kind.as_str()
        };
        let escaped = member.replace('_', "-");
        let escaped = escaped.strip_prefix('-').unwrap_or(&escaped);
        Some(format!(
            "class-{}-{}-{}",
            self.class.to_lowercase(),
            kind,
            escaped
        ))
    }

    pub fn url(&self, base_url: &str) -> String {
        let page = format!(
            "{}/class_{}.html",
            base_url.trim_end_matches('/'),
            self.class.to_lowercase()
        );
        match self.fragment() {
            Some(fragment) => format!("{page}#{fragment}"),
            None => page,
        }
    }

    pub fn link_text(&self) -> String {
        match &self.member {
            None => self.class.clone(),
            Some(member) if self.kind == RefKind::Method => {
                format!("{}.{}()", self.class, member)
            }
            Some(member) => format!("{}.{}", self.class, member),
        }
    }
}

/// Render a reference as `<a class="gd-link" href="…"><code>text</code></a>`.
pub fn render_reference(token: &str, links: &LinksConfig) -> Result<Markup, ReferenceError> {
    let reference = Reference::parse(token)?;
    let target = links.new_tab.then_some("_blank");
    Ok(html! {
        a class=(links.class) href=(reference.url(&links.base_url)) target=[target] {
            code { (reference.link_text()) }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://docs.godotengine.org/en/stable/classes";

    fn url(token: &str) -> String {
        Reference::parse(token).unwrap().url(BASE)
    }

    fn text(token: &str) -> String {
        Reference::parse(token).unwrap().link_text()
    }

    #[test]
    fn bare_class() {
        assert_eq!(url("Node"), format!("{BASE}/class_node.html"));
        assert_eq!(text("Node"), "Node");
    }

    #[test]
    fn explicit_class_kind() {
        assert_eq!(url("class CharacterBody2D"), format!("{BASE}/class_characterbody2d.html"));
        assert_eq!(text("class CharacterBody2D"), "CharacterBody2D");
    }

    #[test]
    fn bare_token_with_member_defaults_to_class() {
        let reference = Reference::parse("Node.name").unwrap();
        assert_eq!(reference.kind, RefKind::Class);
        assert_eq!(reference.member, None);
        assert_eq!(reference.link_text(), "Node");
    }

    #[test]
    fn public_method() {
        assert_eq!(
            url("method Node.get_child"),
            format!("{BASE}/class_node.html#class-node-method-get-child")
        );
        assert_eq!(text("method Node.get_child"), "Node.get_child()");
    }

    #[test]
    fn private_method() {
        let reference = Reference::parse("method Node._ready").unwrap();
        assert!(reference.is_private_method());
        assert_eq!(
            reference.url(BASE),
            format!("{BASE}/class_node.html#class-node-private-method-ready")
        );
        assert_eq!(reference.link_text(), "Node._ready()");
    }

    #[test]
    fn underscore_property_is_not_private() {
        let reference = Reference::parse("property Node._x").unwrap();
        assert!(!reference.is_private_method());
        assert_eq!(
            reference.fragment().as_deref(),
            Some("class-node-property-x")
        );
        assert_eq!(reference.link_text(), "Node._x");
    }

    #[test]
    fn property_and_signal() {
        assert_eq!(
            url("property Node2D.global_position"),
            format!("{BASE}/class_node2d.html#class-node2d-property-global-position")
        );
        assert_eq!(
            url("signal Area2D.body_entered"),
            format!("{BASE}/class_area2d.html#class-area2d-signal-body-entered")
        );
    }

    #[test]
    fn unknown_kind_passes_through() {
        assert_eq!(
            Reference::parse("thing Node.x").unwrap().fragment().as_deref(),
            Some("class-node-thing-x")
        );
    }

    #[test]
    fn kind_spelling_is_kept() {
        assert_eq!(
            Reference::parse("theme_item Control.font").unwrap().fragment().as_deref(),
            Some("class-control-theme_item-font")
        );
        assert_eq!(
            Reference::parse("theme-item Control.font").unwrap().fragment().as_deref(),
            Some("class-control-theme-item-font")
        );
    }

    #[test]
    fn member_ends_at_next_dot() {
        let reference = Reference::parse("method Node.a.b").unwrap();
        assert_eq!(reference.member.as_deref(), Some("a"));
        assert_eq!(reference.fragment().as_deref(), Some("class-node-method-a"));
        assert_eq!(reference.link_text(), "Node.a()");
        assert!(Reference::parse("method Node..b").is_err());
    }

    #[test]
    fn base_url_trailing_slash() {
        let reference = Reference::parse("Node").unwrap();
        assert_eq!(
            reference.url("https://example.com/classes/"),
            "https://example.com/classes/class_node.html"
        );
    }

    #[test]
    fn malformed_references() {
        for token in ["", "   ", "method Node", "method Node.", "method .x", "a b c"] {
            assert!(
                matches!(
                    Reference::parse(token),
                    Err(ReferenceError::MalformedReference { .. })
                ),
                "{token:?}"
            );
        }
    }

    #[test]
    fn render_full_link() {
        let html = render_reference("method Node._ready", &LinksConfig::default())
            .unwrap()
            .into_string();
        assert_eq!(
            html,
            format!(
                r#"<a class="gd-link" href="{BASE}/class_node.html#class-node-private-method-ready" target="_blank"><code>Node._ready()</code></a>"#
            )
        );
    }

    #[test]
    fn render_without_new_tab() {
        let links = LinksConfig {
            new_tab: false,
            ..LinksConfig::default()
        };
        let html = render_reference("Node", &links).unwrap().into_string();
        assert!(!html.contains("target="));
        assert!(html.contains("<code>Node</code>"));
    }

    #[test]
    fn render_malformed_is_error() {
        assert!(render_reference("signal Node", &LinksConfig::default()).is_err());
    }
}
