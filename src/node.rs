use ordered_float::OrderedFloat;
use std::fmt;
use std::sync::Arc;

/// A vertex of the graph.
///
/// Unlike [`oxrdf::Term`](https://docs.rs/oxrdf), a `Node` is not typed by a
/// lexical form and datatype IRI: it carries native scalar values directly,
/// the way the source dataset (IRIs/keywords, strings, numbers, booleans,
/// blank/internal node ids) represents them.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Node {
    /// An IRI or keyword-style name.
    Iri(Arc<str>),
    /// An internal or blank node identifier.
    BlankNode(u64),
    /// A string literal.
    String(Arc<str>),
    /// An integer literal.
    Integer(i64),
    /// A floating point literal.
    Float(OrderedFloat<f64>),
    /// A boolean literal.
    Boolean(bool),
}

impl Node {
    /// Builds an [`Node::Iri`] from any string-like value.
    pub fn iri(name: impl Into<Arc<str>>) -> Self {
        Self::Iri(name.into())
    }

    /// Builds a [`Node::String`] from any string-like value.
    pub fn string(value: impl Into<Arc<str>>) -> Self {
        Self::String(value.into())
    }

    /// Whether this node may serve as an intermediate hop during transitive
    /// path expansion.
    ///
    /// Literal-shaped nodes (strings, integers, floats, booleans) never act
    /// as intermediate path nodes; only IRIs and blank nodes do. This is the
    /// `isNode` collaborator of spec.md §6.2.
    #[must_use]
    pub fn is_node_typed(&self) -> bool {
        matches!(self, Self::Iri(_) | Self::BlankNode(_))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(name) => write!(f, "{name}"),
            Self::BlankNode(id) => write!(f, "_:b{id}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}

/// The reflexive-transitive (`*`) or plain-transitive (`+`) tag a predicate
/// name may carry, per spec.md §4.3 / §6.3.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum TransitiveTag {
    /// Reflexive-transitive closure (`*`): includes zero-length paths.
    Star,
    /// Transitive closure (`+`): excludes zero-length paths.
    Plus,
}

/// An edge label, optionally carrying a transitive-closure tag.
///
/// Two predicates are equal, hashed, and ordered purely on `name` — the
/// transitive tag is a query-time annotation, not part of the predicate's
/// identity inside the index (the index stores triples keyed by plain name
/// only).
#[derive(Clone, Debug)]
pub struct Predicate {
    name: Arc<str>,
    transitive: Option<TransitiveTag>,
}

impl Predicate {
    /// Builds a plain, untagged predicate.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            transitive: None,
        }
    }

    /// Parses a predicate name, extracting an in-name transitive tag per
    /// spec.md §6.3: a trailing `*` or `+` tags the predicate unless the
    /// character before it is an escaping `'`.
    ///
    /// `explicit_trans` overrides the in-name parse when `Some`: `Some(true)`
    /// selects `:star` even with no in-name tag, `Some(false)` suppresses
    /// any in-name tag.
    #[must_use]
    pub fn parse(raw: &str, explicit_trans: Option<bool>) -> Self {
        let (plain, in_name_tag) = split_transitive_tag(raw);
        let transitive = match explicit_trans {
            Some(true) => Some(TransitiveTag::Star),
            Some(false) => None,
            None => in_name_tag,
        };
        Self {
            name: plain.into(),
            transitive,
        }
    }

    /// The plain predicate name, with any trailing transitive tag removed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The predicate's transitive tag, if any.
    #[must_use]
    pub fn transitive(&self) -> Option<TransitiveTag> {
        self.transitive
    }

    /// A predicate equal to this one but stripped of any transitive tag, for
    /// use as an index key.
    #[must_use]
    pub fn untagged(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            transitive: None,
        }
    }
}

/// Splits a trailing `*`/`+` tag off a predicate name, per spec.md §6.3's
/// bit-exact rule: the character before the tag must not be `'`.
fn split_transitive_tag(raw: &str) -> (&str, Option<TransitiveTag>) {
    let bytes = raw.as_bytes();
    let len = bytes.len();
    if len < 2 {
        return (raw, None);
    }
    let last = bytes[len - 1];
    let before_last = bytes[len - 2];
    if before_last == b'\'' {
        return (raw, None);
    }
    match last {
        b'*' => (&raw[..len - 1], Some(TransitiveTag::Star)),
        b'+' => (&raw[..len - 1], Some(TransitiveTag::Plus)),
        _ => (raw, None),
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Predicate {}

impl std::hash::Hash for Predicate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Predicate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Predicate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        match self.transitive {
            Some(TransitiveTag::Star) => write!(f, "*"),
            Some(TransitiveTag::Plus) => write!(f, "+"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_predicate_has_no_tag() {
        let p = Predicate::parse("knows", None);
        assert_eq!(p.name(), "knows");
        assert!(p.transitive().is_none());
    }

    #[test]
    fn star_tag_is_parsed() {
        let p = Predicate::parse("knows*", None);
        assert_eq!(p.name(), "knows");
        assert_eq!(p.transitive(), Some(TransitiveTag::Star));
    }

    #[test]
    fn plus_tag_is_parsed() {
        let p = Predicate::parse("knows+", None);
        assert_eq!(p.name(), "knows");
        assert_eq!(p.transitive(), Some(TransitiveTag::Plus));
    }

    #[test]
    fn escaped_tag_is_not_a_tag() {
        let p = Predicate::parse("knows'*", None);
        assert_eq!(p.name(), "knows'*");
        assert!(p.transitive().is_none());
    }

    #[test]
    fn explicit_true_overrides_missing_in_name_tag() {
        let p = Predicate::parse("knows", Some(true));
        assert_eq!(p.transitive(), Some(TransitiveTag::Star));
    }

    #[test]
    fn explicit_false_suppresses_in_name_tag() {
        let p = Predicate::parse("knows*", Some(false));
        assert_eq!(p.name(), "knows");
        assert!(p.transitive().is_none());
    }

    #[test]
    fn predicate_equality_ignores_transitive_tag() {
        assert_eq!(Predicate::parse("knows*", None), Predicate::new("knows"));
    }

    #[test]
    fn node_literals_are_not_node_typed() {
        assert!(!Node::Integer(1).is_node_typed());
        assert!(!Node::string("x").is_node_typed());
        assert!(!Node::Boolean(true).is_node_typed());
        assert!(Node::iri("http://example.org/a").is_node_typed());
        assert!(Node::BlankNode(1).is_node_typed());
    }
}
