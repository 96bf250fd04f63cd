use crate::schema::Violation;
use crate::types::taxonomy::Taxonomy;

/// Maps a schema violation to the taxonomy attribute it concerns.
pub trait AttributeResolver {
    fn resolve_attribute(&self, violation: &Violation) -> Option<String>;
}

/// Structured path first, quoted message token as a fallback.
///
/// For `'title' is a required property` reported at `summary`, the compound
/// key `summary.title` wins over `summary`. Otherwise the longest tracked
/// prefix of the instance path's object keys is used, so a violation at
/// `summary.keywords.1` lands on `summary.keywords`.
pub struct PathThenMessageResolver<'a> {
    taxonomy: &'a Taxonomy,
}

impl<'a> PathThenMessageResolver<'a> {
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self { taxonomy }
    }

    fn compound(&self, violation: &Violation) -> Option<String> {
        let token = violation.quoted_token()?;
        let key = match violation.key_prefixes().first() {
            Some(parent) if parent.split('.').count() == violation.instance_path.len() => {
                format!("{parent}.{token}")
            }
            Some(_) => return None,
            None if violation.instance_path.is_empty() => token.to_string(),
            None => return None,
        };
        self.taxonomy.contains(&key).then_some(key)
    }
}

impl AttributeResolver for PathThenMessageResolver<'_> {
    fn resolve_attribute(&self, violation: &Violation) -> Option<String> {
        self.compound(violation).or_else(|| {
            violation
                .key_prefixes()
                .into_iter()
                .find(|prefix| self.taxonomy.contains(prefix))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PathSegment;
    use crate::types::version::SchemaVersion;

    fn violation(path: &[&str], message: &str) -> Violation {
        Violation {
            schema_path: vec!["properties".to_string()],
            instance_path: path
                .iter()
                .map(|segment| match segment.parse::<usize>() {
                    Ok(index) => PathSegment::Index(index),
                    Err(_) => PathSegment::Key((*segment).to_string()),
                })
                .collect(),
            keyword: "required".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn compound_key_from_path_and_quoted_token() {
        let taxonomy = Taxonomy::builtin(SchemaVersion::V2).expect("taxonomy");
        let resolver = PathThenMessageResolver::new(&taxonomy);
        let resolved = resolver.resolve_attribute(&violation(
            &["provenance", "temporal"],
            "'endDate' is a required property",
        ));
        assert_eq!(resolved.as_deref(), Some("provenance.temporal.endDate"));
    }

    #[test]
    fn root_required_uses_bare_token() {
        let taxonomy = Taxonomy::builtin(SchemaVersion::V1).expect("taxonomy");
        let resolver = PathThenMessageResolver::new(&taxonomy);
        let resolved =
            resolver.resolve_attribute(&violation(&[], "'abstract' is a required property"));
        assert_eq!(resolved.as_deref(), Some("abstract"));
    }

    #[test]
    fn longest_tracked_prefix_of_path() {
        let taxonomy = Taxonomy::builtin(SchemaVersion::V2).expect("taxonomy");
        let resolver = PathThenMessageResolver::new(&taxonomy);
        let resolved = resolver.resolve_attribute(&violation(
            &["summary", "keywords", "1"],
            "3 is not of type 'string'",
        ));
        assert_eq!(resolved.as_deref(), Some("summary.keywords"));

        let resolved = resolver.resolve_attribute(&violation(
            &["summary", "publisher", "name"],
            "5 is not of type 'string'",
        ));
        assert_eq!(resolved.as_deref(), Some("summary.publisher.name"));
    }

    #[test]
    fn untracked_violation_resolves_to_none() {
        let taxonomy = Taxonomy::builtin(SchemaVersion::V2).expect("taxonomy");
        let resolver = PathThenMessageResolver::new(&taxonomy);
        assert!(resolver
            .resolve_attribute(&violation(&[], "'unknownThing' is a required property"))
            .is_none());
        assert!(resolver
            .resolve_attribute(&violation(&["observations", "0"], "None is not of type 'object'"))
            .is_none());
    }
}
