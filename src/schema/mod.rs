//! Draft-07 JSON Schema validation over `serde_json::Value`.
//!
//! Violations are collected, not short-circuited, and carry both the
//! instance path and the schema path so callers can attribute them to a
//! metadata field. Messages follow the phrasing of the Python `jsonschema`
//! package, which the attribution fallback depends on (`'title' is a
//! required property`).

pub mod format;
pub mod resolve;

use crate::error::{QualityError, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// One schema violation. Ordering is schema path, then instance path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Violation {
    pub schema_path: Vec<String>,
    pub instance_path: Vec<PathSegment>,
    pub keyword: String,
    pub message: String,
}

impl Violation {
    pub fn joined_path(&self) -> String {
        self.instance_path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Dotted prefixes of the leading object keys, longest first.
    /// `summary.keywords.0` yields `summary.keywords`, then `summary`.
    pub fn key_prefixes(&self) -> Vec<String> {
        let keys: Vec<&str> = self
            .instance_path
            .iter()
            .map_while(|segment| match segment {
                PathSegment::Key(key) => Some(key.as_str()),
                PathSegment::Index(_) => None,
            })
            .collect();
        (1..=keys.len())
            .rev()
            .map(|len| keys[..len].join("."))
            .collect()
    }

    /// First single-quoted token in the message, if any.
    pub fn quoted_token(&self) -> Option<&str> {
        let mut parts = self.message.split('\'');
        parts.next()?;
        let token = parts.next()?;
        parts.next().map(|_| token)
    }
}

#[derive(Debug, Default)]
struct Cursor {
    schema_path: Vec<String>,
    instance_path: Vec<PathSegment>,
}

impl Cursor {
    fn report(&self, out: &mut Vec<Violation>, keyword: &str, message: String) {
        let mut schema_path = self.schema_path.clone();
        schema_path.push(keyword.to_string());
        out.push(Violation {
            schema_path,
            instance_path: self.instance_path.clone(),
            keyword: keyword.to_string(),
            message,
        });
    }
}

/// A compiled schema document. Patterns are compiled and local `$ref`s
/// resolved up front so that malformed schemas fail before any record is
/// validated.
#[derive(Debug, Clone)]
pub struct Schema {
    root: Value,
    patterns: HashMap<String, Regex>,
}

impl Schema {
    pub fn compile(root: Value) -> Result<Self> {
        if !root.is_object() && !root.is_boolean() {
            return Err(QualityError::Schema(
                "schema document must be an object or boolean".to_string(),
            ));
        }
        let mut patterns = HashMap::new();
        walk(&root, &root, &mut patterns, "#")?;
        Ok(Self { root, patterns })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(content)
            .map_err(|e| QualityError::Schema(format!("invalid schema JSON: {e}")))?;
        Self::compile(root)
    }

    /// Top-level `properties` keys.
    pub fn property_names(&self) -> Vec<&str> {
        self.root
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| properties.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// All violations of `instance`, sorted and de-duplicated.
    pub fn validate(&self, instance: &Value) -> Vec<Violation> {
        let mut out = Vec::new();
        let mut cursor = Cursor::default();
        self.check(&self.root, instance, &mut cursor, &mut out, 0);
        out.sort();
        out.dedup();
        out
    }

    fn valid_under(&self, schema: &Value, instance: &Value, depth: usize) -> bool {
        let mut out = Vec::new();
        let mut cursor = Cursor::default();
        self.check(schema, instance, &mut cursor, &mut out, depth);
        out.is_empty()
    }

    fn check(
        &self,
        schema: &Value,
        instance: &Value,
        cx: &mut Cursor,
        out: &mut Vec<Violation>,
        depth: usize,
    ) {
        if depth > MAX_DEPTH {
            return;
        }
        let map = match schema {
            Value::Object(map) => map,
            Value::Bool(false) => {
                cx.report(
                    out,
                    "false",
                    format!("False schema does not allow {}", repr(instance)),
                );
                return;
            }
            _ => return,
        };

        // draft-07: `$ref` overrides its sibling keywords
        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            if let Some(target) = resolve_ref(&self.root, reference) {
                cx.schema_path.push("$ref".to_string());
                self.check(target, instance, cx, out, depth + 1);
                cx.schema_path.pop();
            }
            return;
        }

        check_any_type(map, instance, cx, out);
        match instance {
            Value::String(text) => self.check_string(map, text, instance, cx, out),
            Value::Number(_) => check_number(map, instance, cx, out),
            Value::Object(object) => self.check_object(map, object, instance, cx, out, depth),
            Value::Array(items) => self.check_array(map, items, instance, cx, out, depth),
            _ => {}
        }
        self.check_combinators(map, instance, cx, out, depth);
    }

    fn descend(
        &self,
        keyword: &[&str],
        segment: Option<PathSegment>,
        schema: &Value,
        instance: &Value,
        cx: &mut Cursor,
        out: &mut Vec<Violation>,
        depth: usize,
    ) {
        for part in keyword {
            cx.schema_path.push((*part).to_string());
        }
        let pushed = segment.is_some();
        if let Some(segment) = segment {
            cx.instance_path.push(segment);
        }
        self.check(schema, instance, cx, out, depth + 1);
        if pushed {
            cx.instance_path.pop();
        }
        for _ in keyword {
            cx.schema_path.pop();
        }
    }

    fn check_string(
        &self,
        map: &Map<String, Value>,
        text: &str,
        instance: &Value,
        cx: &Cursor,
        out: &mut Vec<Violation>,
    ) {
        let length = text.chars().count() as u64;
        if let Some(min) = map.get("minLength").and_then(Value::as_u64) {
            if length < min {
                cx.report(out, "minLength", format!("{} is too short", repr(instance)));
            }
        }
        if let Some(max) = map.get("maxLength").and_then(Value::as_u64) {
            if length > max {
                cx.report(out, "maxLength", format!("{} is too long", repr(instance)));
            }
        }
        if let Some(pattern) = map.get("pattern").and_then(Value::as_str) {
            if let Some(regex) = self.patterns.get(pattern) {
                if !regex.is_match(text) {
                    cx.report(
                        out,
                        "pattern",
                        format!("{} does not match '{pattern}'", repr(instance)),
                    );
                }
            }
        }
        if let Some(name) = map.get("format").and_then(Value::as_str) {
            if !format::conforms(name, text) {
                cx.report(
                    out,
                    "format",
                    format!("{} is not a '{name}'", repr(instance)),
                );
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn check_object(
        &self,
        map: &Map<String, Value>,
        object: &Map<String, Value>,
        instance: &Value,
        cx: &mut Cursor,
        out: &mut Vec<Violation>,
        depth: usize,
    ) {
        if let Some(required) = map.get("required").and_then(Value::as_array) {
            for name in required.iter().filter_map(Value::as_str) {
                if !object.contains_key(name) {
                    cx.report(out, "required", format!("'{name}' is a required property"));
                }
            }
        }

        if let Some(min) = map.get("minProperties").and_then(Value::as_u64) {
            if (object.len() as u64) < min {
                cx.report(
                    out,
                    "minProperties",
                    format!("{} does not have enough properties", repr(instance)),
                );
            }
        }
        if let Some(max) = map.get("maxProperties").and_then(Value::as_u64) {
            if (object.len() as u64) > max {
                cx.report(
                    out,
                    "maxProperties",
                    format!("{} has too many properties", repr(instance)),
                );
            }
        }

        let properties = map.get("properties").and_then(Value::as_object);
        if let Some(properties) = properties {
            for (name, subschema) in properties {
                if let Some(child) = object.get(name) {
                    self.descend(
                        &["properties", name],
                        Some(PathSegment::Key(name.clone())),
                        subschema,
                        child,
                        cx,
                        out,
                        depth,
                    );
                }
            }
        }

        let pattern_properties = map.get("patternProperties").and_then(Value::as_object);
        if let Some(pattern_properties) = pattern_properties {
            for (pattern, subschema) in pattern_properties {
                let Some(regex) = self.patterns.get(pattern) else {
                    continue;
                };
                for (key, child) in object.iter().filter(|(key, _)| regex.is_match(key)) {
                    self.descend(
                        &["patternProperties", pattern],
                        Some(PathSegment::Key(key.clone())),
                        subschema,
                        child,
                        cx,
                        out,
                        depth,
                    );
                }
            }
        }

        if let Some(additional) = map.get("additionalProperties") {
            let extras: Vec<&String> = object
                .keys()
                .filter(|key| !properties.is_some_and(|p| p.contains_key(key.as_str())))
                .filter(|key| {
                    !pattern_properties.is_some_and(|patterns| {
                        patterns.keys().any(|pattern| {
                            self.patterns
                                .get(pattern)
                                .is_some_and(|regex| regex.is_match(key))
                        })
                    })
                })
                .collect();
            match additional {
                Value::Bool(false) if !extras.is_empty() => {
                    let listed = extras
                        .iter()
                        .map(|key| format!("'{key}'"))
                        .collect::<Vec<_>>()
                        .join(", ");
                    let verb = if extras.len() == 1 { "was" } else { "were" };
                    cx.report(
                        out,
                        "additionalProperties",
                        format!("Additional properties are not allowed ({listed} {verb} unexpected)"),
                    );
                }
                Value::Object(_) => {
                    for key in extras {
                        if let Some(child) = object.get(key.as_str()) {
                            self.descend(
                                &["additionalProperties"],
                                Some(PathSegment::Key(key.clone())),
                                additional,
                                child,
                                cx,
                                out,
                                depth,
                            );
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(dependencies) = map.get("dependencies").and_then(Value::as_object) {
            for (trigger, dependency) in dependencies {
                if !object.contains_key(trigger) {
                    continue;
                }
                match dependency {
                    Value::Array(names) => {
                        for name in names.iter().filter_map(Value::as_str) {
                            if !object.contains_key(name) {
                                cx.report(
                                    out,
                                    "dependencies",
                                    format!("'{name}' is a dependency of '{trigger}'"),
                                );
                            }
                        }
                    }
                    _ => self.descend(
                        &["dependencies", trigger],
                        None,
                        dependency,
                        instance,
                        cx,
                        out,
                        depth,
                    ),
                }
            }
        }

        // Names are validated as string instances at the object's own path.
        if let Some(names) = map.get("propertyNames") {
            for key in object.keys() {
                self.descend(
                    &["propertyNames"],
                    None,
                    names,
                    &Value::String(key.clone()),
                    cx,
                    out,
                    depth,
                );
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn check_array(
        &self,
        map: &Map<String, Value>,
        items: &[Value],
        instance: &Value,
        cx: &mut Cursor,
        out: &mut Vec<Violation>,
        depth: usize,
    ) {
        if let Some(min) = map.get("minItems").and_then(Value::as_u64) {
            if (items.len() as u64) < min {
                cx.report(out, "minItems", format!("{} is too short", repr(instance)));
            }
        }
        if let Some(max) = map.get("maxItems").and_then(Value::as_u64) {
            if (items.len() as u64) > max {
                cx.report(out, "maxItems", format!("{} is too long", repr(instance)));
            }
        }
        if map.get("uniqueItems").and_then(Value::as_bool) == Some(true) {
            let duplicated = items.iter().enumerate().any(|(index, item)| {
                items[..index].iter().any(|earlier| json_equal(earlier, item))
            });
            if duplicated {
                cx.report(
                    out,
                    "uniqueItems",
                    format!("{} has non-unique elements", repr(instance)),
                );
            }
        }

        match map.get("items") {
            Some(Value::Array(tuple)) => {
                for (index, (subschema, item)) in tuple.iter().zip(items).enumerate() {
                    let position = index.to_string();
                    self.descend(
                        &["items", &position],
                        Some(PathSegment::Index(index)),
                        subschema,
                        item,
                        cx,
                        out,
                        depth,
                    );
                }
                if items.len() > tuple.len() {
                    match map.get("additionalItems") {
                        Some(Value::Bool(false)) => {
                            let listed = items[tuple.len()..]
                                .iter()
                                .map(repr)
                                .collect::<Vec<_>>()
                                .join(", ");
                            cx.report(
                                out,
                                "additionalItems",
                                format!("Additional items are not allowed ({listed} were unexpected)"),
                            );
                        }
                        Some(extra @ Value::Object(_)) => {
                            for (index, item) in items.iter().enumerate().skip(tuple.len()) {
                                self.descend(
                                    &["additionalItems"],
                                    Some(PathSegment::Index(index)),
                                    extra,
                                    item,
                                    cx,
                                    out,
                                    depth,
                                );
                            }
                        }
                        _ => {}
                    }
                }
            }
            Some(subschema @ (Value::Object(_) | Value::Bool(_))) => {
                for (index, item) in items.iter().enumerate() {
                    self.descend(
                        &["items"],
                        Some(PathSegment::Index(index)),
                        subschema,
                        item,
                        cx,
                        out,
                        depth,
                    );
                }
            }
            _ => {}
        }

        if let Some(contains) = map.get("contains") {
            if !items
                .iter()
                .any(|item| self.valid_under(contains, item, depth + 1))
            {
                cx.report(
                    out,
                    "contains",
                    format!("None of {} are valid under the given schema", repr(instance)),
                );
            }
        }
    }

    fn check_combinators(
        &self,
        map: &Map<String, Value>,
        instance: &Value,
        cx: &mut Cursor,
        out: &mut Vec<Violation>,
        depth: usize,
    ) {
        if let Some(all_of) = map.get("allOf").and_then(Value::as_array) {
            for (index, subschema) in all_of.iter().enumerate() {
                let position = index.to_string();
                self.descend(&["allOf", &position], None, subschema, instance, cx, out, depth);
            }
        }

        if let Some(any_of) = map.get("anyOf").and_then(Value::as_array) {
            if !any_of
                .iter()
                .any(|subschema| self.valid_under(subschema, instance, depth + 1))
            {
                cx.report(
                    out,
                    "anyOf",
                    format!("{} is not valid under any of the given schemas", repr(instance)),
                );
            }
        }

        if let Some(one_of) = map.get("oneOf").and_then(Value::as_array) {
            let matched = one_of
                .iter()
                .filter(|subschema| self.valid_under(subschema, instance, depth + 1))
                .count();
            if matched == 0 {
                cx.report(
                    out,
                    "oneOf",
                    format!("{} is not valid under any of the given schemas", repr(instance)),
                );
            } else if matched > 1 {
                cx.report(
                    out,
                    "oneOf",
                    format!(
                        "{} is valid under more than one of the given schemas",
                        repr(instance)
                    ),
                );
            }
        }

        if let Some(not) = map.get("not") {
            if self.valid_under(not, instance, depth + 1) {
                cx.report(
                    out,
                    "not",
                    format!("{} should not be valid under {}", repr(instance), repr(not)),
                );
            }
        }

        if let Some(condition) = map.get("if") {
            let branch = if self.valid_under(condition, instance, depth + 1) {
                "then"
            } else {
                "else"
            };
            if let Some(subschema) = map.get(branch) {
                self.descend(&[branch], None, subschema, instance, cx, out, depth);
            }
        }
    }
}

fn check_any_type(map: &Map<String, Value>, instance: &Value, cx: &Cursor, out: &mut Vec<Violation>) {
    if let Some(expected) = map.get("type") {
        let names: Vec<&str> = match expected {
            Value::String(name) => vec![name.as_str()],
            Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };
        if !names.is_empty() && !names.iter().any(|name| matches_type(name, instance)) {
            let listed = names
                .iter()
                .map(|name| format!("'{name}'"))
                .collect::<Vec<_>>()
                .join(", ");
            cx.report(out, "type", format!("{} is not of type {listed}", repr(instance)));
        }
    }

    if let Some(allowed) = map.get("enum").and_then(Value::as_array) {
        if !allowed.iter().any(|candidate| json_equal(candidate, instance)) {
            cx.report(
                out,
                "enum",
                format!(
                    "{} is not one of {}",
                    repr(instance),
                    repr(&Value::Array(allowed.clone()))
                ),
            );
        }
    }

    if let Some(expected) = map.get("const") {
        if !json_equal(expected, instance) {
            cx.report(out, "const", format!("{} was expected", repr(expected)));
        }
    }
}

fn check_number(map: &Map<String, Value>, instance: &Value, cx: &Cursor, out: &mut Vec<Violation>) {
    let Some(number) = instance.as_f64() else {
        return;
    };
    let limit = |key: &str| map.get(key).filter(|value| value.is_number());

    if let Some(minimum) = limit("minimum") {
        if number < minimum.as_f64().unwrap_or(f64::MIN) {
            cx.report(
                out,
                "minimum",
                format!("{} is less than the minimum of {}", repr(instance), repr(minimum)),
            );
        }
    }
    if let Some(maximum) = limit("maximum") {
        if number > maximum.as_f64().unwrap_or(f64::MAX) {
            cx.report(
                out,
                "maximum",
                format!("{} is greater than the maximum of {}", repr(instance), repr(maximum)),
            );
        }
    }
    if let Some(minimum) = limit("exclusiveMinimum") {
        if number <= minimum.as_f64().unwrap_or(f64::MIN) {
            cx.report(
                out,
                "exclusiveMinimum",
                format!(
                    "{} is less than or equal to the minimum of {}",
                    repr(instance),
                    repr(minimum)
                ),
            );
        }
    }
    if let Some(maximum) = limit("exclusiveMaximum") {
        if number >= maximum.as_f64().unwrap_or(f64::MAX) {
            cx.report(
                out,
                "exclusiveMaximum",
                format!(
                    "{} is greater than or equal to the maximum of {}",
                    repr(instance),
                    repr(maximum)
                ),
            );
        }
    }
    if let Some(divisor) = limit("multipleOf").and_then(Value::as_f64) {
        if divisor > 0.0 && ((number / divisor).fract()).abs() > 1e-9 {
            cx.report(
                out,
                "multipleOf",
                format!("{} is not a multiple of {divisor}", repr(instance)),
            );
        }
    }
}

fn matches_type(name: &str, instance: &Value) -> bool {
    match name {
        "null" => instance.is_null(),
        "boolean" => instance.is_boolean(),
        "object" => instance.is_object(),
        "array" => instance.is_array(),
        "string" => instance.is_string(),
        "number" => instance.is_number(),
        "integer" => match instance {
            Value::Number(number) => {
                number.is_i64()
                    || number.is_u64()
                    || number.as_f64().is_some_and(|value| value.fract() == 0.0)
            }
            _ => false,
        },
        _ => true,
    }
}

fn resolve_ref<'a>(root: &'a Value, reference: &str) -> Option<&'a Value> {
    match reference {
        "#" => Some(root),
        _ => reference
            .strip_prefix('#')
            .filter(|pointer| pointer.starts_with('/'))
            .and_then(|pointer| root.pointer(pointer)),
    }
}

fn walk(
    node: &Value,
    root: &Value,
    patterns: &mut HashMap<String, Regex>,
    location: &str,
) -> Result<()> {
    let map = match node {
        Value::Object(map) => map,
        Value::Bool(_) => return Ok(()),
        _ => {
            return Err(QualityError::Schema(format!(
                "subschema at {location} must be an object or boolean"
            )))
        }
    };

    if let Some(reference) = map.get("$ref") {
        let reference = reference.as_str().ok_or_else(|| {
            QualityError::Schema(format!("$ref at {location} must be a string"))
        })?;
        if resolve_ref(root, reference).is_none() {
            return Err(QualityError::Schema(format!(
                "cannot resolve $ref '{reference}' at {location}"
            )));
        }
    }

    if let Some(pattern) = map.get("pattern").and_then(Value::as_str) {
        compile_pattern(pattern, patterns, location)?;
    }
    if let Some(pattern_properties) = map.get("patternProperties").and_then(Value::as_object) {
        for (pattern, subschema) in pattern_properties {
            compile_pattern(pattern, patterns, location)?;
            walk(subschema, root, patterns, &format!("{location}/patternProperties"))?;
        }
    }

    for keyword in ["properties", "definitions", "dependencies"] {
        if let Some(children) = map.get(keyword).and_then(Value::as_object) {
            for (name, child) in children {
                if child.is_object() || child.is_boolean() {
                    walk(child, root, patterns, &format!("{location}/{keyword}/{name}"))?;
                }
            }
        }
    }

    for keyword in [
        "additionalProperties",
        "additionalItems",
        "contains",
        "propertyNames",
        "not",
        "if",
        "then",
        "else",
    ] {
        if let Some(child) = map.get(keyword).filter(|c| c.is_object() || c.is_boolean()) {
            walk(child, root, patterns, &format!("{location}/{keyword}"))?;
        }
    }

    match map.get("items") {
        Some(Value::Array(children)) => {
            for (index, child) in children.iter().enumerate() {
                walk(child, root, patterns, &format!("{location}/items/{index}"))?;
            }
        }
        Some(child) => walk(child, root, patterns, &format!("{location}/items"))?,
        None => {}
    }

    for keyword in ["allOf", "anyOf", "oneOf"] {
        if let Some(children) = map.get(keyword).and_then(Value::as_array) {
            for (index, child) in children.iter().enumerate() {
                walk(child, root, patterns, &format!("{location}/{keyword}/{index}"))?;
            }
        }
    }

    Ok(())
}

fn compile_pattern(
    pattern: &str,
    patterns: &mut HashMap<String, Regex>,
    location: &str,
) -> Result<()> {
    if patterns.contains_key(pattern) {
        return Ok(());
    }
    let regex = Regex::new(pattern).map_err(|e| {
        QualityError::Schema(format!("invalid pattern '{pattern}' at {location}: {e}"))
    })?;
    patterns.insert(pattern.to_string(), regex);
    Ok(())
}

/// Python-style rendering used in violation messages.
pub fn repr(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => format!("'{text}'"),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(repr).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(map) => format!(
            "{{{}}}",
            map.iter()
                .map(|(key, value)| format!("'{key}': {}", repr(value)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn json_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, x)| b.get(key).is_some_and(|y| json_equal(x, y)))
        }
        _ => left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset_schema() -> Schema {
        Schema::compile(json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": ["id", "summary"],
            "properties": {
                "id": { "type": "string" },
                "summary": {
                    "type": "object",
                    "required": ["title", "abstract"],
                    "properties": {
                        "title": { "type": "string", "minLength": 2, "maxLength": 80 },
                        "abstract": { "type": "string" },
                        "keywords": { "type": "array", "items": { "type": "string" }, "minItems": 1 },
                        "contactPoint": { "$ref": "#/definitions/email" }
                    }
                },
                "provenance": {
                    "type": "object",
                    "properties": {
                        "temporal": {
                            "type": "object",
                            "properties": {
                                "accrualPeriodicity": { "$ref": "#/definitions/periodicity" },
                                "startDate": { "type": "string", "format": "date" }
                            }
                        }
                    }
                }
            },
            "definitions": {
                "email": { "type": "string", "format": "email" },
                "periodicity": { "enum": ["STATIC", "CONTINUOUS", "IRREGULAR", "DAILY"] }
            }
        }))
        .expect("schema should compile")
    }

    #[test]
    fn required_violation_reports_parent_path_and_quoted_name() {
        let violations = dataset_schema().validate(&json!({
            "id": "x",
            "summary": { "abstract": "text" }
        }));
        assert_eq!(violations.len(), 1);
        let violation = &violations[0];
        assert_eq!(violation.message, "'title' is a required property");
        assert_eq!(violation.joined_path(), "summary");
        assert_eq!(violation.quoted_token(), Some("title"));
        assert_eq!(violation.keyword, "required");
    }

    #[test]
    fn nested_violations_carry_full_instance_path() {
        let violations = dataset_schema().validate(&json!({
            "id": "x",
            "summary": { "title": "T", "abstract": 5, "keywords": ["a", 3], "contactPoint": "nobody" },
            "provenance": { "temporal": { "accrualPeriodicity": "WEEKLY", "startDate": "2020-13-01" } }
        }));
        let paths: Vec<String> = violations.iter().map(Violation::joined_path).collect();
        assert!(paths.contains(&"summary.title".to_string()), "minLength: {paths:?}");
        assert!(paths.contains(&"summary.abstract".to_string()));
        assert!(paths.contains(&"summary.keywords.1".to_string()));
        assert!(paths.contains(&"summary.contactPoint".to_string()));
        assert!(paths.contains(&"provenance.temporal.accrualPeriodicity".to_string()));
        assert!(paths.contains(&"provenance.temporal.startDate".to_string()));
        let periodicity = violations
            .iter()
            .find(|v| v.keyword == "enum")
            .expect("enum violation");
        assert!(periodicity.message.starts_with("'WEEKLY' is not one of ['STATIC'"));
        assert_eq!(
            periodicity.schema_path.first().map(String::as_str),
            Some("properties")
        );
        assert!(periodicity.schema_path.contains(&"$ref".to_string()));
    }

    #[test]
    fn type_message_matches_reference_phrasing() {
        let violations = dataset_schema().validate(&json!({ "id": 7, "summary": { "title": "Ok", "abstract": "a" } }));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].message, "7 is not of type 'string'");
        assert_eq!(violations[0].quoted_token(), Some("string"));
    }

    #[test]
    fn valid_document_has_no_violations() {
        let schema = dataset_schema();
        let violations = schema.validate(&json!({
            "id": "x",
            "summary": { "title": "Title", "abstract": "Abstract", "keywords": ["a"] },
            "provenance": { "temporal": { "accrualPeriodicity": "CONTINUOUS", "startDate": "2020-01-01" } }
        }));
        assert!(violations.is_empty(), "unexpected violations: {violations:?}");
    }

    #[test]
    fn validation_is_deterministic_and_sorted() {
        let schema = dataset_schema();
        let record = json!({ "summary": { "keywords": [] }, "provenance": { "temporal": { "startDate": "x" } } });
        let first = schema.validate(&record);
        let second = schema.validate(&record);
        assert_eq!(first, second);
        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(first, sorted);
    }

    #[test]
    fn combinators_and_additional_properties() {
        let schema = Schema::compile(json!({
            "type": "object",
            "properties": {
                "doi": { "anyOf": [ { "type": "null" }, { "type": "string", "pattern": "^10\\." } ] },
                "size": { "oneOf": [ { "type": "integer" }, { "type": "number", "minimum": 0 } ] },
                "flag": { "not": { "type": "string" } }
            },
            "additionalProperties": false
        }))
        .expect("schema should compile");
        let violations = schema.validate(&json!({ "doi": "doi:1", "size": 3, "flag": "x", "extra": 1 }));
        let keywords: Vec<&str> = violations.iter().map(|v| v.keyword.as_str()).collect();
        assert!(keywords.contains(&"anyOf"));
        assert!(keywords.contains(&"oneOf"));
        assert!(keywords.contains(&"not"));
        let additional = violations
            .iter()
            .find(|v| v.keyword == "additionalProperties")
            .expect("additional properties violation");
        assert_eq!(
            additional.message,
            "Additional properties are not allowed ('extra' was unexpected)"
        );
        assert!(schema.validate(&json!({ "doi": null, "size": 2.5 })).is_empty());
    }

    #[test]
    fn compile_rejects_bad_patterns_and_dangling_refs() {
        let err = Schema::compile(json!({ "properties": { "a": { "pattern": "(" } } }))
            .expect_err("invalid regex should fail");
        assert!(err.to_string().contains("invalid pattern"));

        let err = Schema::compile(json!({ "properties": { "a": { "$ref": "#/definitions/missing" } } }))
            .expect_err("dangling ref should fail");
        assert!(err.to_string().contains("#/definitions/missing"));

        assert!(Schema::compile(json!("schema")).is_err());
    }

    #[test]
    fn property_names_keyword_checks_every_key() {
        let schema = Schema::compile(json!({
            "type": "object",
            "properties": {
                "summary": {
                    "type": "object",
                    "propertyNames": { "pattern": "^[a-z][A-Za-z]*$", "maxLength": 8 }
                }
            }
        }))
        .expect("schema should compile");
        let violations = schema.validate(&json!({
            "summary": { "title": "T", "Doi_name": "x", "contactPoint": "a@b" }
        }));
        let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(violations.len(), 2, "{messages:?}");
        assert!(messages.contains(&"'Doi_name' does not match '^[a-z][A-Za-z]*$'"));
        assert!(messages.contains(&"'contactPoint' is too long"));
        assert!(violations.iter().all(|v| v.joined_path() == "summary"));
        assert!(schema
            .validate(&json!({ "summary": { "title": "T" } }))
            .is_empty());
    }

    #[test]
    fn property_names_lists_top_level_properties() {
        let schema = dataset_schema();
        assert_eq!(schema.property_names(), vec!["id", "summary", "provenance"]);
    }

    #[test]
    fn key_prefixes_stop_at_array_indices() {
        let violation = Violation {
            schema_path: vec![],
            instance_path: vec![
                PathSegment::Key("structuralMetadata".to_string()),
                PathSegment::Key("dataClasses".to_string()),
                PathSegment::Index(0),
                PathSegment::Key("label".to_string()),
            ],
            keyword: "type".to_string(),
            message: "5 is not of type 'string'".to_string(),
        };
        assert_eq!(
            violation.key_prefixes(),
            vec![
                "structuralMetadata.dataClasses".to_string(),
                "structuralMetadata".to_string()
            ]
        );
        assert_eq!(violation.joined_path(), "structuralMetadata.dataClasses.0.label");
    }
}
