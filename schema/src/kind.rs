// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The compiled type system (`§4.8`'s Kind table) and the validator that
//! walks an [`Ipld`] value against it, building a breadcrumb path as it
//! recurses so a failure can be reported as `field X -> list[i] -> map[k]`.

use crate::Error;
use dagipld::Ipld;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub enum Kind {
    Struct { fields: BTreeMap<String, FieldKind> },
    List(Box<Kind>),
    Map(Box<Kind>),
    String,
    Bool,
    Int,
    Float,
}

#[derive(Debug, Clone)]
pub struct FieldKind {
    pub kind: Kind,
    pub optional: bool,
}

fn as_mapping(value: &serde_yaml::Value, id: &str) -> Result<&serde_yaml::Mapping, Error> {
    value.as_mapping().ok_or_else(|| Error::MalformedBody {
        id: id.to_string(),
        message: "expected a mapping".to_string(),
    })
}

fn field_str<'a>(
    mapping: &'a serde_yaml::Mapping,
    key: &str,
    id: &str,
) -> Result<&'a str, Error> {
    mapping
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::MalformedBody {
            id: id.to_string(),
            message: format!("missing or non-string field `{key}`"),
        })
}

/// Compiles a raw YAML schema body into an executable [`Kind`] tree.
/// Recognises `kind: struct|list|map|string|bool|int|float`, `fields` (for
/// `struct`), `items` (for `list`), `values` (for `map`).
pub fn compile_kind(value: &serde_yaml::Value, id: &str) -> Result<Kind, Error> {
    let mapping = as_mapping(value, id)?;
    let kind_tag = field_str(mapping, "kind", id)?;

    match kind_tag {
        "string" => Ok(Kind::String),
        "bool" => Ok(Kind::Bool),
        "int" => Ok(Kind::Int),
        "float" => Ok(Kind::Float),
        "list" => {
            let items = mapping
                .get("items")
                .ok_or_else(|| Error::MalformedBody {
                    id: id.to_string(),
                    message: "list kind missing `items`".to_string(),
                })?;
            Ok(Kind::List(Box::new(compile_kind(items, id)?)))
        }
        "map" => {
            let values = mapping
                .get("values")
                .ok_or_else(|| Error::MalformedBody {
                    id: id.to_string(),
                    message: "map kind missing `values`".to_string(),
                })?;
            Ok(Kind::Map(Box::new(compile_kind(values, id)?)))
        }
        "struct" => {
            let fields_value =
                mapping.get("fields").ok_or_else(|| Error::MalformedBody {
                    id: id.to_string(),
                    message: "struct kind missing `fields`".to_string(),
                })?;
            let fields_mapping = as_mapping(fields_value, id)?;
            let mut fields = BTreeMap::new();
            for (key, spec) in fields_mapping {
                let name = key.as_str().ok_or_else(|| Error::MalformedBody {
                    id: id.to_string(),
                    message: "struct field name must be a string".to_string(),
                })?;
                let spec_mapping = as_mapping(spec, id)?;
                let ty = spec_mapping.get("type").ok_or_else(|| Error::MalformedBody {
                    id: id.to_string(),
                    message: format!("field `{name}` missing `type`"),
                })?;
                let optional = spec_mapping
                    .get("optional")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);
                fields.insert(
                    name.to_string(),
                    FieldKind {
                        kind: compile_kind(ty, id)?,
                        optional,
                    },
                );
            }
            Ok(Kind::Struct { fields })
        }
        other => Err(Error::MalformedBody {
            id: id.to_string(),
            message: format!("unknown kind `{other}`"),
        }),
    }
}

fn breadcrumb(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join(" -> ")
    }
}

/// Validates `value` against `kind`, read-only: it never mutates or
/// coerces the value (`§4.8`).
pub fn validate_kind(value: &Ipld, kind: &Kind, path: &mut Vec<String>) -> Result<(), Error> {
    match (kind, value) {
        (Kind::String, Ipld::String(_)) => Ok(()),
        (Kind::Bool, Ipld::Bool(_)) => Ok(()),
        (Kind::Int, Ipld::Integer(_)) => Ok(()),
        (Kind::Float, Ipld::Float(_)) => Ok(()),
        (Kind::List(item_kind), Ipld::List(items)) => {
            for (index, item) in items.iter().enumerate() {
                path.push(format!("list[{index}]"));
                let result = validate_kind(item, item_kind, path);
                path.pop();
                result?;
            }
            Ok(())
        }
        (Kind::Map(value_kind), Ipld::Map(map)) => {
            for (key, entry) in map {
                path.push(format!("map[{key}]"));
                let result = validate_kind(entry, value_kind, path);
                path.pop();
                result?;
            }
            Ok(())
        }
        (Kind::Struct { fields }, Ipld::Map(map)) => {
            for (name, field) in fields {
                match map.get(name) {
                    Some(entry) => {
                        path.push(format!("field {name}"));
                        let result = validate_kind(entry, &field.kind, path);
                        path.pop();
                        result?;
                    }
                    None if field.optional => {}
                    None => {
                        return Err(Error::Validation {
                            path: breadcrumb(path),
                            message: format!("missing required field `{name}`"),
                        })
                    }
                }
            }
            Ok(())
        }
        (kind, value) => Err(Error::Validation {
            path: breadcrumb(path),
            message: format!("expected {kind:?}, found {value:?}"),
        }),
    }
}
