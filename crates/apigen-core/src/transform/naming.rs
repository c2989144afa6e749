use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase};

use crate::config::StringCase;
use crate::ir::HttpMethod;

/// Convert `name` to a case convention, sanitizing it into an identifier first.
/// The result never starts with a digit.
pub fn apply_case(name: &str, case: StringCase) -> String {
    let sanitized = sanitize_identifier(name);
    let cased = match case {
        StringCase::Camel => sanitized.to_lower_camel_case(),
        StringCase::Pascal => sanitized.to_pascal_case(),
        StringCase::Snake => sanitized.to_snake_case(),
        StringCase::ScreamingSnake => sanitized.to_shouty_snake_case(),
        StringCase::Preserve => sanitized,
    };
    // heck strips the leading `_` that `sanitize_identifier` added.
    if cased.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{cased}")
    } else {
        cased
    }
}

/// Keep alphanumeric runs joined by `_`. A leading digit gets a `_` prefix;
/// a name with no alphanumerics becomes `unnamed`.
pub fn sanitize_identifier(name: &str) -> String {
    let words: Vec<&str> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let joined = words.join("_");
    match joined.chars().next() {
        None => "unnamed".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{joined}"),
        Some(_) => joined,
    }
}

/// Name an operation after its method and path.
///
/// - `GET /users` → `listUsers`
/// - `GET /users/{userId}` → `getUser`
/// - `POST /users/{userId}/messages` → `createUsersMessages`
///
/// Parameter segments are dropped. When the path ends in a parameter the
/// last resource is singularized.
pub fn route_to_name(method: HttpMethod, path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let is_param = |segment: &&str| segment.starts_with('{') && segment.ends_with('}');
    let single = segments.last().is_some_and(is_param);

    let verb = match method {
        HttpMethod::Get if single => "get",
        HttpMethod::Get => "list",
        HttpMethod::Post => "create",
        HttpMethod::Put => "update",
        other => other.as_lower(),
    };

    let resources: Vec<&str> = segments.iter().copied().filter(|s| !is_param(s)).collect();
    let mut name = verb.to_string();
    for (i, resource) in resources.iter().enumerate() {
        if single && i + 1 == resources.len() {
            name.push_str(&singularize(resource).to_pascal_case());
        } else {
            name.push_str(&resource.to_pascal_case());
        }
    }
    name
}

/// English plural stripping good enough for resource names.
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies").filter(|s| !s.is_empty()) {
        return format!("{stem}y");
    }
    for suffix in ["ses", "xes", "zes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() && !stem.ends_with('s') => stem.to_string(),
        _ => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_case() {
        assert_eq!(apply_case("pet_store", StringCase::Pascal), "PetStore");
        assert_eq!(apply_case("PetStore", StringCase::Camel), "petStore");
        assert_eq!(apply_case("pet-store", StringCase::Camel), "petStore");
        assert_eq!(apply_case("PetStore", StringCase::Snake), "pet_store");
        assert_eq!(apply_case("PetStore", StringCase::ScreamingSnake), "PET_STORE");
        assert_eq!(apply_case("Pet.Store", StringCase::Preserve), "Pet_Store");
        assert_eq!(apply_case("application/json", StringCase::Pascal), "ApplicationJson");
    }

    #[test]
    fn test_leading_digit() {
        assert_eq!(sanitize_identifier("3d-model"), "_3d_model");
        assert_eq!(apply_case("3dModel", StringCase::Pascal), "_3dModel");
        assert_eq!(apply_case("3dModels", StringCase::Camel), "_3dModels");
        assert_eq!(apply_case("3d-model", StringCase::Snake), "_3d_model");
        assert_eq!(apply_case("3d-model", StringCase::Preserve), "_3d_model");
    }

    #[test]
    fn test_nothing_to_keep() {
        assert_eq!(sanitize_identifier("***"), "unnamed");
    }

    #[test]
    fn test_route_names() {
        assert_eq!(route_to_name(HttpMethod::Get, "/users"), "listUsers");
        assert_eq!(route_to_name(HttpMethod::Post, "/users"), "createUsers");
        assert_eq!(route_to_name(HttpMethod::Get, "/users/{userId}"), "getUser");
        assert_eq!(route_to_name(HttpMethod::Put, "/users/{userId}"), "updateUser");
        assert_eq!(route_to_name(HttpMethod::Delete, "/users/{userId}"), "deleteUser");
        assert_eq!(route_to_name(HttpMethod::Patch, "/users/{userId}"), "patchUser");
    }

    #[test]
    fn test_nested_route_names() {
        assert_eq!(
            route_to_name(HttpMethod::Get, "/users/{userId}/messages"),
            "listUsersMessages"
        );
        assert_eq!(
            route_to_name(HttpMethod::Get, "/users/{userId}/messages/{messageId}"),
            "getUsersMessage"
        );
    }

    #[test]
    fn test_route_without_resources() {
        assert_eq!(route_to_name(HttpMethod::Get, "/"), "list");
        assert_eq!(route_to_name(HttpMethod::Get, "/{id}"), "get");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("pets"), "pet");
        assert_eq!(singularize("address"), "address");
    }
}
