//! Route labels for spans and metrics.

use uuid::Uuid;

/// Collapse identifiers in `path` so every order or variant shares one label.
pub(super) fn route_label(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut normalised = String::from("/");

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            normalised.push('/');
        }

        if Uuid::parse_str(segment).is_ok() {
            normalised.push_str("{uuid}");
        } else {
            normalised.push_str(segment);
        }
    }

    normalised
}

#[cfg(test)]
mod tests {
    use super::route_label;

    #[test]
    fn replaces_uuid_segments() {
        assert_eq!(
            route_label("/orders/0190a9f2-7b1c-7c3e-9f41-6b2d5a8e0c11/confirm"),
            "/orders/{uuid}/confirm"
        );
    }

    #[test]
    fn leaves_static_paths_alone() {
        assert_eq!(route_label("/cart/items"), "/cart/items");
        assert_eq!(route_label("/"), "/");
    }
}
