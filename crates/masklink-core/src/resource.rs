//! Masking paths of a whole resource.

use serde_json::Value;

use crate::error::MaskError;
use crate::mask::{mask, MaskRequest};
use crate::pointer;

/// Relative path under a resource at which its nonce lives.
pub const NONCE_META_PATH: &str = "/_meta/nonce";

/// Inputs to [`mask_resource`].
#[derive(Debug, Clone, Default)]
pub struct MaskResourceRequest {
    pub resource: Value,
    /// Absolute URL of the resource; paths and the default nonceurl are
    /// derived from it.
    pub url_to_resource: Option<String>,
    /// JSON Pointers of the subtrees to redact.
    pub paths: Vec<String>,
    /// Shared by every path in this call; generated when `None`.
    pub nonce: Option<String>,
    /// Defaults to `url_to_resource + "/_meta/nonce"`.
    pub nonceurl: Option<String>,
}

/// Output of [`mask_resource`]. All fields are `None` when the caller
/// supplied no `url_to_resource`.
#[derive(Debug, Clone, Default)]
pub struct MaskedResource {
    pub nonce: Option<String>,
    pub resource: Option<Value>,
    pub nonceurl: Option<String>,
}

/// Replace each listed subtree of `resource` with a mask.
///
/// Every path shares one nonce and nonceurl; each mask's `url` is the
/// resource URL extended by its pointer. Pure; the input resource is not
/// mutated.
pub fn mask_resource(req: &MaskResourceRequest) -> Result<MaskedResource, MaskError> {
    let Some(url) = req.url_to_resource.as_deref().filter(|u| !u.is_empty()) else {
        return Ok(MaskedResource::default());
    };

    let nonce = match &req.nonce {
        Some(nonce) => nonce.clone(),
        None => crate::commit::generate_nonce()?,
    };
    let nonceurl = req
        .nonceurl
        .clone()
        .unwrap_or_else(|| format!("{}{}", url, NONCE_META_PATH));

    let mut masked = req.resource.clone();
    for path in &req.paths {
        if path.is_empty() {
            return Err(MaskError::CannotMaskRoot);
        }
        let original = pointer::resolve(&req.resource, path)
            .ok_or_else(|| MaskError::PathNotFound(path.clone()))?
            .clone();
        let outcome = mask(&MaskRequest {
            original,
            url: format!("{}{}", url, path),
            nonce: Some(nonce.clone()),
            nonceurl: nonceurl.clone(),
        })?;
        pointer::set_at(&mut masked, path, outcome.mask);
    }

    Ok(MaskedResource {
        nonce: Some(nonce),
        resource: Some(masked),
        nonceurl: Some(nonceurl),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{descriptor_of, is_mask};
    use crate::mask::verify_mask;
    use crate::walker::find_all_mask_paths;
    use serde_json::json;

    const URL: &str = "https://example.org/resources/1";

    fn resource() -> Value {
        json!({
            "_id": "resources/1",
            "_type": "application/vnd.example.audit.1+json",
            "location": { "here": "here" },
            "key1": "value1",
            "key2": { "deep": [1, 2, 3] },
        })
    }

    fn request(paths: &[&str]) -> MaskResourceRequest {
        MaskResourceRequest {
            resource: resource(),
            url_to_resource: Some(URL.to_string()),
            paths: paths.iter().map(|p| p.to_string()).collect(),
            nonce: Some("abcdefg".to_string()),
            nonceurl: None,
        }
    }

    #[test]
    fn missing_url_returns_the_sentinel() {
        let out = mask_resource(&MaskResourceRequest {
            resource: resource(),
            ..Default::default()
        })
        .unwrap();
        assert!(out.nonce.is_none());
        assert!(out.resource.is_none());
        assert!(out.nonceurl.is_none());
    }

    #[test]
    fn masks_each_path_and_defaults_nonceurl() {
        let out = mask_resource(&request(&["/location", "/key2"])).unwrap();
        assert_eq!(out.nonceurl.as_deref(), Some(&*format!("{}/_meta/nonce", URL)));

        let masked = out.resource.unwrap();
        let location = pointer::resolve(&masked, "/location").unwrap();
        assert!(is_mask(location));
        let descriptor = descriptor_of(location).unwrap();
        assert_eq!(descriptor.url, format!("{}/location", URL));
        assert_eq!(descriptor.nonceurl, format!("{}/_meta/nonce", URL));

        // untouched fields survive
        assert_eq!(masked["key1"], json!("value1"));
        assert_eq!(masked["_id"], json!("resources/1"));
    }

    #[test]
    fn masked_paths_verify_against_their_originals() {
        let out = mask_resource(&request(&["/location", "/key2"])).unwrap();
        let masked = out.resource.unwrap();
        let nonce = out.nonce.unwrap();

        for (path, original) in [
            ("/location", json!({"here": "here"})),
            ("/key2", json!({"deep": [1, 2, 3]})),
        ] {
            let mask_value = pointer::resolve(&masked, path).unwrap();
            let result = verify_mask(mask_value, Some(&original), Some(&nonce));
            assert!(result.valid && result.matches, "path {}", path);
        }
    }

    #[test]
    fn walker_finds_every_masked_path() {
        let paths = ["/location", "/key2"];
        let out = mask_resource(&request(&paths)).unwrap();
        let found = find_all_mask_paths(&out.resource.unwrap());
        for path in paths {
            assert!(found.iter().any(|f| f == path), "missing {}", path);
        }
    }

    #[test]
    fn shares_one_nonce_across_paths() {
        let out = mask_resource(&request(&["/location", "/key2"])).unwrap();
        let masked = out.resource.unwrap();
        let d1 = descriptor_of(pointer::resolve(&masked, "/location").unwrap()).unwrap();
        let d2 = descriptor_of(pointer::resolve(&masked, "/key2").unwrap()).unwrap();
        assert_eq!(d1.nonceurl, d2.nonceurl);
    }

    #[test]
    fn does_not_mutate_the_input() {
        let req = request(&["/location"]);
        let before = req.resource.clone();
        let _ = mask_resource(&req).unwrap();
        assert_eq!(req.resource, before);
    }

    #[test]
    fn rejects_masking_the_root() {
        assert!(matches!(
            mask_resource(&request(&[""])),
            Err(MaskError::CannotMaskRoot)
        ));
    }

    #[test]
    fn rejects_unknown_paths() {
        assert!(matches!(
            mask_resource(&request(&["/nope"])),
            Err(MaskError::PathNotFound(_))
        ));
    }
}
