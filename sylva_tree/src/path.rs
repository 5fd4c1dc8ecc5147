// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! String helpers for `/`-separated paths.
//!
//! Directory paths always end with `/`. Entry paths never do.

use kurbo::Vec2;

/// `path` with a trailing `/` added if it is missing.
pub fn dir_path(path: &str) -> String {
    let mut out = String::from(path);
    if !out.ends_with('/') {
        out.push('/');
    }
    out
}

/// Split an entry path into its directory (with trailing `/`) and its name.
///
/// Returns `None` if the path has no `/` or the name is empty.
///
/// ```
/// use sylva_tree::path::split_entry_path;
///
/// assert_eq!(split_entry_path("/src/main.rs"), Some(("/src/", "main.rs")));
/// assert_eq!(split_entry_path("/src/"), None);
/// ```
pub fn split_entry_path(path: &str) -> Option<(&str, &str)> {
    let slash = path.rfind('/')?;
    let (dir, name) = path.split_at(slash + 1);
    if name.is_empty() {
        return None;
    }
    Some((dir, name))
}

/// The extension of a file name: everything after the last `.`, if non-empty.
pub fn extension(name: &str) -> Option<&str> {
    let dot = name.rfind('.')?;
    let ext = &name[dot + 1..];
    (!ext.is_empty()).then_some(ext)
}

/// Longest shared prefix of `a` and `b` that ends on a `/`.
///
/// Returns an empty string if the paths share no `/`.
///
/// ```
/// use sylva_tree::path::common_path_prefix;
///
/// assert_eq!(common_path_prefix("/a/b/c/", "/a/b/d/"), "/a/b/");
/// assert_eq!(common_path_prefix("/a/bc/", "/a/bd/"), "/a/");
/// assert_eq!(common_path_prefix("a/", "b/"), "");
/// ```
pub fn common_path_prefix<'a>(a: &str, b: &'a str) -> &'a str {
    let mut slash = None;
    for (i, (x, y)) in a.bytes().zip(b.bytes()).enumerate() {
        if x != y {
            break;
        }
        if x == b'/' {
            slash = Some(i);
        }
    }
    match slash {
        Some(i) => &b[..=i],
        None => "",
    }
}

/// Whether `path` lies at or below the directory `prefix`.
///
/// A `prefix` without a trailing `/` is treated as a directory, so `/a/bc/` is not
/// prefixed by `/a/b`. An empty prefix matches nothing.
pub fn is_prefixed_by(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    if prefix.ends_with('/') {
        return path.starts_with(prefix);
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// 32-bit FNV-1a hash of a string.
pub fn hash_str(s: &str) -> u32 {
    let mut h: u32 = 0x811c_9dc5;
    for b in s.bytes() {
        h ^= u32::from(b);
        h = h.wrapping_mul(0x0100_0193);
    }
    h
}

/// A deterministic unit vector derived from a string.
pub fn hash_unit_vec(s: &str) -> Vec2 {
    let h = hash_str(s);
    let x = f64::from((h / 7) % 255) - 127.0;
    let y = f64::from((h / 3) % 255) - 127.0;
    let v = Vec2::new(x, y);
    let len = v.hypot();
    if len > 0.0 { v / len } else { Vec2::new(1.0, 0.0) }
}
