//! Paths and public URLs of emitted files.

use url::Url;

/// Join an output directory and a file name with forward slashes.
///
/// Backslashes are treated as separators, and `.` and `..` segments are resolved.
/// A query string or fragment in the file name is kept as it is.
pub fn join_path(directory: &str, file_name: &str) -> String {
	normalize(&format!("{}/{}", directory, file_name).replace('\\', "/"))
}

/// Resolve a relative path against a public base path or URL.
///
/// The base is treated as a directory: a `/` is appended if it does not end with one.
///
/// * Absolute URLs (`https://...`) as path are returned as they are.
/// * Bases with a scheme or protocol relative bases (`//...`) are resolved like a browser resolves a link.
/// * Other bases are plain paths: rooted paths (`/...`) replace them, other paths are appended.
///
/// Backslashes are treated as forward slashes.
pub fn public_url(base: &str, path: &str) -> String {
	let path = path.replace('\\', "/");
	if Url::parse(&path).is_ok() {
		return path;
	}

	let mut base = base.replace('\\', "/");
	if !base.is_empty() && !base.ends_with('/') {
		base.push('/');
	}
	if let Some(resolved) = resolve_url(&base, &path) {
		return resolved;
	}

	if path.starts_with('/') {
		return normalize(&path);
	}
	let base = &base[..base.find(['?', '#']).unwrap_or(base.len())];
	let directory = &base[..base.rfind('/').map_or(0, |i| i + 1)];
	normalize(&format!("{}{}", directory, path))
}

/// Resolve a path against a base URL.
///
/// Returns `None` if the base is not an absolute or protocol relative URL.
fn resolve_url(base: &str, path: &str) -> Option<String> {
	if base.starts_with("//") {
		let resolved = Url::parse(&format!("https:{}", base)).ok()?.join(path).ok()?;
		return resolved.as_str().strip_prefix("https:").map(String::from);
	}
	let resolved = Url::parse(base).ok()?.join(path).ok()?;
	Some(resolved.into())
}

/// Resolve `.` and `..` segments and collapse repeated slashes.
///
/// Leading `..` segments are kept for relative paths and dropped for rooted paths.
fn normalize(path: &str) -> String {
	let (path, suffix) = match path.find(['?', '#']) {
		Some(i) => path.split_at(i),
		None => (path, ""),
	};
	let rooted = path.starts_with('/');
	let directory = path.ends_with('/') || path.ends_with("/.") || path.ends_with("/..");

	let mut segments: Vec<&str> = Vec::new();
	for segment in path.split('/') {
		match segment {
			"" | "." => (),
			".." => {
				if segments.last().is_some_and(|last| *last != "..") {
					segments.pop();
				} else if !rooted {
					segments.push("..");
				}
			},
			segment => segments.push(segment),
		}
	}

	let mut output = String::with_capacity(path.len() + suffix.len());
	if rooted {
		output.push('/');
	}
	output.push_str(&segments.join("/"));
	if directory && !segments.is_empty() {
		output.push('/');
	}
	output.push_str(suffix);
	output
}
