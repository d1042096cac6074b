//! Default short stable names for modules.
//!
//! A stable name only depends on where a module lives relative to the build
//! context, never on absolute checkout paths or on other modules.

/// Make every absolute path in a `!`/`|` separated request relative to `context`.
///
/// Relative results always start with `./` or `../`. Query strings are kept.
pub fn contextify(context: &str, request: &str) -> String {
	let mut result = String::with_capacity(request.len());
	let mut segment_start = 0;

	for (i, c) in request.char_indices() {
		if c == '!' || c == '|' {
			result.push_str(&absolute_to_request(context, &request[segment_start..i]));
			result.push(c);
			segment_start = i + 1;
		}
	}
	result.push_str(&absolute_to_request(context, &request[segment_start..]));

	result
}

/// Short name for a module.
///
/// The library identifier wins; otherwise the contextified name used for
/// rule conditions; otherwise the empty string.
pub fn short_module_name(
	lib_ident: Option<&str>,
	name_for_condition: Option<&str>,
	context: &str,
) -> String {
	if let Some(ident) = lib_ident.filter(|s| !s.is_empty()) {
		return avoid_number(ident);
	}
	if let Some(name) = name_for_condition.filter(|s| !s.is_empty()) {
		return avoid_number(&contextify(context, name));
	}
	String::new()
}

/// Prefix `_` to names that would read back as a number.
pub fn avoid_number(name: &str) -> String {
	// longest plain number representation is 21 chars
	if name.len() > 21 {
		return name.to_string();
	}
	match name.as_bytes().first().copied() {
		Some(b'-') | Some(b'1'..=b'9') => {}
		_ => return name.to_string(),
	}
	// parses as infinite but still reads back
	if name == "-Infinity" {
		return format!("_{}", name);
	}
	match name.parse::<f64>() {
		Ok(value) if value.is_finite() && format_number(value) == name => format!("_{}", name),
		_ => name.to_string(),
	}
}

/// Canonical decimal rendering of a number: no trailing `.0`, exponent form
/// only for very large or very small magnitudes.
fn format_number(value: f64) -> String {
	if value == 0.0 {
		return "0".to_string();
	}
	let magnitude = value.abs();
	if magnitude >= 1e21 || magnitude < 1e-6 {
		let formatted = format!("{:e}", value);
		// 1e21 -> 1e+21
		match formatted.split_once('e') {
			Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
			_ => formatted,
		}
	} else {
		format!("{}", value)
	}
}

fn absolute_to_request(context: &str, maybe_absolute: &str) -> String {
	let (resource, query) = match maybe_absolute.find('?') {
		Some(pos) => maybe_absolute.split_at(pos),
		None => (maybe_absolute, ""),
	};

	if maybe_absolute.starts_with('/') {
		// directory requests stay absolute
		if maybe_absolute.len() > 1 && maybe_absolute.ends_with('/') {
			return maybe_absolute.to_string();
		}
		let relative = relative_path(&split_segments(context), &split_segments(resource));
		return format!("{}{}", relative_path_to_request(&relative), query);
	}

	if let Some(drive) = windows_drive(maybe_absolute) {
		if windows_drive(context).map(|c| c.eq_ignore_ascii_case(&drive)) != Some(true) {
			return maybe_absolute.to_string();
		}
		// segments without the drive prefix
		let relative = relative_path(&split_segments(&context[2..]), &split_segments(&resource[2..]));
		return format!("{}{}", relative_path_to_request(&relative), query);
	}

	maybe_absolute.to_string()
}

/// Drive letter of a Windows absolute path like `C:\src` or `c:/src`.
fn windows_drive(path: &str) -> Option<char> {
	let bytes = path.as_bytes();
	if bytes.len() >= 3
		&& bytes[0].is_ascii_alphabetic()
		&& bytes[1] == b':'
		&& (bytes[2] == b'\\' || bytes[2] == b'/')
	{
		Some(bytes[0] as char)
	} else {
		None
	}
}

/// Split a path into normalized segments, resolving `.` and `..`.
fn split_segments(path: &str) -> Vec<&str> {
	let mut segments: Vec<&str> = Vec::new();
	for part in path.split(['/', '\\']) {
		match part {
			"" | "." => {}
			".." => {
				segments.pop();
			}
			_ => segments.push(part),
		}
	}
	segments
}

fn relative_path(from: &[&str], to: &[&str]) -> String {
	let common = from.iter().zip(to).take_while(|(a, b)| a == b).count();
	let mut parts: Vec<&str> = vec![".."; from.len() - common];
	parts.extend_from_slice(&to[common..]);
	parts.join("/")
}

fn relative_path_to_request(relative: &str) -> String {
	if relative.is_empty() {
		"./.".to_string()
	} else if relative == ".." || relative.starts_with("../") {
		relative.to_string()
	} else {
		format!("./{}", relative)
	}
}
