use aidoku::{
	alloc::{format, string::String, vec::Vec},
	imports::html::{Document, Element},
};

pub trait ElementImageAttr {
	fn img_attr(&self) -> Option<String>;
}

impl ElementImageAttr for Element {
	fn img_attr(&self) -> Option<String> {
		self.attr("abs:data-lazy-src")
			.or_else(|| self.attr("abs:data-src"))
			.or_else(|| self.attr("abs:src"))
			.map(|url| url.trim().into())
	}
}

/// Image urls of a reader page: the reader area's images, or the `ts_reader`
/// image array when the reader area is filled in by script.
pub fn reader_image_urls(html: &Document, response: &str, selector: &str) -> Vec<String> {
	let urls: Vec<String> = html
		.select(selector)
		.map(|els| els.filter_map(|el| el.img_attr()).collect())
		.unwrap_or_default();

	if urls.is_empty() && response.contains("\"images\":") {
		extract_images(response)
	} else {
		urls
	}
}

pub fn extract_images(content: &str) -> Vec<String> {
	let slice = format!(
		"[{}]",
		extract_between(content, "\"images\":[", "]").unwrap_or_default()
	);
	serde_json::from_str::<Vec<String>>(&slice).unwrap_or_default()
}

pub fn extract_between<'a>(s: &'a str, start: &str, end: &str) -> Option<&'a str> {
	let after_start = &s[s.find(start)? + start.len()..];
	after_start.find(end).map(|end_idx| &after_start[..end_idx])
}

/// Expands `{}` in `template` once per value and joins the results into a
/// selector group.
pub fn selector(template: &str, values: &[&str]) -> String {
	values
		.iter()
		.map(|value| template.replace("{}", value))
		.collect::<Vec<_>>()
		.join(", ")
}

pub fn find_first_f32(s: &str) -> Option<f32> {
	let start = s.find(|c: char| c.is_ascii_digit())?;
	let mut end = start;
	let mut dot_found = false;

	for (idx, c) in s[start..].char_indices() {
		if c.is_ascii_digit() {
			end = start + idx + 1;
		} else if c == '.' && !dot_found {
			dot_found = true;
		} else {
			break;
		}
	}

	s[start..end].parse::<f32>().ok()
}

#[cfg(test)]
mod test {
	use super::*;
	use aidoku_test::aidoku_test;

	#[aidoku_test]
	fn extracts_ts_reader_images() {
		let script = r#"ts_reader.run({"sources":[{"source":"Server 1","images":["https://a.test/1.webp","https://a.test/2.webp"]}],"prevUrl":""});"#;
		assert_eq!(
			extract_images(script),
			["https://a.test/1.webp", "https://a.test/2.webp"]
		);
		assert!(extract_images("no images here").is_empty());
	}

	#[aidoku_test]
	fn extract_between_needs_both_ends() {
		assert_eq!(extract_between("a[b]c", "[", "]"), Some("b"));
		assert_eq!(extract_between("a[bc", "[", "]"), None);
		assert_eq!(extract_between("abc", "[", "]"), None);
	}

	#[aidoku_test]
	fn selector_expands_every_value() {
		assert_eq!(
			selector("td:contains({}) i, b:contains({})", &["Author", "author"]),
			"td:contains(Author) i, b:contains(Author), td:contains(author) i, b:contains(author)"
		);
	}

	#[aidoku_test]
	fn first_number_in_title() {
		assert_eq!(find_first_f32("Chapter 12"), Some(12.0));
		assert_eq!(find_first_f32("Chapter 12.5 - End"), Some(12.5));
		assert_eq!(find_first_f32("Ch. 3. The Return"), Some(3.0));
		assert_eq!(find_first_f32("Prologue"), None);
	}
}
