use crate::{error::ScrambleError, models::ScrambleDescriptor};
use aidoku::{
	alloc::{String, Vec},
	prelude::*,
};
use regex::Regex;
use spin::Lazy;

/// Printable ascii from `' '` to `'}'`, indexed by the digit pairs of a
/// scrambled filename.
const LOOKUP_STRING: &str = " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_`abcdefghijklmnopqrstuvwxyz{|}";
const LOOKUP_STRING_ALNUM: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

const FRAGMENT_LENGTH: usize = 32;

// the shift amount is the hex pair right after the fragment
static DESCRAMBLING_KEY_RE: Lazy<Regex> = Lazy::new(|| {
	#[expect(clippy::unwrap_used)]
	Regex::new(r"(?i)'([0-9a-z]{32}[0-9a-f]{2}[0-9a-z]+)'").unwrap()
});

/// Decodes a scrambled filename. Returns an empty string when `segment` holds
/// no digits at all.
pub fn decode_filename(segment: &str) -> Result<String, ScrambleError> {
	let digits: Vec<u8> = segment
		.bytes()
		.filter(u8::is_ascii_digit)
		.map(|b| b - b'0')
		.collect();
	if digits.len() % 2 != 0 {
		return Err(ScrambleError::UnpairedDigit);
	}

	digits
		.chunks_exact(2)
		.map(|pair| {
			let index = usize::from(pair[0] * 10 + pair[1]);
			LOOKUP_STRING
				.as_bytes()
				.get(index)
				.map(|&b| char::from(b))
				.ok_or(ScrambleError::IndexOutOfRange(index))
		})
		.collect()
}

/// Replaces the last path segment of `url` with its decoded filename.
pub fn decode_page_url(url: &str) -> Result<String, ScrambleError> {
	let (prefix, segment) = match url.rsplit_once('/') {
		Some((prefix, segment)) => (Some(prefix), segment),
		None => (None, url),
	};
	let filename = decode_filename(segment)?;

	Ok(match prefix {
		_ if filename.is_empty() => url.into(),
		Some(prefix) => format!("{prefix}/{filename}"),
		None => filename,
	})
}

/// Finds the descrambling token in a reader script and decodes it.
pub fn resolve_key(script: &str) -> Result<ScrambleDescriptor, ScrambleError> {
	let token = DESCRAMBLING_KEY_RE
		.captures(script)
		.and_then(|caps| caps.get(1))
		.ok_or(ScrambleError::KeyNotFound)?;
	decode_token(token.as_str())
}

pub fn decode_token(token: &str) -> Result<ScrambleDescriptor, ScrambleError> {
	let malformed = |reason: &str| ScrambleError::MalformedDescriptor(reason.into());

	let (head, rest) = token
		.split_at_checked(FRAGMENT_LENGTH)
		.ok_or_else(|| malformed("token is too short"))?;
	let (shift, tail) = rest
		.split_at_checked(2)
		.ok_or_else(|| malformed("token has no shift"))?;
	let shift = u8::from_str_radix(shift, 16).map_err(|_| malformed("shift is not hex"))?;

	let decoded = head
		.chars()
		.chain(tail.chars())
		.map(|c| unshift(c, shift))
		.collect::<Result<String, _>>()?;
	let (fragment, page_count) = decoded.split_at(FRAGMENT_LENGTH);
	let page_count = page_count
		.parse::<u32>()
		.map_err(|_| malformed("page count is not a number"))?;

	Ok(ScrambleDescriptor {
		fragment: fragment.into(),
		shift,
		page_count,
	})
}

fn unshift(c: char, shift: u8) -> Result<char, ScrambleError> {
	let alphabet = LOOKUP_STRING_ALNUM.as_bytes();
	let index = alphabet
		.iter()
		.position(|&b| char::from(b) == c)
		.ok_or_else(|| ScrambleError::MalformedDescriptor(format!("'{c}' is not alphanumeric")))?;
	let shift = usize::from(shift) % alphabet.len();
	Ok(char::from(alphabet[(index + alphabet.len() - shift) % alphabet.len()]))
}

#[cfg(test)]
mod test {
	use super::*;
	use aidoku::alloc::string::ToString;
	use aidoku_test::aidoku_test;

	fn shift_forward(plain: &str, shift: u8) -> String {
		let alphabet = LOOKUP_STRING_ALNUM.as_bytes();
		plain
			.chars()
			.map(|c| {
				let index = alphabet.iter().position(|&b| char::from(b) == c).unwrap();
				char::from(alphabet[(index + usize::from(shift)) % alphabet.len()])
			})
			.collect()
	}

	fn encode_token(fragment: &str, page_count: &str, shift: u8) -> String {
		let encoded = shift_forward(&format!("{fragment}{page_count}"), shift);
		let (head, tail) = encoded.split_at(FRAGMENT_LENGTH);
		format!("{head}{shift:02x}{tail}")
	}

	#[aidoku_test]
	fn lookup_alphabets() {
		assert_eq!(LOOKUP_STRING.len(), 94);
		assert_eq!(LOOKUP_STRING_ALNUM.len(), 62);
		assert!(
			LOOKUP_STRING
				.bytes()
				.zip(b' '..=b'}')
				.all(|(a, b)| a == b)
		);
	}

	#[aidoku_test]
	fn decodes_filename() {
		assert_eq!(decode_filename("6514748071").as_deref(), Ok("a.jpg"));
		assert_eq!(decode_filename("0193").as_deref(), Ok("!}"));
		assert_eq!(decode_filename("65-14_74.80x71.webp").as_deref(), Ok("a.jpg"));
	}

	#[aidoku_test]
	fn filename_decode_is_deterministic() {
		let segment = "5077837269658014837273";
		assert_eq!(decode_filename(segment), decode_filename(segment));
	}

	#[aidoku_test]
	fn filename_without_digits_is_empty() {
		assert_eq!(decode_filename("cover.webp").as_deref(), Ok(""));
		assert_eq!(decode_filename("").as_deref(), Ok(""));
	}

	#[aidoku_test]
	fn filename_errors() {
		assert_eq!(decode_filename("123"), Err(ScrambleError::UnpairedDigit));
		assert_eq!(decode_filename("0194"), Err(ScrambleError::IndexOutOfRange(94)));
		assert_eq!(decode_filename("99"), Err(ScrambleError::IndexOutOfRange(99)));
	}

	#[aidoku_test]
	fn decodes_page_url() {
		assert_eq!(
			decode_page_url("https://constellarscans.com/wp-content/uploads/2023/01/6514748071.webp")
				.as_deref(),
			Ok("https://constellarscans.com/wp-content/uploads/2023/01/a.jpg")
		);
		assert_eq!(
			decode_page_url("https://constellarscans.com/wp-content/uploads/cover.webp").as_deref(),
			Ok("https://constellarscans.com/wp-content/uploads/cover.webp")
		);
		assert_eq!(decode_page_url("6514748071").as_deref(), Ok("a.jpg"));
	}

	#[aidoku_test]
	fn resolves_key_with_wrap_around() {
		// 'z' shifted by 5 wraps to '4', 7 shifted by 5 is 'C'
		let script = "ts_reader[_0x3f1a]('4444444444444444444444444444444405C');";
		assert_eq!(
			resolve_key(script),
			Ok(ScrambleDescriptor {
				fragment: "z".repeat(32),
				shift: 5,
				page_count: 7,
			})
		);
	}

	#[aidoku_test]
	fn shift_cipher_round_trip() {
		let fragment = "Constellar0123456789abcdefghijKL";
		let token = encode_token(fragment, "24", 5);
		let descriptor = decode_token(&token).unwrap();
		assert_eq!(descriptor.fragment, fragment);
		assert_eq!(descriptor.shift, 5);
		assert_eq!(descriptor.page_count, 24);

		let reencoded = encode_token(
			&descriptor.fragment,
			&descriptor.page_count.to_string(),
			descriptor.shift,
		);
		assert_eq!(reencoded, token);
	}

	#[aidoku_test]
	fn unshifted_token() {
		let descriptor = decode_token("abcdefghijklmnopqrstuvwxyzABCDEF003").unwrap();
		assert_eq!(descriptor.fragment, "abcdefghijklmnopqrstuvwxyzABCDEF");
		assert_eq!(descriptor.page_count, 3);
	}

	#[aidoku_test]
	fn zero_page_count() {
		let token = encode_token("0123456789abcdef0123456789abcdef", "0", 9);
		let descriptor = decode_token(&token).unwrap();
		assert_eq!(descriptor.page_count, 0);
		assert!(descriptor.pages("https://constellarscans.com").is_empty());
	}

	#[aidoku_test]
	fn non_numeric_page_count() {
		let token = encode_token("0123456789abcdef0123456789abcdef", "1a", 5);
		assert!(matches!(
			decode_token(&token),
			Err(ScrambleError::MalformedDescriptor(_))
		));
		assert!(matches!(
			decode_token("0123456789abcdef0123456789abcdef0"),
			Err(ScrambleError::MalformedDescriptor(_))
		));
	}

	#[aidoku_test]
	fn missing_key() {
		assert_eq!(resolve_key("ts_reader.run({});"), Err(ScrambleError::KeyNotFound));
		// one character short of fragment plus shift
		let script = format!("ts_reader[_0x1]('{}');", "a".repeat(33));
		assert_eq!(resolve_key(&script), Err(ScrambleError::KeyNotFound));
	}
}
