use aidoku::{AidokuError, alloc::String};
use core::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrambleError {
	/// No descrambling key was found where one was expected.
	KeyNotFound,
	MalformedDescriptor(String),
	/// A filename digit pair that does not index the lookup alphabet.
	IndexOutOfRange(usize),
	/// A scrambled filename with an odd number of digits.
	UnpairedDigit,
	Decode(String),
	Encode(String),
}

impl Display for ScrambleError {
	fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
		match self {
			Self::KeyNotFound => write!(
				f,
				"Did not receive suitable decryption key. Try opening the chapter again."
			),
			Self::MalformedDescriptor(reason) => write!(f, "Malformed chapter key: {reason}"),
			Self::IndexOutOfRange(index) => {
				write!(f, "Filename index {index} is outside the lookup alphabet")
			}
			Self::UnpairedDigit => write!(f, "Scrambled filename has an odd number of digits"),
			Self::Decode(reason) => write!(f, "Unable to decode image: {reason}"),
			Self::Encode(reason) => write!(f, "Unable to encode image: {reason}"),
		}
	}
}

impl From<ScrambleError> for AidokuError {
	fn from(err: ScrambleError) -> Self {
		AidokuError::message(err)
	}
}
