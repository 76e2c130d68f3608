use aidoku::{
	Page, PageContent,
	alloc::{String, Vec},
	prelude::*,
};

/// Fragment marking a page url whose image has to be descrambled.
pub const DESCRAMBLE: &str = "descramble";

const ENCODED_UPLOADS_PATH: &str = "/wp-content/uploads/encoded";

/// How a chapter's reader page delivers its images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingShape {
	Plain,
	ScrambledFilenames,
	/// The page list is replaced by a single descriptor inside this script.
	KeyEncoded(String),
}

impl ListingShape {
	pub fn classify<S: AsRef<str>>(scripts: &[S]) -> Self {
		let find = |needle: &str| {
			scripts
				.iter()
				.map(|script| script.as_ref())
				.find(|data| data.contains(needle))
		};
		if find("_code").is_some() {
			Self::ScrambledFilenames
		} else if let Some(script) = find("ts_reader[_") {
			Self::KeyEncoded(script.into())
		} else {
			Self::Plain
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrambleDescriptor {
	pub fragment: String,
	pub shift: u8,
	pub page_count: u32,
}

impl ScrambleDescriptor {
	/// Image pages of a device-limited chapter, numbered from 1.
	pub fn pages(&self, base_url: &str) -> Vec<ChapterPage> {
		(1..=self.page_count)
			.map(|index| ChapterPage {
				index,
				url: format!(
					"{base_url}{ENCODED_UPLOADS_PATH}/{}/{index:05}.webp",
					self.fragment
				),
				scrambled: true,
			})
			.collect()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterPage {
	pub index: u32,
	pub url: String,
	pub scrambled: bool,
}

impl ChapterPage {
	/// The image url, carrying the descramble marker when needed.
	pub fn image_url(&self) -> String {
		if self.scrambled {
			format!("{}#{DESCRAMBLE}", self.url)
		} else {
			self.url.clone()
		}
	}
}

impl From<ChapterPage> for Page {
	fn from(page: ChapterPage) -> Self {
		Page {
			content: PageContent::url(page.image_url()),
			..Default::default()
		}
	}
}
