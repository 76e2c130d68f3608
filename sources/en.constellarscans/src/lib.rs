#![no_std]
use aidoku::{
	ImageResponse, Page, PageContext, Result, Source,
	alloc::{String, Vec},
	imports::{
		canvas::ImageRef,
		html::Document,
		net::{Request, TimeUnit, set_rate_limit},
	},
	prelude::*,
};
use mangathemesia::{Impl, MangaThemesia, Params, helpers};

mod cipher;
mod descramble;
mod error;
mod models;
mod settings;

use error::ScrambleError;
use models::{ChapterPage, ListingShape};

const BASE_URL: &str = "https://constellarscans.com";

struct ConstellarScans;

impl Impl for ConstellarScans {
	fn new() -> Self {
		set_rate_limit(1, 2, TimeUnit::Seconds);
		Self
	}

	fn params(&self) -> Params {
		Params {
			base_url: BASE_URL.into(),
			series_status_selector: ".status".into(),
			..Default::default()
		}
	}

	fn page_list_request(&self, params: &Params, url: &str) -> Result<Request> {
		Ok(self
			.request(params, url)?
			.header("User-Agent", &settings::get_user_agent())
			.header("Sec-Fetch-Site", "same-origin")
			.header("Sec-Fetch-Mode", "navigate")
			.header("Sec-Fetch-Dest", "document")
			.header("Sec-Fetch-User", "?1"))
	}

	fn parse_page_list(&self, params: &Params, html: &Document, response: &str) -> Result<Vec<Page>> {
		let scripts: Vec<String> = html
			.select("script")
			.map(|els| els.filter_map(|el| el.data()).collect())
			.unwrap_or_default();

		let pages = match ListingShape::classify(&scripts) {
			ListingShape::Plain => reader_pages(params, html, response)?,
			ListingShape::ScrambledFilenames => {
				decode_filenames(reader_pages(params, html, response)?)?
			}
			ListingShape::KeyEncoded(script) => cipher::resolve_key(&script)
				.inspect_err(|err| println!("[constellarscans] device-limited chapter: {err}"))?
				.pages(&params.base_url),
		};

		Ok(pages.into_iter().map(Page::from).collect())
	}

	fn process_page_image(
		&self,
		_params: &Params,
		response: ImageResponse,
		_context: Option<PageContext>,
	) -> Result<ImageRef> {
		let Some(url) = response
			.request
			.url
			.as_deref()
			.filter(|url| descramble::needs_descramble(url))
		else {
			return Ok(response.image);
		};

		let key = descramble::page_key(url).ok_or(ScrambleError::KeyNotFound)?;
		let data = descramble::descramble_image(&response.image.data(), &key)
			.inspect_err(|err| println!("[constellarscans] {url}: {err}"))?;

		Ok(ImageRef::new(&data))
	}
}

fn reader_pages(params: &Params, html: &Document, response: &str) -> Result<Vec<ChapterPage>> {
	let urls = helpers::reader_image_urls(html, response, &params.page_selector);
	if urls.is_empty() {
		bail!("No pages found");
	}
	Ok(urls
		.into_iter()
		.zip(1..)
		.map(|(url, index)| ChapterPage {
			index,
			url,
			scrambled: false,
		})
		.collect())
}

fn decode_filenames(
	pages: Vec<ChapterPage>,
) -> core::result::Result<Vec<ChapterPage>, ScrambleError> {
	pages
		.into_iter()
		.map(|page| {
			let url = cipher::decode_page_url(&page.url)
				.inspect_err(|err| println!("[constellarscans] {}: {err}", page.url))?;
			Ok(ChapterPage { url, ..page })
		})
		.collect()
}

register_source!(
	MangaThemesia<ConstellarScans>,
	ImageRequestProvider,
	PageImageProcessor
);
