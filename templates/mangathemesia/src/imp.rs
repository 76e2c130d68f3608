use crate::{
	Params,
	helpers::{self, ElementImageAttr},
};
use aidoku::{
	Chapter, ContentRating, FilterValue, ImageResponse, Manga, MangaPageResult, MangaStatus, Page,
	PageContent, PageContext, Result, Viewer,
	alloc::{String, Vec, string::ToString, vec},
	helpers::{string::StripPrefixOrSelf, uri::QueryParameters},
	imports::{
		canvas::ImageRef,
		html::{Document, Element, Html},
		net::Request,
		std::{current_date, parse_date_with_options, send_partial_result},
	},
	prelude::*,
};

const DETAILS_SELECTOR: &str = "div.bigcontent, div.animefull, div.main-info, div.postbody";

pub trait Impl {
	fn new() -> Self;

	fn params(&self) -> Params;

	fn get_search_manga_list(
		&self,
		params: &Params,
		query: Option<String>,
		page: i32,
		filters: Vec<FilterValue>,
	) -> Result<MangaPageResult> {
		let mut qs = QueryParameters::new();
		qs.push("page", Some(&page.to_string()));
		if query.is_some() {
			qs.push("title", query.as_deref());
		}

		for filter in filters {
			match filter {
				FilterValue::Text { id, value } => qs.push(&id, Some(&value)),
				FilterValue::Sort { id, index, .. } => {
					let value = match index {
						1 => "title",
						2 => "titlereverse",
						3 => "update",
						4 => "latest",
						5 => "popular",
						_ => "",
					};
					qs.push(&id, Some(value));
				}
				FilterValue::Select { id, value } => qs.set(&id, Some(&value)),
				FilterValue::MultiSelect {
					id,
					included,
					excluded,
				} => {
					for item in included {
						qs.push(&id, Some(&item));
					}
					for item in excluded {
						qs.push(&id, Some(&format!("-{item}")));
					}
				}
				_ => {}
			}
		}

		let url = format!("{}{}/?{qs}", params.base_url, params.manga_url_directory);
		let html = self.request(params, &url)?.html()?;

		let entries = html
			.select(".utao .uta .imgu, .listupd .bs .bsx, .listo .bs .bsx")
			.map(|els| {
				els.filter_map(|el| self.parse_manga_card(params, &el))
					.collect()
			})
			.unwrap_or_default();

		Ok(MangaPageResult {
			entries,
			has_next_page: html
				.select_first("div.pagination .next, div.hpage .r")
				.is_some(),
		})
	}

	fn parse_manga_card(&self, params: &Params, el: &Element) -> Option<Manga> {
		let link = el.select_first("a")?;
		Some(Manga {
			key: link
				.attr("href")?
				.strip_prefix_or_self(&params.base_url)
				.into(),
			title: link.attr("title")?,
			cover: el.select_first("img").and_then(|img| img.img_attr()),
			..Default::default()
		})
	}

	fn get_manga_update(
		&self,
		params: &Params,
		mut manga: Manga,
		needs_details: bool,
		needs_chapters: bool,
	) -> Result<Manga> {
		let manga_url = format!("{}{}", params.base_url, manga.key);
		let html = self.request(params, &manga_url)?.html()?;

		if needs_details {
			let details = html
				.select_first(DETAILS_SELECTOR)
				.ok_or_else(|| error!("Unable to find details"))?;

			let people = |selector: &str| {
				details
					.select_first(selector)
					.and_then(|el| el.own_text())
					.map(|text| text.trim().to_string())
					.filter(|text| !matches!(text.as_str(), "" | "-" | "N/A" | "n/a"))
					.map(|text| vec![text])
			};

			manga.title = details
				.select_first(&params.series_title_selector)
				.and_then(|el| el.text())
				.unwrap_or(manga.title);
			manga.cover = details
				.select_first(&params.series_cover_selector)
				.and_then(|img| img.img_attr())
				.or(manga.cover);
			manga.artists = people(&params.series_artist_selector);
			manga.authors = people(&params.series_author_selector);
			manga.description = self.parse_description(params, &html);
			manga.url = Some(manga_url.clone());
			manga.tags = details.select(&params.series_genre_selector).map(|els| {
				els.filter_map(|el| el.text())
					.map(|s| s.trim().into())
					.collect()
			});
			manga.status = details
				.select_first(&params.series_status_selector)
				.and_then(|el| el.text())
				.map(|text| self.get_manga_status(&text))
				.unwrap_or_default();

			let tags = manga.tags.as_deref().unwrap_or(&[]);
			manga.content_rating =
				if params.mark_all_nsfw || html.select_first(".restrictcontainer").is_some() {
					ContentRating::NSFW
				} else if tags.iter().any(|tag| tag == "Ecchi") {
					ContentRating::Suggestive
				} else {
					ContentRating::Safe
				};
			manga.viewer = details
				.select_first(&params.series_type_selector)
				.and_then(|el| el.text())
				.map(|text| match text.trim().to_lowercase().as_str() {
					"manga" | "one-shot" | "oneshot" | "doujinshi" => Viewer::RightToLeft,
					"manhua" | "manhwa" => Viewer::Webtoon,
					"comic" => Viewer::LeftToRight,
					_ => Viewer::Unknown,
				})
				.unwrap_or_default();

			if needs_chapters {
				send_partial_result(&manga);
			}
		}

		if needs_chapters {
			manga.chapters = html.select(&params.chapter_list_selector).map(|els| {
				els.filter_map(|el| self.parse_chapter(params, &el))
					.collect()
			});
		}

		Ok(manga)
	}

	fn parse_chapter(&self, params: &Params, el: &Element) -> Option<Chapter> {
		let link = el.select_first("a")?;
		let url = link.attr("abs:href")?;
		let title = link
			.select_first(".lch a, .chapternum")
			.and_then(|el| el.text())
			.filter(|text| !text.is_empty())
			.or_else(|| link.text())?;
		let chapter_number = helpers::find_first_f32(&title);
		let date_uploaded = el
			.select_first(".chapterdate")
			.and_then(|el| el.text())
			.and_then(|text| {
				parse_date_with_options(text, &params.date_format, &params.date_locale, "current")
			})
			.unwrap_or_else(current_date);

		Some(Chapter {
			key: url.strip_prefix_or_self(&params.base_url).into(),
			title: (title != format!("Chapter {}", chapter_number.unwrap_or(0.0)))
				.then_some(title),
			chapter_number,
			date_uploaded: Some(date_uploaded),
			url: Some(url),
			..Default::default()
		})
	}

	fn parse_description(&self, params: &Params, html: &Document) -> Option<String> {
		html.select_first(DETAILS_SELECTOR)
			.and_then(|el| el.select_first(&params.series_description_selector))
			.and_then(|div| div.text())
	}

	fn get_manga_status(&self, str: &str) -> MangaStatus {
		match str.trim().to_lowercase().as_str() {
			"ongoing" | "on going" | "publishing" | "updating" => MangaStatus::Ongoing,
			"completed" | "finished" | "one-shot" => MangaStatus::Completed,
			"canceled" | "cancelled" | "dropped" | "discontinued" => MangaStatus::Cancelled,
			"hiatus" | "on hold" => MangaStatus::Hiatus,
			_ => MangaStatus::Unknown,
		}
	}

	/// Base request for any page on the site.
	fn request(&self, params: &Params, url: &str) -> Result<Request> {
		Ok(Request::get(url)?.header("Referer", &params.referer()))
	}

	/// Builds the request used to fetch a chapter's reader page.
	fn page_list_request(&self, params: &Params, url: &str) -> Result<Request> {
		self.request(params, url)
	}

	fn get_page_list(&self, params: &Params, _manga: Manga, chapter: Chapter) -> Result<Vec<Page>> {
		let url = format!("{}{}", params.base_url, chapter.key);
		let response = self.page_list_request(params, &url)?.string()?;
		let html = Html::parse_fragment_with_url(&response, &url)?;
		self.parse_page_list(params, &html, &response)
	}

	/// Turns a fetched reader page into pages. `response` is the raw body the
	/// document was parsed from, for data that only lives in scripts.
	fn parse_page_list(&self, params: &Params, html: &Document, response: &str) -> Result<Vec<Page>> {
		let urls = helpers::reader_image_urls(html, response, &params.page_selector);
		if urls.is_empty() {
			bail!("No pages found");
		}
		Ok(urls
			.into_iter()
			.map(|url| Page {
				content: PageContent::url(url),
				..Default::default()
			})
			.collect())
	}

	fn get_image_request(
		&self,
		params: &Params,
		url: String,
		_context: Option<PageContext>,
	) -> Result<Request> {
		Ok(self
			.request(params, &url)?
			.header("Accept", "image/avif,image/webp,image/png,image/jpeg,*/*"))
	}

	fn process_page_image(
		&self,
		_params: &Params,
		response: ImageResponse,
		_context: Option<PageContext>,
	) -> Result<ImageRef> {
		Ok(response.image)
	}
}
