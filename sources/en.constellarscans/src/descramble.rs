use crate::{error::ScrambleError, models::DESCRAMBLE};
use aidoku::{
	alloc::{String, Vec, string::ToString},
	prelude::*,
};
use core::ops::Range;
use image::{DynamicImage, RgbaImage, codecs::jpeg::JpegEncoder};

const JPEG_QUALITY: u8 = 90;

/// How an image of a given size is cut into horizontal bands for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripPlan {
	pub section_count: u32,
	pub width: u32,
	pub height: u32,
}

/// Rows copied from the scrambled image to the restored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
	pub source: Range<u32>,
	pub destination: Range<u32>,
}

impl StripPlan {
	pub fn new(key: &str, width: u32, height: u32) -> Result<Self, ScrambleError> {
		let last = key.chars().last().ok_or(ScrambleError::KeyNotFound)?;
		Ok(Self {
			section_count: (u32::from(last) % 10) * 2 + 4,
			width,
			height,
		})
	}

	/// Bands in write order. Sources are read from the bottom up; the rows
	/// left over by the integer split belong to the first band read and the
	/// last band written.
	pub fn bands(&self) -> impl Iterator<Item = Band> {
		let Self {
			section_count,
			height,
			..
		} = *self;
		let section_height = height / section_count;
		let remainder = height % section_count;

		(0..section_count).map(move |i| {
			let mut sy = height - section_height * (i + 1) - remainder;
			let dy = section_height * i;
			let mut band_height = section_height;

			if i == section_count - 1 {
				band_height += remainder;
			} else {
				sy += remainder;
			}

			Band {
				source: sy..sy + band_height,
				destination: dy..dy + band_height,
			}
		})
	}
}

/// Moves every band of `source` into place and inverts its colors.
pub fn descramble_raster(source: &RgbaImage, plan: &StripPlan) -> RgbaImage {
	debug_assert_eq!(source.dimensions(), (plan.width, plan.height));

	let row_len = plan.width as usize * 4;
	let rows = |range: Range<u32>| range.start as usize * row_len..range.end as usize * row_len;

	let source = source.as_raw();
	let mut result = RgbaImage::new(plan.width, plan.height);
	let pixels: &mut [u8] = &mut result;
	for band in plan.bands() {
		invert_into(&mut pixels[rows(band.destination)], &source[rows(band.source)]);
	}
	result
}

// alpha is left untouched
fn invert_into(dst: &mut [u8], src: &[u8]) {
	for (dst, src) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
		dst[0] = 255 - src[0];
		dst[1] = 255 - src[1];
		dst[2] = 255 - src[2];
		dst[3] = src[3];
	}
}

/// Restores a scrambled page image, returning it as a jpeg.
pub fn descramble_image(data: &[u8], key: &str) -> Result<Vec<u8>, ScrambleError> {
	let source = image::load_from_memory(data)
		.map_err(|err| ScrambleError::Decode(err.to_string()))?
		.into_rgba8();
	let plan = StripPlan::new(key, source.width(), source.height())?;

	let mut output = Vec::new();
	DynamicImage::ImageRgba8(descramble_raster(&source, &plan))
		.into_rgb8()
		.write_with_encoder(JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY))
		.map_err(|err| ScrambleError::Encode(err.to_string()))?;
	Ok(output)
}

pub fn needs_descramble(url: &str) -> bool {
	url.split_once('#')
		.is_some_and(|(_, fragment)| fragment.contains(DESCRAMBLE))
}

/// The descrambling key of a page: the md5 of its parent directory name
/// followed by its filename without extension.
pub fn page_key(url: &str) -> Option<String> {
	let url = url.split(['#', '?']).next()?;
	let path = match url.split_once("://") {
		Some((_, rest)) => rest.split_once('/').map_or("", |(_, path)| path),
		None => url,
	};

	let mut segments = path.rsplit('/').filter(|segment| !segment.is_empty());
	let filename = segments.next()?;
	let fragment = segments.next()?;
	let stem = filename.split('.').next().unwrap_or(filename);

	Some(format!("{:x}", md5::compute(format!("{fragment}{stem}"))))
}
