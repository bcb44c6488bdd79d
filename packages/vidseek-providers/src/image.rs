use infer::MatcherType;

/// Image type detected from a query payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageFormat {
	mime: &'static str,
}
impl ImageFormat {
	pub fn mime(self) -> &'static str {
		self.mime
	}
}

/// Detects an image container from its leading signature bytes.
///
/// Payloads that match no signature, or match a non-image one, yield `None`.
pub fn sniff(bytes: &[u8]) -> Option<ImageFormat> {
	let kind = infer::get(bytes)?;

	if kind.matcher_type() != MatcherType::Image {
		return None;
	}

	Some(ImageFormat { mime: kind.mime_type() })
}
