use std::{
	cmp::{Ordering, Reverse},
	collections::BinaryHeap,
	fs,
	path::Path,
};

use vidseek_domain::IndexPosition;

use crate::{Error, INDEX_MAGIC, Result, VectorIndex};

const HEADER_LEN: usize = INDEX_MAGIC.len() + 4 + 8;

/// Exact inner-product index held fully in memory.
///
/// Layout on disk: `b"VSI1"`, dimensions as `u32` LE, row count as `u64` LE, then every row's
/// values as `f32` LE. Row `i` is index position `i`.
#[derive(Debug, Clone)]
pub struct FlatIndex {
	dimensions: usize,
	values: Vec<f32>,
}
impl FlatIndex {
	pub fn open(path: &Path) -> Result<Self> {
		let bytes =
			fs::read(path).map_err(|err| Error::Io { path: path.to_path_buf(), source: err })?;

		Self::decode(&bytes).map_err(|message| Error::MalformedIndex {
			path: path.to_path_buf(),
			message,
		})
	}

	pub fn from_rows(dimensions: usize, rows: Vec<Vec<f32>>) -> Result<Self> {
		if dimensions == 0 {
			return Err(Error::ZeroDimensions);
		}

		let mut values = Vec::with_capacity(dimensions * rows.len());

		for (row, vector) in rows.into_iter().enumerate() {
			if vector.len() != dimensions {
				return Err(Error::InvalidRow { row, expected: dimensions, actual: vector.len() });
			}

			values.extend(vector);
		}

		Ok(Self { dimensions, values })
	}

	fn decode(bytes: &[u8]) -> Result<Self, String> {
		if bytes.len() < HEADER_LEN {
			return Err(format!("expected at least {HEADER_LEN} header bytes, got {}", bytes.len()));
		}

		let (magic, rest) = bytes.split_at(INDEX_MAGIC.len());

		if magic != INDEX_MAGIC {
			return Err("unknown file signature".to_string());
		}

		let (dimensions, rest) = rest.split_at(4);
		let (rows, payload) = rest.split_at(8);
		let dimensions = u32::from_le_bytes(
			dimensions.try_into().map_err(|_| "truncated dimensions field".to_string())?,
		) as usize;
		let rows = u64::from_le_bytes(rows.try_into().map_err(|_| "truncated row count".to_string())?);

		if dimensions == 0 {
			return Err("dimensions must be greater than zero".to_string());
		}

		let expected_len = usize::try_from(rows)
			.ok()
			.and_then(|rows| rows.checked_mul(dimensions))
			.and_then(|values| values.checked_mul(size_of::<f32>()))
			.ok_or_else(|| "row count overflows the address space".to_string())?;

		if payload.len() != expected_len {
			return Err(format!(
				"expected {expected_len} payload bytes for {rows} rows of {dimensions} dimensions, got {}",
				payload.len()
			));
		}

		let mut values = Vec::with_capacity(expected_len / size_of::<f32>());

		for chunk in payload.chunks_exact(size_of::<f32>()) {
			let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);

			if !value.is_finite() {
				return Err(format!("row {} contains a non-finite value", values.len() / dimensions));
			}

			values.push(value);
		}

		Ok(Self { dimensions, values })
	}

	fn rows(&self) -> impl Iterator<Item = &[f32]> {
		self.values.chunks_exact(self.dimensions)
	}
}
impl VectorIndex for FlatIndex {
	fn dimensions(&self) -> usize {
		self.dimensions
	}

	fn len(&self) -> usize {
		self.values.len() / self.dimensions
	}

	fn search(&self, query: &[f32], k: usize) -> Result<Vec<IndexPosition>> {
		if query.len() != self.dimensions {
			return Err(Error::QueryDimension { expected: self.dimensions, actual: query.len() });
		}
		if k == 0 {
			return Ok(Vec::new());
		}

		let mut heap: BinaryHeap<Reverse<Hit>> = BinaryHeap::with_capacity(k.min(self.len()) + 1);

		for (position, row) in self.rows().enumerate() {
			let hit = Hit { score: inner_product(query, row), position: position as IndexPosition };

			if heap.len() < k {
				heap.push(Reverse(hit));
			} else if heap.peek().is_some_and(|Reverse(worst)| hit > *worst) {
				heap.pop();
				heap.push(Reverse(hit));
			}
		}

		Ok(heap.into_sorted_vec().into_iter().map(|Reverse(hit)| hit.position).collect())
	}
}

/// Orders by score, then prefers the lower position on ties.
#[derive(Debug, Clone, Copy)]
struct Hit {
	score: f32,
	position: IndexPosition,
}
impl PartialEq for Hit {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}
impl Eq for Hit {}
impl PartialOrd for Hit {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}
impl Ord for Hit {
	fn cmp(&self, other: &Self) -> Ordering {
		self.score.total_cmp(&other.score).then_with(|| other.position.cmp(&self.position))
	}
}

fn inner_product(a: &[f32], b: &[f32]) -> f32 {
	a.iter().zip(b).map(|(x, y)| x * y).sum()
}
