use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};

use crate::plist::{PlistError, Result};

/// Seconds between the Unix epoch and the plist epoch, 2001-01-01T00:00:00Z.
pub const PLIST_EPOCH_UNIX_SECS: i64 = 978_307_200;
/// Milliseconds between the Unix epoch and the plist epoch.
pub const PLIST_EPOCH_UNIX_MS: i64 = PLIST_EPOCH_UNIX_SECS * 1000;

/// Dictionary payload; keys iterate in ascending byte order.
pub type Dict = BTreeMap<String, PlistValue>;

/// One property list node.
#[derive(Debug, Clone)]
pub enum PlistValue {
	/// Explicit null (binary format only).
	Null,
	/// Boolean.
	Bool(bool),
	/// Signed 64-bit integer.
	Int(i64),
	/// IEEE-754 double.
	Real(f64),
	/// Seconds relative to 2001-01-01T00:00:00Z.
	Date(f64),
	/// Raw bytes.
	Data(Vec<u8>),
	/// Unicode text.
	Str(String),
	/// CF$UID reference into an external object graph.
	Uid(u32),
	/// Ordered children.
	Array(Vec<PlistValue>),
	/// Keyed children.
	Dict(Dict),
}

impl PlistValue {
	/// Build a `Data` value from owned or borrowed bytes.
	pub fn data(bytes: impl Into<Vec<u8>>) -> Self {
		Self::Data(bytes.into())
	}

	/// Build a `Date` from milliseconds since the Unix epoch.
	pub fn date_from_unix_ms(ms: i64) -> Self {
		Self::Date((ms as f64 - PLIST_EPOCH_UNIX_MS as f64) / 1000.0)
	}

	/// Stable lowercase label for the variant.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Null => "null",
			Self::Bool(_) => "bool",
			Self::Int(_) => "int",
			Self::Real(_) => "real",
			Self::Date(_) => "date",
			Self::Data(_) => "data",
			Self::Str(_) => "string",
			Self::Uid(_) => "uid",
			Self::Array(_) => "array",
			Self::Dict(_) => "dict",
		}
	}

	/// Return `true` for `Array` and `Dict`.
	pub fn is_container(&self) -> bool {
		matches!(self, Self::Array(_) | Self::Dict(_))
	}

	/// Return the boolean payload.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(value) => Some(*value),
			_ => None,
		}
	}

	/// Return the integer payload.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Self::Int(value) => Some(*value),
			_ => None,
		}
	}

	/// Return the real payload.
	pub fn as_real(&self) -> Option<f64> {
		match self {
			Self::Real(value) => Some(*value),
			_ => None,
		}
	}

	/// Return the raw date offset in seconds since 2001.
	pub fn as_date(&self) -> Option<f64> {
		match self {
			Self::Date(value) => Some(*value),
			_ => None,
		}
	}

	/// Return the date as milliseconds since the Unix epoch.
	pub fn as_unix_ms(&self) -> Option<i64> {
		self.as_date().map(|offset| (PLIST_EPOCH_UNIX_MS as f64 + 1000.0 * offset) as i64)
	}

	/// Return the date as a UTC timestamp when it is finite and in chrono's range.
	pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
		let unix = self.as_date()? + PLIST_EPOCH_UNIX_SECS as f64;
		if !unix.is_finite() {
			return None;
		}

		let secs = unix.floor();
		let nanos = (((unix - secs) * 1e9).round() as u32).min(999_999_999);
		if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
			return None;
		}
		DateTime::from_timestamp(secs as i64, nanos)
	}

	/// Return the data payload.
	pub fn as_data(&self) -> Option<&[u8]> {
		match self {
			Self::Data(bytes) => Some(bytes),
			_ => None,
		}
	}

	/// Return the string payload.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(text) => Some(text),
			_ => None,
		}
	}

	/// Return the UID payload.
	pub fn as_uid(&self) -> Option<u32> {
		match self {
			Self::Uid(uid) => Some(*uid),
			_ => None,
		}
	}

	/// Return array children.
	pub fn as_array(&self) -> Option<&[PlistValue]> {
		match self {
			Self::Array(items) => Some(items),
			_ => None,
		}
	}

	/// Return dictionary entries.
	pub fn as_dict(&self) -> Option<&Dict> {
		match self {
			Self::Dict(entries) => Some(entries),
			_ => None,
		}
	}

	/// Look up a key when this value is a dictionary.
	pub fn get(&self, key: &str) -> Option<&PlistValue> {
		self.as_dict().and_then(|entries| entries.get(key))
	}

	/// Count this node and all of its descendants.
	pub fn node_count(&self) -> usize {
		match self {
			Self::Array(items) => 1 + items.iter().map(Self::node_count).sum::<usize>(),
			Self::Dict(entries) => 1 + entries.values().map(Self::node_count).sum::<usize>(),
			_ => 1,
		}
	}
}

impl PartialEq for PlistValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Null, Self::Null) => true,
			(Self::Bool(left), Self::Bool(right)) => left == right,
			(Self::Int(left), Self::Int(right)) => left == right,
			(Self::Real(left), Self::Real(right)) => left.to_bits() == right.to_bits(),
			(Self::Date(left), Self::Date(right)) => left.to_bits() == right.to_bits(),
			(Self::Data(left), Self::Data(right)) => left == right,
			(Self::Str(left), Self::Str(right)) => left == right,
			(Self::Uid(left), Self::Uid(right)) => left == right,
			(Self::Array(left), Self::Array(right)) => left == right,
			(Self::Dict(left), Self::Dict(right)) => left == right,
			_ => false,
		}
	}
}

impl Eq for PlistValue {}

impl Hash for PlistValue {
	fn hash<H: Hasher>(&self, state: &mut H) {
		std::mem::discriminant(self).hash(state);
		match self {
			Self::Null => {}
			Self::Bool(value) => value.hash(state),
			Self::Int(value) => value.hash(state),
			Self::Real(value) | Self::Date(value) => value.to_bits().hash(state),
			Self::Data(bytes) => bytes.hash(state),
			Self::Str(text) => text.hash(state),
			Self::Uid(uid) => uid.hash(state),
			Self::Array(items) => items.hash(state),
			Self::Dict(entries) => entries.hash(state),
		}
	}
}

macro_rules! from_lossless_int {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for PlistValue {
				fn from(value: $ty) -> Self {
					Self::Int(i64::from(value))
				}
			}
		)*
	};
}

from_lossless_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! try_from_wide_int {
	($($ty:ty),*) => {
		$(
			impl TryFrom<$ty> for PlistValue {
				type Error = PlistError;

				fn try_from(value: $ty) -> Result<Self> {
					i64::try_from(value).map(Self::Int).map_err(|_| PlistError::Unconvertible {
						from: stringify!($ty),
						reason: format!("{value} does not fit in a signed 64-bit integer"),
					})
				}
			}
		)*
	};
}

try_from_wide_int!(u64, usize, isize, i128, u128);

impl From<bool> for PlistValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<f32> for PlistValue {
	fn from(value: f32) -> Self {
		Self::Real(f64::from(value))
	}
}

impl From<f64> for PlistValue {
	fn from(value: f64) -> Self {
		Self::Real(value)
	}
}

impl From<&str> for PlistValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_owned())
	}
}

impl From<String> for PlistValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

impl From<DateTime<Utc>> for PlistValue {
	fn from(value: DateTime<Utc>) -> Self {
		let secs = (value.timestamp() - PLIST_EPOCH_UNIX_SECS) as f64;
		Self::Date(secs + f64::from(value.timestamp_subsec_nanos()) / 1e9)
	}
}

impl From<Vec<PlistValue>> for PlistValue {
	fn from(items: Vec<PlistValue>) -> Self {
		Self::Array(items)
	}
}

impl From<Dict> for PlistValue {
	fn from(entries: Dict) -> Self {
		Self::Dict(entries)
	}
}

impl From<HashMap<String, PlistValue>> for PlistValue {
	fn from(entries: HashMap<String, PlistValue>) -> Self {
		Self::Dict(entries.into_iter().collect())
	}
}

impl<T: Into<PlistValue>> From<Option<T>> for PlistValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

impl FromIterator<PlistValue> for PlistValue {
	fn from_iter<I: IntoIterator<Item = PlistValue>>(iter: I) -> Self {
		Self::Array(iter.into_iter().collect())
	}
}

impl FromIterator<(String, PlistValue)> for PlistValue {
	fn from_iter<I: IntoIterator<Item = (String, PlistValue)>>(iter: I) -> Self {
		Self::Dict(iter.into_iter().collect())
	}
}
