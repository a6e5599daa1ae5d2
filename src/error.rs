//! Error types for pool and allocator operations.

use thiserror::Error;

/// Errors returned when the pool or an allocator cannot hand out storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
	/// The requested size is not one of the registered size classes.
	#[error("out of memory: no size class registered for {size} bytes")]
	UnknownSizeClass {
		/// Requested allocation size in bytes.
		size: usize,
	},

	/// Every slot of the matching size class is occupied.
	#[error("out of memory: size class of {size} bytes is exhausted")]
	SizeClassExhausted {
		/// Size of the exhausted class in bytes.
		size: usize,
	},

	/// The type needs a stricter alignment than the arena guarantees.
	#[error("type alignment of {align} bytes exceeds the arena alignment")]
	UnsupportedAlignment {
		/// Alignment required by the type.
		align: usize,
	},

	/// Zero-sized types occupy no storage and cannot be placed in a size class.
	#[error("zero-sized types cannot be pool allocated")]
	ZeroSized,
}

impl AllocError {
	/// Returns true for the two pool exhaustion cases.
	pub fn is_out_of_memory(&self) -> bool {
		matches!(self, Self::UnknownSizeClass { .. } | Self::SizeClassExhausted { .. })
	}
}

/// Errors returned when a pool is built from an invalid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
	/// The per-class block size was zero.
	#[error("block size must be greater than zero")]
	ZeroBlockSize,

	/// No size class was registered.
	#[error("at least one size class is required")]
	NoSizeClasses,

	/// A registered size class was zero bytes.
	#[error("size classes must be greater than zero")]
	ZeroSizeClass,

	/// The arena laid out for the requested classes cannot be addressed or
	/// allocated.
	#[error("arena layout exceeds the addressable memory")]
	ArenaTooLarge,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_out_of_memory_classification() {
		assert!(AllocError::UnknownSizeClass { size: 3 }.is_out_of_memory());
		assert!(AllocError::SizeClassExhausted { size: 8 }.is_out_of_memory());
		assert!(!AllocError::ZeroSized.is_out_of_memory());
		assert!(!AllocError::UnsupportedAlignment { align: 64 }.is_out_of_memory());
	}

	#[test]
	fn test_display() {
		let err = AllocError::SizeClassExhausted { size: 16 };
		assert_eq!(err.to_string(), "out of memory: size class of 16 bytes is exhausted");
		assert_eq!(ConfigError::NoSizeClasses.to_string(), "at least one size class is required");
		assert_eq!(
			ConfigError::ArenaTooLarge.to_string(),
			"arena layout exceeds the addressable memory"
		);
	}
}
