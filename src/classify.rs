//! Connection-error classification over stringified error-cause chains.
//!
//! The retry layer treats a failure as retryable iff its cause chain looks like a broken
//! connection. The stock heuristic is substring matching over each rendered layer — kept exactly
//! as the surrounding tooling expects it, fragility included. Swap in another
//! [`ConnectionErrorClassifier`] at client construction to replace the heuristic without touching
//! call sites.

// self
use crate::_prelude::*;

/// Ordered rendering of an error and its transitive causes.
///
/// Layer zero is the outermost error; each following layer is the next `source()` in the chain,
/// rendered with its `Display` implementation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorChain(Vec<String>);
impl ErrorChain {
	/// Walks `error` and its sources, rendering each layer as text.
	pub fn from_error(error: &(dyn StdError + 'static)) -> Self {
		let mut layers = Vec::new();
		let mut current = Some(error);

		while let Some(layer) = current {
			layers.push(layer.to_string());

			current = layer.source();
		}

		Self(layers)
	}

	/// Iterates the rendered layers, outermost first.
	pub fn layers(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Returns the number of layers in the chain.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when the chain holds no layers.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Decides whether a failure should be treated as a retryable connection error.
pub trait ConnectionErrorClassifier
where
	Self: 'static + Send + Sync,
{
	/// Returns `true` when the rendered cause chain indicates a connection-level failure.
	fn is_connection_error(&self, chain: &ErrorChain) -> bool;
}

/// Stock classifier: a failure is a connection error iff any layer of its cause chain contains
/// the substring `"tcp"`.
///
/// This is a heuristic over rendered text, not a structural check — a rejection message that
/// merely mentions "tcp" also matches.
#[derive(Clone, Copy, Debug, Default)]
pub struct TcpSubstringClassifier;
impl TcpSubstringClassifier {
	/// Substring that marks a layer as connection-related.
	pub const MARKER: &'static str = "tcp";
}
impl ConnectionErrorClassifier for TcpSubstringClassifier {
	fn is_connection_error(&self, chain: &ErrorChain) -> bool {
		chain.layers().any(|layer| layer.contains(Self::MARKER))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, ThisError)]
	#[error("request dispatch failed")]
	struct Outer {
		#[source]
		source: Inner,
	}

	#[derive(Debug, ThisError)]
	#[error("{0}")]
	struct Inner(String);

	fn chain_for(inner: &str) -> ErrorChain {
		let error = Outer { source: Inner(inner.into()) };

		ErrorChain::from_error(&error)
	}

	#[test]
	fn chain_renders_layers_outermost_first() {
		let chain = chain_for("tcp connect error: connection refused");

		assert_eq!(chain.len(), 2);
		assert_eq!(
			chain.layers().collect::<Vec<_>>(),
			["request dispatch failed", "tcp connect error: connection refused"],
		);
	}

	#[test]
	fn tcp_marker_matches_any_layer() {
		let classifier = TcpSubstringClassifier;

		assert!(classifier.is_connection_error(&chain_for("tcp connect error: connection refused")));
		assert!(!classifier.is_connection_error(&chain_for("dns lookup failure")));
	}

	#[test]
	fn marker_matching_is_purely_textual() {
		// The heuristic has no structural understanding; prose mentioning tcp also matches.
		let classifier = TcpSubstringClassifier;

		assert!(classifier.is_connection_error(&chain_for("upstream rejected the tcp handshake")));
	}
}
