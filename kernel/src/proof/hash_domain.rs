//! Typed domain separators for canonical hashing.
//!
//! Every hash computation selects a domain via [`HashDomain`] so that a plan
//! digest can never collide with a report digest over the same bytes.

/// Declares `HashDomain` enum, `as_bytes()`, `ALL`, and `Display` from one list.
macro_rules! define_hash_domains {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $bytes:expr
        ),+ $(,)?
    ) => {
        /// Typed domain separator for [`super::hash::canonical_hash`].
        ///
        /// Every variant maps to a unique, null-terminated byte string used as
        /// a SHA-256 prefix.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HashDomain {
            $(
                $(#[$meta])*
                $variant,
            )+
        }

        impl HashDomain {
            /// The raw domain-separator bytes (null-terminated).
            #[must_use]
            pub const fn as_bytes(&self) -> &'static [u8] {
                match self {
                    $( Self::$variant => $bytes, )+
                }
            }

            /// All domain variants in declaration order.
            pub const ALL: &[HashDomain] = &[
                $( Self::$variant, )+
            ];
        }

        impl core::fmt::Display for HashDomain {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self {
                    $( Self::$variant => write!(f, stringify!($variant)), )+
                }
            }
        }
    };
}

define_hash_domains! {
    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    /// Solution plan hashing (operator sequence + cost).
    SolutionPlan => b"MERIDIAN::SOLUTION_PLAN::V1\0",

    /// Search trace hashing (expansion events + termination).
    SearchTrace => b"MERIDIAN::SEARCH_TRACE::V1\0",

    /// Search configuration snapshot hashing.
    SearchConfig => b"MERIDIAN::SEARCH_CONFIG::V1\0",

    // -----------------------------------------------------------------------
    // Harness
    // -----------------------------------------------------------------------

    /// Run report hashing; also the digest stored in a report directory.
    RunReport => b"MERIDIAN::RUN_REPORT::V1\0",
}
