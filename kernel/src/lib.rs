//! Meridian Kernel: the collaborator contracts consumed by the search core.
//!
//! # API Surface
//!
//! - [`model`] -- the narrow contract a planning problem exposes to search:
//!   [`model::Problem`], [`model::Operator`], [`model::Heuristic`] and the
//!   lazy [`model::Successor`] pair.
//! - [`proof`] -- canonical JSON bytes and domain-separated content hashes
//!   used for every persisted artifact (plans, traces, reports).
//!
//! # Module Dependency Direction
//!
//! `model` and `proof` are independent of each other. Nothing in the kernel
//! knows about frontiers, node stores or engines; those live in
//! `meridian_search`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod model;
pub mod proof;
