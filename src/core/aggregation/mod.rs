// SPDX-License-Identifier: MIT OR Apache-2.0

//! Aggregations.

pub mod multifunc;
